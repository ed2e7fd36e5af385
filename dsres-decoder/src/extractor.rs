//! Extractors
//!
//! Two `MatrixHandler` implementations sit on top of the variable table:
//!
//! - `CatalogExtractor` lists every variable with its description and stops
//!   the source once "description" is done.
//! - `ValueExtractor` decodes trajectories and final values for the
//!   variables picked by two `SelectionCriteria`.
//!
//! Both track progress through the canonical matrix order
//! name < description < dataInfo < data_1 < data_2 and reject events that
//! move backwards. After the first error an extractor is poisoned and
//! never hands out partial output.

use crate::config::SelectionCriteria;
use crate::handler::{MatrixHandler, MatrixLabel};
use crate::types::{DecoderError, ElementFormat, Result, Trajectory};
use crate::variables::{Accumulator, VariableTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Progress through the canonical matrix order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExtractionState {
    NotStarted,
    NamesSeen,
    MetadataSeen,
    ConstantsSeen,
    VaryingInProgress,
    Complete,
}

impl ExtractionState {
    /// Move to the state implied by an event, refusing to go backwards
    fn advance(&mut self, label: MatrixLabel, index: usize, is_last: bool) -> Result<()> {
        let target = match label {
            MatrixLabel::Name => ExtractionState::NamesSeen,
            MatrixLabel::Description | MatrixLabel::DataInfo => ExtractionState::MetadataSeen,
            MatrixLabel::Constants => ExtractionState::ConstantsSeen,
            MatrixLabel::Varying if is_last => ExtractionState::Complete,
            MatrixLabel::Varying => ExtractionState::VaryingInProgress,
        };

        if *self == ExtractionState::Complete || target < *self {
            return Err(DecoderError::protocol(
                label.as_str(),
                index,
                format!("matrix out of canonical order (state {:?})", self),
            ));
        }

        if target != *self {
            log::debug!("Extraction state {:?} -> {:?}", self, target);
            *self = target;
        }
        Ok(())
    }
}

/// Guards a handler against use after a failure
#[derive(Debug, Default)]
struct Poison {
    failed: bool,
}

impl Poison {
    fn check(&self, matrix: &str, index: usize) -> Result<()> {
        if self.failed {
            return Err(DecoderError::protocol(matrix, index, "extraction already failed"));
        }
        Ok(())
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.failed = true;
        }
        result
    }
}

/// Lists every variable with its description
#[derive(Debug)]
pub struct CatalogExtractor {
    table: VariableTable,
    state: ExtractionState,
    poison: Poison,
    everything: SelectionCriteria,
}

impl CatalogExtractor {
    pub fn new() -> Self {
        Self {
            table: VariableTable::new(),
            state: ExtractionState::NotStarted,
            poison: Poison::default(),
            everything: SelectionCriteria::all(),
        }
    }

    fn process(&mut self, label: MatrixLabel, index: usize, values: &[f64], is_last: bool) -> Result<()> {
        match label {
            MatrixLabel::Name => {
                self.state.advance(label, index, is_last)?;
                self.table
                    .resolve_name(label.as_str(), index, values, &self.everything, &self.everything)?;
            }
            MatrixLabel::Description => {
                self.state.advance(label, index, is_last)?;
                self.table.resolve_description(label.as_str(), index, values)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Mapping name -> description for every variable seen
    ///
    /// Variables without a description map to an empty string.
    pub fn finish(self) -> Result<BTreeMap<String, String>> {
        self.poison.check("description", 0)?;
        let catalog: BTreeMap<String, String> = self
            .table
            .iter()
            .map(|d| (d.name.clone(), d.description.clone().unwrap_or_default()))
            .collect();
        log::info!("Catalog lists {} variables", catalog.len());
        Ok(catalog)
    }
}

impl Default for CatalogExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixHandler for CatalogExtractor {
    fn on_column(
        &mut self,
        matrix: &str,
        index: usize,
        _format: ElementFormat,
        values: &[f64],
        is_last: bool,
    ) -> Result<()> {
        let Some(label) = MatrixLabel::parse(matrix) else {
            return Ok(());
        };
        self.poison.check(matrix, index)?;
        let result = self.process(label, index, values, is_last);
        self.poison.track(result)
    }

    fn on_matrix_end(&mut self, matrix: &str) -> bool {
        matrix == MatrixLabel::Description.as_str()
    }
}

/// Decoded values of one extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// name -> scalar (constant) or samples (varying)
    pub trajectories: BTreeMap<String, Trajectory>,
    /// name -> value at the last instant; None if the file had no rows for it
    pub finals: BTreeMap<String, Option<f64>>,
}

/// Decodes trajectories and final values for selected variables
#[derive(Debug)]
pub struct ValueExtractor {
    trajectories: SelectionCriteria,
    finals: SelectionCriteria,
    table: VariableTable,
    accumulator: Accumulator,
    state: ExtractionState,
    poison: Poison,
}

impl ValueExtractor {
    /// Create an extractor for the given trajectory and final selections
    pub fn new(trajectories: SelectionCriteria, finals: SelectionCriteria) -> Self {
        Self {
            trajectories,
            finals,
            table: VariableTable::new(),
            accumulator: Accumulator::new(),
            state: ExtractionState::NotStarted,
            poison: Poison::default(),
        }
    }

    /// Current position in the matrix order
    pub fn state(&self) -> ExtractionState {
        self.state
    }

    fn process(&mut self, label: MatrixLabel, index: usize, values: &[f64], is_last: bool) -> Result<()> {
        self.state.advance(label, index, is_last)?;
        let matrix = label.as_str();

        match label {
            MatrixLabel::Name => {
                if let Some(descriptor) =
                    self.table
                        .resolve_name(matrix, index, values, &self.trajectories, &self.finals)?
                {
                    self.accumulator.register(descriptor);
                }
            }
            MatrixLabel::Description => self.table.resolve_description(matrix, index, values)?,
            MatrixLabel::DataInfo => self.table.resolve_data_info(matrix, index, values)?,
            MatrixLabel::Constants => {
                self.accumulator.on_constant_row(&self.table, matrix, index, values)?
            }
            MatrixLabel::Varying => {
                self.accumulator
                    .on_varying_row(&self.table, matrix, index, values, is_last)?
            }
        }
        Ok(())
    }

    /// Hand over the decoded values
    ///
    /// Fails if any event was rejected or the stream ended before the end of
    /// "data_2": finals are only known after the last row.
    pub fn finish(self) -> Result<Extraction> {
        let rows = self.accumulator.varying_rows();
        self.poison.check("data_2", rows)?;
        if self.state != ExtractionState::Complete {
            return Err(DecoderError::protocol(
                "data_2",
                rows,
                format!("stream ended before the last data_2 row (state {:?})", self.state),
            ));
        }
        log::info!(
            "Extracted {} of {} variables over {} rows",
            self.table.len(),
            self.table.seen_count(),
            self.accumulator.varying_rows()
        );
        let (trajectories, finals) = self.accumulator.into_outputs();
        Ok(Extraction {
            trajectories,
            finals,
        })
    }
}

impl MatrixHandler for ValueExtractor {
    fn on_column(
        &mut self,
        matrix: &str,
        index: usize,
        _format: ElementFormat,
        values: &[f64],
        is_last: bool,
    ) -> Result<()> {
        let Some(label) = MatrixLabel::parse(matrix) else {
            return Ok(());
        };
        self.poison.check(matrix, index)?;
        let result = self.process(label, index, values, is_last);
        self.poison.track(result)
    }

    fn on_matrix_end(&mut self, matrix: &str) -> bool {
        // An empty "data_2" still ends the extraction
        if matrix == MatrixLabel::Varying.as_str() && !self.poison.failed {
            self.state = ExtractionState::Complete;
        }
        false
    }
}
