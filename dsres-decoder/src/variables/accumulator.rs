//! Data block accumulation
//!
//! Turns "data_1" and "data_2" rows into trajectories and final values for
//! the descriptors of a `VariableTable`. Storage only grows: trajectories are
//! appended to, and a final value is written once (constants) or on the last
//! "data_2" row (varying).

use super::table::{DataReference, VariableDescriptor, VariableTable};
use crate::types::{DecoderError, Result, Trajectory};
use std::collections::BTreeMap;

/// Output storage of a value extraction
#[derive(Debug, Default)]
pub struct Accumulator {
    trajectories: BTreeMap<String, Trajectory>,
    finals: BTreeMap<String, Option<f64>>,
    constants_read: bool,
    varying_rows: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the empty outputs for a freshly selected descriptor
    pub fn register(&mut self, descriptor: &VariableDescriptor) {
        if descriptor.in_trajectories {
            self.trajectories
                .insert(descriptor.name.clone(), Trajectory::Series(Vec::new()));
        }
        if descriptor.in_finals {
            self.finals.insert(descriptor.name.clone(), None);
        }
    }

    /// Process a "data_1" row
    ///
    /// Only the first row is used; result files repeat the constants for the
    /// stop time in a second row. Later rows are not allowed to overwrite the
    /// value, so each constant is written exactly once even if the rows
    /// were to differ.
    pub fn on_constant_row(
        &mut self,
        table: &VariableTable,
        matrix: &str,
        row_index: usize,
        row: &[f64],
    ) -> Result<()> {
        if self.constants_read {
            log::warn!("Ignoring additional {} row {}", matrix, row_index);
            return Ok(());
        }

        for descriptor in table.iter() {
            let reference = resolved(descriptor, matrix, row_index)?;
            if !reference.is_constant {
                continue;
            }
            let value = reference.read(matrix, row_index, row, &descriptor.name)?;
            if descriptor.in_trajectories {
                self.trajectories
                    .insert(descriptor.name.clone(), Trajectory::Constant(value));
            }
            if descriptor.in_finals {
                self.finals.insert(descriptor.name.clone(), Some(value));
            }
        }

        self.constants_read = true;
        Ok(())
    }

    /// Process a "data_2" row
    ///
    /// Every varying trajectory gains one sample; finals are only written
    /// when `is_last` is set.
    pub fn on_varying_row(
        &mut self,
        table: &VariableTable,
        matrix: &str,
        row_index: usize,
        row: &[f64],
        is_last: bool,
    ) -> Result<()> {
        for descriptor in table.iter() {
            let reference = resolved(descriptor, matrix, row_index)?;
            if reference.is_constant {
                continue;
            }
            if !descriptor.in_trajectories && !(is_last && descriptor.in_finals) {
                continue;
            }

            let value = reference.read(matrix, row_index, row, &descriptor.name)?;
            if descriptor.in_trajectories {
                if let Some(Trajectory::Series(values)) =
                    self.trajectories.get_mut(&descriptor.name)
                {
                    values.push(value);
                }
            }
            if is_last && descriptor.in_finals {
                self.finals.insert(descriptor.name.clone(), Some(value));
            }
        }

        self.varying_rows += 1;
        Ok(())
    }

    /// Number of "data_2" rows processed so far
    pub fn varying_rows(&self) -> usize {
        self.varying_rows
    }

    /// Hand over the outputs
    pub fn into_outputs(
        self,
    ) -> (BTreeMap<String, Trajectory>, BTreeMap<String, Option<f64>>) {
        (self.trajectories, self.finals)
    }
}

fn resolved(descriptor: &VariableDescriptor, matrix: &str, row_index: usize) -> Result<DataReference> {
    descriptor.reference.ok_or_else(|| {
        DecoderError::protocol(
            matrix,
            row_index,
            format!(
                "variable {} '{}' has no dataInfo entry",
                descriptor.variable_index, descriptor.name
            ),
        )
    })
}
