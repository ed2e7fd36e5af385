//! Variable descriptor table
//!
//! Descriptors are created from "name" columns, annotated from
//! "description" columns and resolved to a physical data column from
//! "dataInfo" columns. All lookups are by 1-based variable index.

use crate::config::SelectionCriteria;
use crate::text::decode_text;
use crate::types::{DecoderError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Polarity applied to every value read through a data reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Apply the polarity to a physical value
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Sign::Positive => value,
            Sign::Negative => -value,
        }
    }
}

/// Resolved location of a variable's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataReference {
    /// True if the value lives in "data_1"
    pub is_constant: bool,
    /// 0-based column within the data block row
    pub column: usize,
    pub sign: Sign,
}

impl DataReference {
    /// Decode a "dataInfo" column
    ///
    /// Entry 0 is the data block (1 = constants, 0 = abscissa, 2 = varying),
    /// entry 1 the signed 1-based column within that block.
    fn from_data_info(matrix: &str, index: usize, values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(DecoderError::decode(
                matrix,
                index,
                format!("expected at least 2 entries, got {}", values.len()),
            ));
        }
        let block = integral(matrix, index, values[0])?;
        let reference = integral(matrix, index, values[1])?;

        let is_constant = match block {
            1 => true,
            0 | 2 => false,
            other => {
                return Err(DecoderError::decode(
                    matrix,
                    index,
                    format!("unknown data block {}", other),
                ))
            }
        };

        if reference == 0 {
            return Err(DecoderError::protocol(matrix, index, "data reference is zero"));
        }

        Ok(Self {
            is_constant,
            column: (reference.unsigned_abs() - 1) as usize,
            sign: if reference >= 0 { Sign::Positive } else { Sign::Negative },
        })
    }

    /// Read this reference's value from a data block row
    pub fn read(&self, matrix: &str, row_index: usize, row: &[f64], name: &str) -> Result<f64> {
        match row.get(self.column) {
            Some(&value) => Ok(self.sign.apply(value)),
            None => Err(DecoderError::decode(
                matrix,
                row_index,
                format!(
                    "row has {} entries but '{}' references column {}",
                    row.len(),
                    name,
                    self.column + 1
                ),
            )),
        }
    }
}

fn integral(matrix: &str, index: usize, value: f64) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() || value.abs() > i32::MAX as f64 {
        return Err(DecoderError::decode(
            matrix,
            index,
            format!("{} is not an integer entry", value),
        ));
    }
    Ok(value as i64)
}

/// A selected variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescriptor {
    pub name: String,
    /// 1-based position in the "name"/"dataInfo" matrices
    pub variable_index: usize,
    pub description: Option<String>,
    /// Set once by "dataInfo"
    pub reference: Option<DataReference>,
    /// Selected for its trajectory
    pub in_trajectories: bool,
    /// Selected for its final value
    pub in_finals: bool,
}

impl VariableDescriptor {
    /// Whether the variable is stored in "data_1"; None until resolved
    pub fn is_constant(&self) -> Option<bool> {
        self.reference.map(|r| r.is_constant)
    }
}

/// All selected variables of one extraction, keyed by variable index
#[derive(Debug, Default)]
pub struct VariableTable {
    descriptors: BTreeMap<usize, VariableDescriptor>,
    /// Every index seen in "name", selected or not
    seen: HashSet<usize>,
    /// Index that first used each name, selected or not
    names: HashMap<String, usize>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a "name" column
    ///
    /// Returns the new descriptor when the name passes either criterion.
    pub fn resolve_name(
        &mut self,
        matrix: &str,
        index: usize,
        values: &[f64],
        trajectories: &SelectionCriteria,
        finals: &SelectionCriteria,
    ) -> Result<Option<&VariableDescriptor>> {
        let name = decode_text(matrix, index, values)?;

        if !self.seen.insert(index) {
            return Err(DecoderError::protocol(
                matrix,
                index,
                format!("variable index {} presented twice ('{}')", index, name),
            ));
        }

        // Outputs are keyed by name, so a second index would share them
        if let Some(&first) = self.names.get(&name) {
            return Err(DecoderError::protocol(
                matrix,
                index,
                format!("name '{}' already used by variable index {}", name, first),
            ));
        }
        self.names.insert(name.clone(), index);

        let in_trajectories = trajectories.matches(&name);
        let in_finals = finals.matches(&name);
        if !in_trajectories && !in_finals {
            return Ok(None);
        }

        log::trace!(
            "Variable {} '{}' selected (trajectory: {}, final: {})",
            index,
            name,
            in_trajectories,
            in_finals
        );

        let descriptor = self.descriptors.entry(index).or_insert(VariableDescriptor {
            name,
            variable_index: index,
            description: None,
            reference: None,
            in_trajectories,
            in_finals,
        });
        Ok(Some(&*descriptor))
    }

    /// Process a "description" column; unselected indexes are ignored
    pub fn resolve_description(&mut self, matrix: &str, index: usize, values: &[f64]) -> Result<()> {
        let text = decode_text(matrix, index, values)?;
        if let Some(descriptor) = self.descriptors.get_mut(&index) {
            descriptor.description = Some(text);
        }
        Ok(())
    }

    /// Process a "dataInfo" column; unselected indexes are ignored
    pub fn resolve_data_info(&mut self, matrix: &str, index: usize, values: &[f64]) -> Result<()> {
        let Some(descriptor) = self.descriptors.get_mut(&index) else {
            return Ok(());
        };

        if descriptor.reference.is_some() {
            return Err(DecoderError::protocol(
                matrix,
                index,
                format!("'{}' already has a data reference", descriptor.name),
            ));
        }

        let reference = DataReference::from_data_info(matrix, index, values)?;
        log::trace!(
            "Variable {} '{}' -> {} column {} ({:?})",
            index,
            descriptor.name,
            if reference.is_constant { "data_1" } else { "data_2" },
            reference.column,
            reference.sign
        );
        descriptor.reference = Some(reference);
        Ok(())
    }

    pub(crate) fn get(&self, index: usize) -> Option<&VariableDescriptor> {
        self.descriptors.get(&index)
    }

    /// Selected descriptors in variable index order
    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.descriptors.values()
    }

    /// Number of selected variables
    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Number of "name" columns consumed, selected or not
    pub(crate) fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
