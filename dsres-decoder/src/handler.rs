//! Matrix event consumer interface
//!
//! The container reader pushes one event per logical column (or row, for the
//! data blocks) and one end marker per matrix. Extractors implement
//! `MatrixHandler` to consume that stream.

use crate::types::{ElementFormat, Result};
use std::fmt;

/// Consumer of the matrix event stream
pub trait MatrixHandler {
    /// Called once per column of "name"/"description"/"dataInfo" and once
    /// per row of "data_1"/"data_2"
    ///
    /// `index` is 1-based. `is_last` marks the final event of the matrix.
    fn on_column(
        &mut self,
        matrix: &str,
        index: usize,
        format: ElementFormat,
        values: &[f64],
        is_last: bool,
    ) -> Result<()>;

    /// Called when a matrix's events are exhausted
    ///
    /// Returning true tells the source nothing further is needed.
    fn on_matrix_end(&mut self, _matrix: &str) -> bool {
        false
    }
}

/// Matrices the result file convention assigns meaning to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixLabel {
    Name,
    Description,
    DataInfo,
    Constants,
    Varying,
}

impl MatrixLabel {
    /// Recognise a matrix label; unrelated matrices yield None
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "name" => Some(MatrixLabel::Name),
            "description" => Some(MatrixLabel::Description),
            "dataInfo" => Some(MatrixLabel::DataInfo),
            "data_1" => Some(MatrixLabel::Constants),
            "data_2" => Some(MatrixLabel::Varying),
            _ => None,
        }
    }

    /// Label as stored in the container
    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixLabel::Name => "name",
            MatrixLabel::Description => "description",
            MatrixLabel::DataInfo => "dataInfo",
            MatrixLabel::Constants => "data_1",
            MatrixLabel::Varying => "data_2",
        }
    }
}

impl fmt::Display for MatrixLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
