//! Core types for the result file decoder library
//!
//! This module defines the values the decoder hands back to callers and the
//! error taxonomy shared by the container reader and the extractors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    /// A payload could not be interpreted (bad text, short row, non-integral entry)
    #[error("Decode error in matrix '{matrix}' at index {index}: {reason}")]
    Decode {
        matrix: String,
        index: usize,
        reason: String,
    },

    /// The event stream violates the result file convention
    #[error("Protocol error in matrix '{matrix}' at index {index}: {reason}")]
    Protocol {
        matrix: String,
        index: usize,
        reason: String,
    },

    #[error("Malformed container: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecoderError {
    pub(crate) fn decode(matrix: &str, index: usize, reason: impl Into<String>) -> Self {
        DecoderError::Decode {
            matrix: matrix.to_string(),
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn protocol(matrix: &str, index: usize, reason: impl Into<String>) -> Self {
        DecoderError::Protocol {
            matrix: matrix.to_string(),
            index,
            reason: reason.into(),
        }
    }

    /// Label of the matrix the failure was detected in, if any
    pub fn matrix(&self) -> Option<&str> {
        match self {
            DecoderError::Decode { matrix, .. } | DecoderError::Protocol { matrix, .. } => {
                Some(matrix)
            }
            _ => None,
        }
    }
}

/// Storage precision of a matrix's elements
///
/// Values are always widened to `f64` before they reach a handler; the
/// format is passed along so consumers can tell text from numeric payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementFormat {
    Double,
    Single,
    Int32,
    Int16,
    UInt16,
    UInt8,
}

impl ElementFormat {
    /// Map the MAT v4 precision digit to a format
    pub fn from_precision(p: i32) -> Option<Self> {
        match p {
            0 => Some(ElementFormat::Double),
            1 => Some(ElementFormat::Single),
            2 => Some(ElementFormat::Int32),
            3 => Some(ElementFormat::Int16),
            4 => Some(ElementFormat::UInt16),
            5 => Some(ElementFormat::UInt8),
            _ => None,
        }
    }

    /// Size of one stored element in bytes
    pub fn size(&self) -> usize {
        match self {
            ElementFormat::Double => 8,
            ElementFormat::Single | ElementFormat::Int32 => 4,
            ElementFormat::Int16 | ElementFormat::UInt16 => 2,
            ElementFormat::UInt8 => 1,
        }
    }
}

impl fmt::Display for ElementFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementFormat::Double => write!(f, "f64"),
            ElementFormat::Single => write!(f, "f32"),
            ElementFormat::Int32 => write!(f, "i32"),
            ElementFormat::Int16 => write!(f, "i16"),
            ElementFormat::UInt16 => write!(f, "u16"),
            ElementFormat::UInt8 => write!(f, "u8"),
        }
    }
}

/// Extracted trajectory of one variable
///
/// Constants are kept as a bare scalar; varying variables grow by one sample
/// per `data_2` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Trajectory {
    Constant(f64),
    Series(Vec<f64>),
}

impl Trajectory {
    /// Scalar value of a constant trajectory
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Trajectory::Constant(v) => Some(*v),
            Trajectory::Series(_) => None,
        }
    }

    /// Samples of a varying trajectory
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Trajectory::Constant(_) => None,
            Trajectory::Series(values) => Some(values),
        }
    }

    /// Value at the last recorded instant
    pub fn last(&self) -> Option<f64> {
        match self {
            Trajectory::Constant(v) => Some(*v),
            Trajectory::Series(values) => values.last().copied(),
        }
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trajectory::Constant(v) => write!(f, "{}", v),
            Trajectory::Series(values) => write!(f, "[{} samples]", values.len()),
        }
    }
}
