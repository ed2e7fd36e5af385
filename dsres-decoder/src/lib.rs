//! Simulation Result Decoder Library
//!
//! Decodes Modelica-style simulation result files (`dsres.mat`) into named
//! signals: full trajectories, final values and a name -> description
//! catalog.
//!
//! # Architecture
//!
//! - A MAT v4 reader turns the container into a stream of matrix events
//!   (one per column of "name"/"description"/"dataInfo", one per row of
//!   "data_1"/"data_2")
//! - Extractors consume that stream through the `MatrixHandler` trait,
//!   resolve every selected variable to a signed data column and
//!   accumulate its values
//!
//! The library does NOT:
//! - Write result files
//! - Interpolate or resample trajectories
//! - Print or export anything
//!
//! # Example Usage
//!
//! ```no_run
//! use dsres_decoder::{extract_from, SelectionCriteria};
//! use std::fs::File;
//!
//! let file = File::open("dsres.mat").unwrap();
//! let extraction = extract_from(
//!     file,
//!     SelectionCriteria::prefix("tank."),
//!     SelectionCriteria::names(["time"]),
//! )
//! .unwrap();
//!
//! for (name, trajectory) in &extraction.trajectories {
//!     println!("{} = {}", name, trajectory);
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod extractor;
pub mod formats;
pub mod handler;
pub mod types;
pub mod variables;

// Re-export main types for convenience
pub use config::{ExtractorConfig, SelectionCriteria, SignalSelection};
pub use decoder::{extract, extract_from, read_catalog, read_catalog_from};
pub use extractor::{CatalogExtractor, Extraction, ExtractionState, ValueExtractor};
pub use formats::MatReader;
pub use handler::{MatrixHandler, MatrixLabel};
pub use types::{DecoderError, ElementFormat, Result, Trajectory};

// Internal modules (not exposed in public API)
mod text;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
