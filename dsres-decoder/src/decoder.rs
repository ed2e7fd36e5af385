//! Main decoder API
//!
//! Convenience entry points that wire a `MatReader` to one of the
//! extractors. Each call is a complete, independent extraction: on error no
//! partial output is returned.

use crate::config::{ExtractorConfig, SelectionCriteria};
use crate::extractor::{CatalogExtractor, Extraction, ValueExtractor};
use crate::formats::MatReader;
use crate::types::Result;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// List every variable of a result file with its description
///
/// Reading stops after the "description" matrix.
///
/// # Example
/// ```no_run
/// use std::path::Path;
///
/// let catalog = dsres_decoder::read_catalog(Path::new("dsres.mat")).unwrap();
/// for (name, description) in &catalog {
///     println!("{}: {}", name, description);
/// }
/// ```
pub fn read_catalog(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut extractor = CatalogExtractor::new();
    MatReader::open(path)?.read_into(&mut extractor)?;
    extractor.finish()
}

/// List every variable of a result container read from `reader`
pub fn read_catalog_from<R: Read>(reader: R) -> Result<BTreeMap<String, String>> {
    let mut extractor = CatalogExtractor::new();
    MatReader::new(reader).read_into(&mut extractor)?;
    extractor.finish()
}

/// Decode the trajectories and final values selected by `config`
///
/// # Example
/// ```no_run
/// use dsres_decoder::ExtractorConfig;
/// use std::path::Path;
///
/// let config = ExtractorConfig::new()
///     .add_trajectory("tank.level")
///     .add_final("tank.level");
/// let extraction = dsres_decoder::extract(Path::new("dsres.mat"), &config).unwrap();
/// println!("{:?}", extraction.finals["tank.level"]);
/// ```
pub fn extract(path: &Path, config: &ExtractorConfig) -> Result<Extraction> {
    let (trajectories, finals) = config.criteria();
    let mut extractor = ValueExtractor::new(trajectories, finals);
    MatReader::open(path)?.read_into(&mut extractor)?;
    extractor.finish()
}

/// Decode values from a result container read from `reader`
///
/// Takes runtime criteria directly, so predicates beyond name lists and
/// prefixes can be used.
pub fn extract_from<R: Read>(
    reader: R,
    trajectories: SelectionCriteria,
    finals: SelectionCriteria,
) -> Result<Extraction> {
    let mut extractor = ValueExtractor::new(trajectories, finals);
    MatReader::new(reader).read_into(&mut extractor)?;
    extractor.finish()
}
