//! Output rendering
//!
//! Catalogs are printed as tab-separated lines, extractions as a JSON
//! object keyed by file path.

use anyhow::{Context, Result};
use dsres_decoder::Extraction;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Render catalogs as `name<TAB>description` lines, one block per file
pub fn render_catalogs(catalogs: &BTreeMap<String, BTreeMap<String, String>>) -> String {
    let mut out = String::new();
    for (file, catalog) in catalogs {
        if catalogs.len() > 1 {
            out.push_str(&format!("# {}\n", file));
        }
        for (name, description) in catalog {
            out.push_str(&format!("{}\t{}\n", name, description));
        }
    }
    out
}

/// Render extractions as JSON
pub fn render_extractions(extractions: &BTreeMap<String, Extraction>, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(extractions)
    } else {
        serde_json::to_string(extractions)
    };
    json.context("Failed to serialize extraction results")
}

/// Write rendered output to a file, or stdout when no path is given
pub fn emit(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write output: {:?}", path))?;
            log::info!("Wrote {} bytes to {:?}", content.len(), path);
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}
