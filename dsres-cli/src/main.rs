//! Simulation Result Decoder CLI
//!
//! Command-line front end for the dsres-decoder library:
//! - List the variables of result files (`--list`)
//! - Extract trajectories and final values as JSON
//! - Selections from flags and/or a TOML config file
//! - Several files decoded in parallel

use anyhow::{bail, Context, Result};
use clap::Parser;
use dsres_decoder::{Extraction, ExtractorConfig};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

mod config;
mod report;

/// dsres - Decode simulation result files
#[derive(Parser, Debug)]
#[command(name = "dsres")]
#[command(about = "Extract signals from Modelica simulation result files (dsres.mat)", long_about = None)]
#[command(version)]
struct Args {
    /// Result file(s) to decode
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Only list variable names and descriptions
    #[arg(short, long)]
    list: bool,

    /// Variable whose trajectory to extract (can be repeated)
    #[arg(short, long = "trajectory", value_name = "NAME")]
    trajectory: Vec<String>,

    /// Variable whose final value to extract (can be repeated)
    #[arg(short, long = "final", value_name = "NAME")]
    finals: Vec<String>,

    /// Select every variable starting with this prefix, for both outputs
    #[arg(long, value_name = "PREFIX")]
    prefix: Vec<String>,

    /// Extract the final value of every variable
    #[arg(long)]
    all_finals: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("dsres CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", dsres_decoder::VERSION);

    let mut app = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };
    merge_args(&mut app, &args);

    if app.input.files.is_empty() {
        bail!("No result files given (pass FILE arguments or [input] files in the config)");
    }

    let output = app.output.path.clone();
    let content = if args.list {
        list_mode(&app.input.files)?
    } else {
        let extractor_config = app.extractor_config();
        if extractor_config.trajectories.is_empty() && extractor_config.finals.is_empty() {
            bail!("Nothing selected: use --trajectory, --final, --prefix, --all-finals or --list");
        }
        extract_mode(&app.input.files, &extractor_config, app.output.pretty)?
    };

    report::emit(&content, output.as_deref())
}

/// Command line flags extend whatever the config file selected
fn merge_args(app: &mut config::AppConfig, args: &Args) {
    app.input.files.extend(args.files.iter().cloned());
    app.trajectories.names.extend(args.trajectory.iter().cloned());
    app.finals.names.extend(args.finals.iter().cloned());
    for prefix in &args.prefix {
        app.trajectories.prefixes.push(prefix.clone());
        app.finals.prefixes.push(prefix.clone());
    }
    if args.all_finals {
        app.finals.all = true;
    }
    if args.output.is_some() {
        app.output.path = args.output.clone();
    }
    if args.pretty {
        app.output.pretty = true;
    }
}

/// Catalog of every file
fn list_mode(files: &[PathBuf]) -> Result<String> {
    let catalogs = files
        .par_iter()
        .map(|path| {
            let catalog = dsres_decoder::read_catalog(path)
                .with_context(|| format!("Failed to read catalog of {:?}", path))?;
            Ok((path.display().to_string(), catalog))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(report::render_catalogs(&catalogs))
}

/// Trajectories and finals of every file, as JSON
fn extract_mode(files: &[PathBuf], config: &ExtractorConfig, pretty: bool) -> Result<String> {
    let extractions: BTreeMap<String, Extraction> = files
        .par_iter()
        .map(|path| {
            let extraction = dsres_decoder::extract(path, config)
                .with_context(|| format!("Failed to decode {:?}", path))?;
            log::info!(
                "{:?}: {} trajectories, {} finals",
                path,
                extraction.trajectories.len(),
                extraction.finals.len()
            );
            Ok((path.display().to_string(), extraction))
        })
        .collect::<Result<_>>()?;

    for (file, extraction) in &extractions {
        for (name, value) in &extraction.finals {
            if value.is_none() {
                log::warn!("{}: no final value recorded for '{}'", file, name);
            }
        }
    }

    report::render_extractions(&extractions, pretty)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
