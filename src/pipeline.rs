//! End-to-end merge run: validate, merge, write, verify.

use crate::error::MergeError;
use crate::mmdb::{SourceDatabase, Tree, TreeOptions};
use crate::models::{source_label, MergeReport};
use crate::processing::{compare, merge, verify};
use crate::report::Reporter;
use colored::Colorize;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Output file used when none is given.
pub const DEFAULT_OUTPUT: &str = "combined.mmdb";
/// Database type written into the output metadata.
pub const DATABASE_TYPE: &str = "Combined-DB";
pub const IP_VERSION: u16 = 6;
pub const RECORD_SIZE: u16 = 28;
/// Fewest inputs worth merging.
pub const MIN_INPUTS: usize = 2;

/// Settings of one merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Input databases, in merge order.
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub debug: bool,
}

impl MergeConfig {
    pub fn new(inputs: Vec<PathBuf>) -> MergeConfig {
        MergeConfig {
            inputs,
            output: PathBuf::from(DEFAULT_OUTPUT),
            debug: false,
        }
    }
}

/// Check the inputs before any database is opened.
pub fn validate_inputs(inputs: &[PathBuf]) -> Result<(), MergeError> {
    if inputs.len() < MIN_INPUTS {
        return Err(MergeError::NotEnoughInputs {
            found: inputs.len(),
        });
    }
    for file in inputs {
        if !file.exists() {
            log::error!("{} File not found: {}", "ERROR:".red(), file.display());
            return Err(MergeError::InputNotFound(file.clone()));
        }
        log::info!("{} Valid file: {}", "VALID:".green(), file.display());
    }
    Ok(())
}

/// Options of the combined output database.
pub fn output_options(labels: &[String]) -> TreeOptions {
    let description = format!("Combined {}", labels.iter().join(", "));
    log::debug!(
        "{} Creating writer with description: {}",
        "DEBUG:".cyan(),
        description
    );
    TreeOptions {
        ip_version: IP_VERSION,
        database_type: DATABASE_TYPE.to_string(),
        description: BTreeMap::from([("en".to_string(), description)]),
        languages: vec!["en".to_string()],
        record_size: RECORD_SIZE,
        include_reserved_networks: false,
    }
}

fn open_source(path: &Path) -> Result<(SourceDatabase, String), MergeError> {
    let label = source_label(path);
    log::debug!("{} Using source name: {}", "DEBUG:".cyan(), label);
    SourceDatabase::open(path).map(|database| (database, label))
}

fn write_output(tree: &Tree, output: &Path) -> Result<u64, MergeError> {
    log::debug!("{} Writing output to: {}", "DEBUG:".cyan(), output.display());
    tree.write_file(output).map_err(|source| MergeError::Write {
        path: output.to_path_buf(),
        source,
    })
}

/// Run a full merge as described by `config`.
///
/// # Arguments
/// * `config` - Inputs, output and verbosity
/// * `reporter` - Receives skip warnings, progress and mismatches
///
/// # Returns
/// * `Ok(MergeReport)` - Statistics of the merge and of the written file
/// * `Err(MergeError)` - The first fatal error; nothing is written on merge errors
pub fn run_merge(config: &MergeConfig, reporter: &dyn Reporter) -> Result<MergeReport, MergeError> {
    validate_inputs(&config.inputs)?;

    let labels: Vec<String> = config.inputs.iter().map(|path| source_label(path)).collect();
    let mut tree = Tree::new(output_options(&labels))?;

    // Each input is opened only when its turn comes.
    let sources = config.inputs.iter().map(|path| open_source(path));
    let merged = merge(sources, &mut tree, reporter)?;
    let bytes_written = write_output(&tree, &config.output)?;
    log::debug!(
        "Wrote {} bytes, {} networks in tree",
        bytes_written,
        tree.network_count()
    );

    let verified = verify(&config.output)?;
    compare(&merged.totals, &verified, reporter);

    Ok(MergeReport {
        output: config.output.clone(),
        bytes_written,
        merge: merged,
        verified,
    })
}
