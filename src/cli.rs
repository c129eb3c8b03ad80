//! Command line surface.

use crate::error::MergeError;
use crate::output::{print_summary, report_json};
use crate::pipeline::{run_merge, MergeConfig, DEFAULT_OUTPUT};
use crate::report::LogReporter;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

/// Env var overriding the default output path.
pub const OUTPUT_ENV: &str = "MMDB_MERGE_OUTPUT";

#[derive(Parser, Debug)]
#[command(name = "mmdb-merge", version, about = "A tool to merge multiple MMDB files")]
pub struct Cli {
    /// Input MMDB files (minimum 2)
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output MMDB file
    #[arg(short, long, env = OUTPUT_ENV, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Enable debug logging
    #[arg(short = 'v', long, visible_alias = "verbose")]
    pub debug: bool,

    /// Print the final report as JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn config(&self) -> MergeConfig {
        MergeConfig {
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            debug: self.debug,
        }
    }
}

/// Run the merge for parsed arguments and print the outcome.
pub fn run(cli: &Cli) -> Result<(), MergeError> {
    let config = cli.config();
    if config.debug {
        log::debug!(
            "{} Processing input files: {:?}",
            "DEBUG:".cyan(),
            config.inputs
        );
    }

    let report = run_merge(&config, &LogReporter)?;
    if cli.json {
        println!("{}", report_json(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["mmdb-merge", "a.mmdb", "b.mmdb"]).unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("a.mmdb"), PathBuf::from("b.mmdb")]);
        assert!(!cli.debug);
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "mmdb-merge",
            "--verbose",
            "-o",
            "out.mmdb",
            "--json",
            "a.mmdb",
            "b.mmdb",
            "c.mmdb",
        ])
        .unwrap();
        assert_eq!(cli.inputs.len(), 3);
        assert_eq!(cli.output, PathBuf::from("out.mmdb"));
        assert!(cli.debug);
        assert!(cli.json);
        assert_eq!(cli.config().output, PathBuf::from("out.mmdb"));
    }

    #[test]
    fn test_parse_requires_input() {
        assert!(Cli::try_parse_from(["mmdb-merge", "-o", "out.mmdb"]).is_err());
    }
}
