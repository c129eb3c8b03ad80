use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use mmdb_merge::cli::{run, Cli};
use mmdb_merge::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();

    if std::env::args_os().len() == 1 {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Err(e) = logging::init(cli.debug) {
        eprintln!("{}", format!("Error: {e}").red());
        return ExitCode::FAILURE;
    }
    log::debug!("#Start main()");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            ExitCode::FAILURE
        }
    }
}
