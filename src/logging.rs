//! Logging setup with log4rs.

use crate::error::MergeError;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Env var naming a log4rs YAML file that replaces the built-in config.
pub const LOG_CONFIG_ENV: &str = "MMDB_MERGE_LOG_CONFIG";

const LOG_PATTERN: &str = "{d(%Y/%m/%d %H:%M:%S)} {m}{n}";

/// Root level for the given verbosity.
pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the global logger, writing to stderr.
pub fn init(debug: bool) -> Result<(), MergeError> {
    if let Ok(file) = std::env::var(LOG_CONFIG_ENV) {
        log4rs::init_file(&file, Default::default())
            .map_err(|e| MergeError::Logging(format!("{file}: {e}")))?;
        log::debug!("Logging configured from {file}");
        return Ok(());
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level_for(debug)))
        .map_err(|e| MergeError::Logging(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| MergeError::Logging(e.to_string()))?;
    Ok(())
}
