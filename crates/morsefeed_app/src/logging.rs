//! Logging initialization for the morsefeed binary.
//!
//! Log output never goes to stdout, which may be carrying converted text.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Destination for log output.
pub enum LogDestination {
    /// Write to stderr.
    Terminal,
    /// Write to the given file, truncating it.
    File(PathBuf),
}

pub fn initialize(destination: LogDestination, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = build_config();

    let logger: Box<dyn SharedLogger> = match destination {
        LogDestination::Terminal => terminal_logger(level, config),
        LogDestination::File(path) => match File::create(&path) {
            Ok(file) => WriteLogger::new(level, config, file),
            Err(err) => {
                eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
                terminal_logger(level, build_config())
            }
        },
    };

    let _ = CombinedLogger::init(vec![logger]);
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<TermLogger> {
    TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}
