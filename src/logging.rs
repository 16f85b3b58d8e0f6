use std::fs::{self, File};

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use crate::config::LogConfig;
use crate::error::{AppError, AppResult};

pub fn parse_level(level: &str) -> AppResult<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(AppError::invalid_argument(format!(
            "unknown log level: {other}"
        ))),
    }
}

/// Installs the global logger: a file when `config.file` is set, stderr
/// otherwise. Can only succeed once per process.
pub fn init(config: &LogConfig) -> AppResult<()> {
    let level = parse_level(&config.level)?;
    let log_config = ConfigBuilder::new()
        .add_filter_allow_str(env!("CARGO_CRATE_NAME"))
        .build();

    let installed = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|source| {
                    AppError::io_with_context(
                        source,
                        format!("failed to create log directory: {}", parent.display()),
                    )
                })?;
            }
            let file = File::create(path).map_err(|source| {
                AppError::io_with_context(
                    source,
                    format!("failed to create log file: {}", path.display()),
                )
            })?;
            WriteLogger::init(level, log_config, file)
        }
        None => TermLogger::init(
            level,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    };

    installed.map_err(|err| AppError::unsupported(format!("logger already installed: {err}")))
}
