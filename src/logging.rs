use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};

const LOG_ENV: &str = "BITACORA_LOG";
const DEFAULT_FILTER: &str = "warn";

#[derive(Debug)]
pub enum LoggingError {
    Io(std::io::Error),
    Install(log::SetLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::Io(err) => write!(f, "failed to open log file: {err}"),
            LoggingError::Install(err) => write!(f, "failed to install logger: {err}"),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Installs the process logger. `$BITACORA_LOG` overrides `configured`.
/// With `log_file` set, records are appended there instead of stderr, which
/// keeps them off the dashboard.
pub fn init_logging(configured: Option<&str>, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let mut builder = Builder::from_env(Env::default().filter_or(LOG_ENV, default_filter(configured)));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(LoggingError::Io)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(LoggingError::Io)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().map_err(LoggingError::Install)
}

fn default_filter(configured: Option<&str>) -> &str {
    match configured.map(str::trim) {
        Some(level) if !level.is_empty() => level,
        _ => DEFAULT_FILTER,
    }
}

#[cfg(test)]
mod tests {
    use super::default_filter;

    #[test]
    fn falls_back_to_warn() {
        assert_eq!(default_filter(None), "warn");
        assert_eq!(default_filter(Some("  ")), "warn");
        assert_eq!(default_filter(Some("info")), "info");
        assert_eq!(default_filter(Some("bitacora=debug")), "bitacora=debug");
    }
}
