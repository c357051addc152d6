use std::io;

use slog::{Drain, Level, Logger};

use crate::config::ConfigError;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// Output format of the root logger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Text
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub async_channel_size: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_owned(),
            format: LogFormat::default(),
            async_channel_size: 1024,
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if get_level_by_string(&self.level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level {:?}",
                self.level
            )));
        }
        if self.async_channel_size == 0 {
            return Err(ConfigError::Invalid(
                "log async-channel-size must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

pub fn get_level_by_string(lv: &str) -> Option<Level> {
    match &*lv.to_lowercase() {
        "critical" => Some(Level::Critical),
        "error" => Some(Level::Error),
        // We support `warn` due to legacy.
        "warning" | "warn" => Some(Level::Warning),
        "debug" => Some(Level::Debug),
        "trace" => Some(Level::Trace),
        "info" => Some(Level::Info),
        _ => None,
    }
}

fn log_timestamp(io: &mut dyn io::Write) -> io::Result<()> {
    write!(io, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
}

/// Builds a root logger writing to stderr according to `cfg`.
pub fn build_logger(cfg: &LogConfig) -> Result<Logger, ConfigError> {
    cfg.validate()?;
    let level = get_level_by_string(&cfg.level).unwrap_or(Level::Info);

    let logger = match cfg.format {
        LogFormat::Text => {
            let decorator = slog_term::TermDecorator::new().stderr().build();
            let drain = slog_term::FullFormat::new(decorator)
                .use_custom_timestamp(log_timestamp)
                .build()
                .fuse();
            let drain = slog_async::Async::new(drain)
                .chan_size(cfg.async_channel_size)
                .build()
                .filter_level(level)
                .fuse();
            Logger::root(drain, slog::o!())
        }
        LogFormat::Json => {
            let drain = slog_json::Json::new(io::stderr())
                .add_default_keys()
                .build()
                .fuse();
            let drain = slog_async::Async::new(drain)
                .chan_size(cfg.async_channel_size)
                .build()
                .filter_level(level)
                .fuse();
            Logger::root(drain, slog::o!())
        }
    };
    Ok(logger)
}

/// Builds the root logger and installs it as the global one.
pub fn init_log(cfg: &LogConfig) -> Result<(), ConfigError> {
    let logger = build_logger(cfg)?;
    slog_global::set_global(logger);
    slog_global::info!("logger initialized"; "level" => &cfg.level, "format" => ?cfg.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_level_by_string() {
        assert_eq!(get_level_by_string("Warn"), Some(Level::Warning));
        assert_eq!(get_level_by_string("warning"), Some(Level::Warning));
        assert_eq!(get_level_by_string("TRACE"), Some(Level::Trace));
        assert_eq!(get_level_by_string("verbose"), None);
    }

    #[test]
    fn test_validate() {
        let mut cfg = LogConfig::default();
        cfg.validate().unwrap();

        cfg.level = "loud".to_owned();
        assert!(cfg.validate().is_err());

        cfg.level = "debug".to_owned();
        cfg.async_channel_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_build_logger() {
        let mut cfg = LogConfig::default();
        build_logger(&cfg).unwrap();
        cfg.format = LogFormat::Json;
        build_logger(&cfg).unwrap();
        cfg.level = "nope".to_owned();
        assert!(build_logger(&cfg).is_err());
    }
}
