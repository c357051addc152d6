use std::path::Path;

use buf_util::{ConfigError, LogConfig};

use crate::bound_buffer::BoundBuffer;
use crate::util::mp::{MonitorBuffer, SemaphoreBuffer};

pub const DEFAULT_CAPACITY: usize = 5;

/// Which coordination scheme a configured buffer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Monitor,
    Semaphore,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Monitor
    }
}

/// Configuration of a bounded buffer, usually read from a TOML file:
///
/// ```toml
/// capacity = 5
/// strategy = "semaphore"
///
/// [log]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
pub struct BufferConfig {
    pub capacity: usize,
    pub strategy: Strategy,
    pub log: LogConfig,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            capacity: DEFAULT_CAPACITY,
            strategy: Strategy::default(),
            log: LogConfig::default(),
        }
    }
}

impl BufferConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let cfg: BufferConfig = buf_util::load_from_file(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: BufferConfig = buf_util::load_from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid(
                "buffer capacity must be positive".to_owned(),
            ));
        }
        self.log.validate()
    }

    /// Installs the configured logger as the global one.
    pub fn init_log(&self) -> Result<(), ConfigError> {
        buf_util::init_log(&self.log)
    }

    /// Builds an empty buffer of the configured strategy and capacity.
    pub fn build<T: Send + 'static>(&self) -> Result<Box<dyn BoundBuffer<T>>, ConfigError> {
        self.validate()?;
        let buf: Box<dyn BoundBuffer<T>> = match self.strategy {
            Strategy::Monitor => Box::new(MonitorBuffer::new(self.capacity)),
            Strategy::Semaphore => Box::new(SemaphoreBuffer::new(self.capacity)),
        };
        Ok(buf)
    }
}
