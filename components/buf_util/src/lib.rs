//! Ambient utilities shared by the workspace: logger construction and
//! configuration-file loading.

#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod logger;

pub use crate::config::{load_from_file, load_from_str, ConfigError};
pub use crate::logger::{init_log, LogConfig, LogFormat};
