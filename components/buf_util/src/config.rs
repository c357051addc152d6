use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;

quick_error! {
    /// Errors raised while loading or validating a configuration.
    #[derive(Debug)]
    pub enum ConfigError {
        Io(err: io::Error) {
            from()
            cause(err)
            display("failed to read config: {}", err)
        }
        Parse(err: toml::de::Error) {
            from()
            cause(err)
            display("failed to parse config: {}", err)
        }
        Invalid(msg: String) {
            display("invalid config: {}", msg)
        }
    }
}

/// Reads and deserializes a TOML file.
pub fn load_from_file<T, P>(path: P) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Deserializes TOML text.
pub fn load_from_str<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let cfg = toml::from_str(content)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    #[serde(rename_all = "kebab-case")]
    struct Sample {
        name: String,
        slot_count: usize,
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"buf\"\nslot-count = 3").unwrap();

        let sample: Sample = load_from_file(file.path()).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "buf".to_owned(),
                slot_count: 3,
            }
        );
    }

    #[test]
    fn test_load_errors() {
        match load_from_file::<Sample, _>("/path/does/not/exist.toml") {
            Err(ConfigError::Io(_)) => {}
            other => panic!("expect io error, got {:?}", other),
        }
        match load_from_str::<Sample>("slot-count = \"three\"") {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("expect parse error, got {:?}", other),
        }
    }
}
