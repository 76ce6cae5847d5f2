//! Plugin parameters.
//!
//! protoc passes everything after the `:` of `--go-temporal_out` (or the
//! value of `--go-temporal_opt`) as one comma-separated string of
//! `key=value` pairs.

use std::fmt;

use temporal_codegen::{Features, Paths};

/// Settings parsed from the protoc parameter string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginConfig {
    pub features: Features,
    pub paths: Paths,
}

/// A parameter protoc passed that the plugin does not understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownKey(String),
    MissingValue(String),
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownKey(key) => write!(f, "unknown parameter {key:?}"),
            ConfigError::MissingValue(key) => write!(f, "parameter {key:?} needs a value"),
            ConfigError::InvalidValue {
                key,
                value,
                expected,
            } => write!(
                f,
                "invalid value {value:?} for parameter {key:?}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PluginConfig {
    pub fn parse(parameter: &str) -> Result<Self, ConfigError> {
        let mut config = PluginConfig::default();
        for pair in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => return Err(ConfigError::MissingValue(pair.to_string())),
            };
            match key {
                "enable-updates" => config.features.updates = parse_bool(key, value)?,
                "paths" => {
                    config.paths = match value {
                        "import" => Paths::Import,
                        "source_relative" => Paths::SourceRelative,
                        _ => {
                            return Err(ConfigError::InvalidValue {
                                key: key.to_string(),
                                value: value.to_string(),
                                expected: "import or source_relative",
                            });
                        }
                    }
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn empty_parameter_uses_defaults() {
        let config = PluginConfig::parse("").unwrap();
        assert!(config.features.updates);
        assert_eq!(config.paths, Paths::Import);
    }

    #[test]
    fn recognizes_every_key() {
        let config = PluginConfig::parse("enable-updates=false, paths=source_relative").unwrap();
        assert!(!config.features.updates);
        assert_eq!(config.paths, Paths::SourceRelative);
    }

    #[test]
    fn later_values_win() {
        let config = PluginConfig::parse("paths=source_relative,paths=import").unwrap();
        assert_eq!(config.paths, Paths::Import);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert_eq!(
            PluginConfig::parse("plugins=grpc"),
            Err(ConfigError::UnknownKey("plugins".to_string()))
        );
    }

    #[test]
    fn rejects_bare_keys() {
        let err = PluginConfig::parse("enable-updates").unwrap_err();
        assert_snapshot!(err.to_string(), @r#"parameter "enable-updates" needs a value"#);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = PluginConfig::parse("enable-updates=yes").unwrap_err();
        assert_snapshot!(
            err.to_string(),
            @r#"invalid value "yes" for parameter "enable-updates", expected true or false"#
        );
        assert!(matches!(
            PluginConfig::parse("paths=relative"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
