//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use stockroom_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    /// Reject edits of completed packing slips.
    pub lock_completed_slips: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::Json,
            lock_completed_slips: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "STOCKROOM_BIND_ADDR", DEFAULT_BIND_ADDR, |v| {
            v.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;
        let log_format = parse_or(&lookup, "STOCKROOM_LOG_FORMAT", "json", |v| {
            v.parse::<LogFormat>().map_err(|e| e.to_string())
        })?;
        let lock_completed_slips =
            parse_or(&lookup, "STOCKROOM_LOCK_COMPLETED_SLIPS", "false", parse_bool)?;

        Ok(Self {
            bind_addr,
            log_format,
            lock_completed_slips,
        })
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &'static str, default: &str, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    let value = lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());
    parse(&value).map_err(|reason| ConfigError::Invalid {
        key,
        value,
        reason,
    })
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn reads_all_keys() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("STOCKROOM_BIND_ADDR", "127.0.0.1:9000"),
            ("STOCKROOM_LOG_FORMAT", "pretty"),
            ("STOCKROOM_LOCK_COMPLETED_SLIPS", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.lock_completed_slips);
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup(&[("STOCKROOM_LOCK_COMPLETED_SLIPS", "maybe")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "STOCKROOM_LOCK_COMPLETED_SLIPS", .. }
        ));

        assert!(AppConfig::from_lookup(lookup(&[("STOCKROOM_BIND_ADDR", "nowhere")])).is_err());
    }
}
