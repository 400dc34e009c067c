//! Server configuration.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use stepwise_playback::PlaybackConfig;

use crate::error::{Error, Result};

/// Configuration for the visualization server.
#[derive(Debug, Clone)]
pub struct VisConfig {
    /// HTTP listen port
    pub port: u16,

    /// Player settings
    pub playback: PlaybackConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            playback: PlaybackConfig::default(),
        }
    }
}

impl VisConfig {
    /// Read `STEPWISE_PORT`, `STEPWISE_BASE_INTERVAL_MS` and
    /// `STEPWISE_FRAME_CAPACITY`, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`VisConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = parse(&lookup, "STEPWISE_PORT", defaults.port)?;

        let interval_ms = parse(&lookup, "STEPWISE_BASE_INTERVAL_MS", 1000u64)?;
        if interval_ms == 0 {
            return Err(Error::Config(
                "STEPWISE_BASE_INTERVAL_MS must be positive".into(),
            ));
        }

        let frame_capacity = parse(
            &lookup,
            "STEPWISE_FRAME_CAPACITY",
            defaults.playback.frame_capacity,
        )?;

        Ok(Self {
            port,
            playback: defaults
                .playback
                .with_base_interval(Duration::from_millis(interval_ms))
                .with_frame_capacity(frame_capacity),
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {key} {raw:?}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = VisConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.playback.base_interval, Duration::from_millis(1000));
        assert_eq!(config.playback.frame_capacity, 256);
    }

    #[test]
    fn reads_overrides() {
        let config = VisConfig::from_lookup(lookup(&[
            ("STEPWISE_PORT", "8080"),
            ("STEPWISE_BASE_INTERVAL_MS", "250"),
            ("STEPWISE_FRAME_CAPACITY", "16"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.playback.base_interval, Duration::from_millis(250));
        assert_eq!(config.playback.frame_capacity, 16);
    }

    #[test]
    fn rejects_garbage() {
        let err = VisConfig::from_lookup(lookup(&[("STEPWISE_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err =
            VisConfig::from_lookup(lookup(&[("STEPWISE_BASE_INTERVAL_MS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
