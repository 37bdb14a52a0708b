//! Runner configuration structures and loaders.
use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// When a [`Runner`](crate::Runner) ticks its tree.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UpdateMode {
    /// Every host frame ticks the tree once.
    #[default]
    Auto,
    /// The tree only advances on explicit [`Runner::tick`](crate::Runner::tick) calls.
    Manual,
}

/// Settings shared by every runner a host creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    pub update_mode: UpdateMode,
    /// Start a new run on the frame after the tree finishes.
    pub auto_reset: bool,
    /// Fixed seed for the tree's random source; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::Auto,
            auto_reset: true,
            seed: None,
        }
    }
}

impl RunnerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BT_UPDATE_MODE` - `auto` or `manual` (default: auto)
    /// - `BT_AUTO_RESET` - Restart finished trees (default: true)
    /// - `BT_SEED` - Seed for every tree's random source (default: entropy)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(mode) = read_var::<UpdateMode>(&lookup, "BT_UPDATE_MODE")? {
            config.update_mode = mode;
        }

        if let Some(auto_reset) = read_var::<bool>(&lookup, "BT_AUTO_RESET")? {
            config.auto_reset = auto_reset;
        }

        config.seed = read_var::<u64>(&lookup, "BT_SEED")?;

        Ok(config)
    }

    /// Copy of this configuration with the seed offset by `index`, so that
    /// runners created from one config make different but reproducible draws.
    pub fn for_instance(&self, index: u64) -> Self {
        Self {
            seed: self.seed.map(|seed| seed.wrapping_add(index)),
            ..self.clone()
        }
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>>
where
    T: FromStr,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| RuntimeError::InvalidSetting {
            key,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = RunnerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = RunnerConfig::from_lookup(lookup(&[
            ("BT_UPDATE_MODE", "Manual"),
            ("BT_AUTO_RESET", "false"),
            ("BT_SEED", "99"),
        ]))
        .unwrap();

        assert_eq!(config.update_mode, UpdateMode::Manual);
        assert!(!config.auto_reset);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn rejects_unparsable_values() {
        let error = RunnerConfig::from_lookup(lookup(&[("BT_SEED", "forty-two")])).unwrap_err();
        assert!(matches!(
            error,
            RuntimeError::InvalidSetting { key: "BT_SEED", .. }
        ));

        assert!(RunnerConfig::from_lookup(lookup(&[("BT_UPDATE_MODE", "sometimes")])).is_err());
    }

    #[test]
    fn instance_seeds_are_offset() {
        let config = RunnerConfig {
            seed: Some(10),
            ..RunnerConfig::default()
        };
        assert_eq!(config.for_instance(3).seed, Some(13));
        assert_eq!(RunnerConfig::default().for_instance(3).seed, None);
    }
}
