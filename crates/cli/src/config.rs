//! Simulation configuration loader.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use bt_runtime::UpdateMode;
use serde::{Deserialize, Serialize};

/// Parameters of a headless patrol simulation.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of agents, each with its own tree instance.
    pub agents: usize,
    /// Number of frames to simulate.
    pub frames: u64,
    /// Simulated time per frame, in milliseconds.
    pub frame_ms: u64,
    /// Half-width of the square patrol area.
    pub extent: f64,
    /// Rest time at each patrol point, in milliseconds.
    pub wait_ms: u64,
    /// Time allowed to reach a patrol point, in milliseconds.
    pub leg_timeout_ms: u64,
    /// Threshold of the rest check; a draw above it skips the rest.
    pub failure_chance: f64,
    /// Overrides `BT_UPDATE_MODE` when set.
    pub update_mode: Option<UpdateMode>,
    /// Frames between ticks when runners are in manual mode.
    pub tick_interval: u64,
    /// Put a breakpoint at the start of every patrol leg.
    pub breakpoints: bool,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agents: 3,
            frames: 600,
            frame_ms: 50,
            extent: 10.0,
            wait_ms: 1000,
            leg_timeout_ms: 10_000,
            failure_chance: 0.5,
            update_mode: None,
            tick_interval: 5,
            breakpoints: false,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Load a simulation config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.frame_ms == 0 {
            anyhow::bail!("frame_ms must be positive");
        }
        if self.tick_interval == 0 {
            anyhow::bail!("tick_interval must be positive");
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            anyhow::bail!("extent must be a positive number, got {}", self.extent);
        }
        if !(0.0..=1.0).contains(&self.failure_chance) {
            anyhow::bail!("failure_chance must lie in [0, 1], got {}", self.failure_chance);
        }
        Ok(())
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn wait_duration(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn leg_timeout(&self) -> Duration {
        Duration::from_millis(self.leg_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_config("agents = 7\nseed = 12\n");
        let config = SimConfig::load(file.path()).unwrap();

        assert_eq!(config.agents, 7);
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.frames, SimConfig::default().frames);
        assert_eq!(config.frame_duration(), Duration::from_millis(50));
    }

    #[test]
    fn full_file_round_trips() {
        let expected = SimConfig {
            agents: 2,
            frames: 10,
            frame_ms: 20,
            extent: 4.5,
            wait_ms: 300,
            leg_timeout_ms: 2000,
            failure_chance: 0.25,
            update_mode: Some(UpdateMode::Manual),
            tick_interval: 3,
            breakpoints: true,
            seed: Some(8),
        };
        let file = write_config(&toml::to_string(&expected).unwrap());

        assert_eq!(SimConfig::load(file.path()).unwrap(), expected);
    }

    #[test]
    fn update_mode_is_read_in_lowercase() {
        let file = write_config("update_mode = \"manual\"\ntick_interval = 4\n");
        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.update_mode, Some(UpdateMode::Manual));
        assert_eq!(config.tick_interval, 4);

        let file = write_config("update_mode = \"sometimes\"\n");
        assert!(SimConfig::load(file.path()).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = write_config("failure_chance = 1.5\n");
        let error = SimConfig::load(file.path()).unwrap_err();
        assert!(error.to_string().contains("failure_chance"));

        let file = write_config("frame_ms = 0\n");
        assert!(SimConfig::load(file.path()).is_err());
    }

    #[test]
    fn malformed_toml_is_reported() {
        let file = write_config("agents = \"many\"\n");
        let error = SimConfig::load(file.path()).unwrap_err();
        assert!(error.to_string().contains("Failed to parse config TOML"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let error = SimConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(error.to_string().contains("absent.toml"));
    }
}
