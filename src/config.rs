use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::network::topology::{DEFAULT_ROUTER_WIDTH, DEFAULT_TRANSMISSION_SPEED};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Progress every packet gains per tick.
    pub transmission_speed: f64,
    /// Drawn router width; hover hit-testing uses half of it as radius.
    pub router_width: f64,
    /// Period of the async tick driver. Packet progress does not depend on it.
    pub tick_interval_ms: u64,
    /// Upper bound for synchronous runs.
    pub max_ticks: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            transmission_speed: DEFAULT_TRANSMISSION_SPEED,
            router_width: DEFAULT_ROUTER_WIDTH,
            tick_interval_ms: 10,
            max_ticks: 100_000,
        }
    }
}

impl SimulatorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: SimulatorConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("failed to write config file {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.transmission_speed.is_finite() && self.transmission_speed > 0.0,
            "transmission_speed must be positive, got {}",
            self.transmission_speed
        );
        ensure!(
            self.router_width.is_finite() && self.router_width >= 0.0,
            "router_width must be non-negative, got {}",
            self.router_width
        );
        ensure!(self.tick_interval_ms > 0, "tick_interval_ms must be positive");
        ensure!(self.max_ticks > 0, "max_ticks must be positive");
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
