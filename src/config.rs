use std::{fs, path::Path};

use color_eyre::eyre::{self, bail, WrapErr};
use keplerpos::{
    bodies::BodyId,
    constants::SECONDS_PER_DAY,
    kepler::Propagator,
    time::SimTime,
};
use serde::{Deserialize, Serialize};
use time::Duration;

/// A propagation run, read from a TOML scenario file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Chrono value of the first tick (seconds from epoch)
    pub start: f64,
    /// Seconds per tick
    pub step: f64,
    pub ticks: u64,
    pub bodies: Vec<BodyId>,
    pub propagator: Propagator,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            step: SECONDS_PER_DAY,
            ticks: 10,
            bodies: BodyId::ALL[1..].to_vec(),
            propagator: Propagator::default(),
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml(&text).wrap_err_with(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn from_toml(text: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.start_time()?;
        config.step_duration()?;
        config.propagator.validate().wrap_err("Invalid [propagator]")?;
        if config.propagator.tol.is_nan() || config.propagator.tol <= 0.0 {
            bail!("propagator.tol must be positive, got {}", config.propagator.tol);
        }
        Ok(config)
    }

    pub fn start_time(&self) -> eyre::Result<SimTime> {
        SimTime::try_from_seconds(self.start).wrap_err("Invalid start")
    }

    pub fn step_duration(&self) -> eyre::Result<Duration> {
        match Duration::checked_seconds_f64(self.step) {
            Some(step) => Ok(step),
            None => bail!("step must be a finite number of seconds, got {}", self.step),
        }
    }
}
