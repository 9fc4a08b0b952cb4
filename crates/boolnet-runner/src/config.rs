//! Run configuration.

use std::{num::NonZeroUsize, thread};

use boolnet_core::{DEFAULT_MAX_STEPS, TracerConfig, is_node_name};

use crate::error::ConfigError;

/// Worker count used when the platform cannot report its parallelism.
pub const FALLBACK_WORKERS: usize = 4;

/// Default number of sampled initial states.
pub const DEFAULT_SAMPLES: usize = 1000;

/// Default output artifact path.
pub const DEFAULT_OUTPUT: &str = "state_transitions.csv";

/// Worker pool and tracer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Worker threads in the pool
    pub workers: usize,
    /// Step bound handed to every tracer
    pub max_steps: usize,
}

impl CoordinatorConfig {
    /// Tracer settings derived from this configuration.
    pub fn tracer(&self) -> TracerConfig {
        TracerConfig { max_steps: self.max_steps }
    }

    /// Reject zero workers or a zero step bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism().map_or(FALLBACK_WORKERS, NonZeroUsize::get);
        Self { workers, max_steps: DEFAULT_MAX_STEPS }
    }
}

/// Full configuration for a sampled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Pool and tracer settings
    pub coordinator: CoordinatorConfig,
    /// Number of random initial states to trace
    pub samples: usize,
    /// Sampling seed; a fresh one is drawn and logged when absent
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Validate the coordinator settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.coordinator.validate()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { coordinator: CoordinatorConfig::default(), samples: DEFAULT_SAMPLES, seed: None }
    }
}

/// Parse a `NAME=BIT` clamp argument.
pub fn parse_clamp(arg: &str) -> Result<(String, bool), ConfigError> {
    let invalid = || ConfigError::InvalidClamp { arg: arg.to_string() };

    let (name, bit) = arg.split_once('=').ok_or_else(invalid)?;
    let (name, bit) = (name.trim(), bit.trim());
    if !is_node_name(name) {
        return Err(invalid());
    }
    let value = match bit {
        "0" => false,
        "1" => true,
        _ => return Err(invalid()),
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunConfig::default();
        assert!(config.coordinator.workers >= 1);
        assert_eq!(config.coordinator.max_steps, 1000);
        assert_eq!(config.samples, 1000);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zeros() {
        let zero_workers = CoordinatorConfig { workers: 0, max_steps: 10 };
        assert_eq!(zero_workers.validate(), Err(ConfigError::ZeroWorkers));

        let zero_steps = CoordinatorConfig { workers: 2, max_steps: 0 };
        assert_eq!(zero_steps.validate(), Err(ConfigError::ZeroMaxSteps));
    }

    #[test]
    fn tracer_config_carries_step_bound() {
        let config = CoordinatorConfig { workers: 1, max_steps: 42 };
        assert_eq!(config.tracer().max_steps, 42);
    }

    #[test]
    fn parses_clamps() {
        assert_eq!(parse_clamp("Akt=1"), Ok(("Akt".to_string(), true)));
        assert_eq!(parse_clamp("p53 = 0"), Ok(("p53".to_string(), false)));
    }

    #[test]
    fn rejects_bad_clamps() {
        for arg in ["Akt", "Akt=2", "=1", "Akt=true", "NOT=1", "a b=1"] {
            assert_eq!(
                parse_clamp(arg),
                Err(ConfigError::InvalidClamp { arg: arg.to_string() }),
                "{arg}"
            );
        }
    }
}
