//! Demo runner configuration

use crate::logging::LogConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Number of injection attempts made when none is configured
pub const DEFAULT_INJECTION_ROUNDS: usize = 5;

/// Settings for one run of the injection demo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// RNG seed; the wall clock is used when `None`
    pub seed: Option<u64>,
    /// How many tautology-injected queries to try
    pub injection_rounds: usize,
    /// Logging setup, applied by the binary
    pub log: LogConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: None,
            injection_rounds: DEFAULT_INJECTION_ROUNDS,
            log: LogConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Use a fixed seed so runs are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of injection rounds
    pub fn with_injection_rounds(mut self, rounds: usize) -> Self {
        self.injection_rounds = rounds;
        self
    }

    /// Set the logging configuration
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Build the RNG for this run.
    pub fn rng(&self) -> StdRng {
        let seed = self.seed.unwrap_or_else(clock_seed);
        info!(seed, "Seeding injection RNG");
        StdRng::seed_from_u64(seed)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_defaults() {
        let config = DemoConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.injection_rounds, 5);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = DemoConfig::default()
            .with_seed(9)
            .with_injection_rounds(2)
            .with_log(LogConfig::debug());
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.injection_rounds, 2);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = DemoConfig::default().with_seed(42);
        let mut a = config.rng();
        let mut b = config.rng();
        for _ in 0..8 {
            assert_eq!(a.gen::<u32>(), b.gen::<u32>());
        }
    }
}
