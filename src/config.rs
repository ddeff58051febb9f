use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tunables for coordination and scheduling. Defaults mirror the
/// documented protocol constants; every field can be overridden through a
/// `SOLOIST_*` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shortest jittered gap between periodic actions, in seconds.
    pub min_interval_secs: u64,
    /// Longest jittered gap between periodic actions, in seconds.
    pub max_interval_secs: u64,
    /// Actions per run before the schedule stops itself.
    pub max_actions: u32,
    /// Retained history entries for content deduplication.
    pub max_history: usize,
    /// Candidate regenerations before the forced-uniqueness suffix.
    pub max_generate_attempts: u32,
    /// Driver lease TTL. Kept above `max_interval_secs` so a live driver
    /// waiting out a full jitter interval is never misclassified as stale.
    pub driver_ttl_secs: u64,
    /// Surface-owner lease TTL.
    pub surface_ttl_secs: u64,
    /// Lease monitor cadence. Must stay at or below a third of the
    /// smallest TTL.
    pub monitor_tick_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_interval_secs: 15,
            max_interval_secs: 40,
            max_actions: 30,
            max_history: 100,
            max_generate_attempts: 10,
            driver_ttl_secs: 90,
            surface_ttl_secs: 30,
            monitor_tick_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_interval_secs: env_u64("SOLOIST_MIN_INTERVAL_SECS", defaults.min_interval_secs),
            max_interval_secs: env_u64("SOLOIST_MAX_INTERVAL_SECS", defaults.max_interval_secs),
            max_actions: env_u64("SOLOIST_MAX_ACTIONS", defaults.max_actions as u64) as u32,
            max_history: env_u64("SOLOIST_MAX_HISTORY", defaults.max_history as u64) as usize,
            max_generate_attempts: env_u64(
                "SOLOIST_MAX_GENERATE_ATTEMPTS",
                defaults.max_generate_attempts as u64,
            ) as u32,
            driver_ttl_secs: env_u64("SOLOIST_DRIVER_TTL_SECS", defaults.driver_ttl_secs),
            surface_ttl_secs: env_u64("SOLOIST_SURFACE_TTL_SECS", defaults.surface_ttl_secs),
            monitor_tick_secs: env_u64("SOLOIST_MONITOR_TICK_SECS", defaults.monitor_tick_secs),
        }
    }

    pub fn driver_ttl(&self) -> Duration {
        Duration::seconds(self.driver_ttl_secs as i64)
    }

    pub fn surface_ttl(&self) -> Duration {
        Duration::seconds(self.surface_ttl_secs as i64)
    }

    pub fn monitor_tick(&self) -> StdDuration {
        StdDuration::from_secs(self.monitor_tick_secs)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_interval_secs, 15);
        assert_eq!(config.max_interval_secs, 40);
        assert_eq!(config.max_actions, 30);
        assert_eq!(config.max_history, 100);
    }

    #[test]
    fn test_monitor_tick_within_ttl_budget() {
        let config = Config::default();
        let smallest_ttl = config.surface_ttl_secs.min(config.driver_ttl_secs);
        assert!(config.monitor_tick_secs * 3 <= smallest_ttl);
    }
}
