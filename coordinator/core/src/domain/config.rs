// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Coordinator Configuration
//
// Lease lengths, maintenance cadence and scan defaults. Loaded from YAML:
//
//   block_claim_duration: 30s
//   area_claim_duration: 5m
//   goal_claim_duration: 15s
//   scan:
//     max_cells: 128
//
// Every field is optional; omitted fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::vein::{LabelSet, ScanOptions};

/// Environment variable pointing at a configuration file.
pub const CONFIG_PATH_ENV: &str = "GRIDLOCK_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Lease on a single claimed cell.
    #[serde(with = "humantime_serde")]
    pub block_claim_duration: Duration,

    /// Lease on an assigned zone.
    #[serde(with = "humantime_serde")]
    pub area_claim_duration: Duration,

    /// Lease on a registered pathfinding goal.
    #[serde(with = "humantime_serde")]
    pub goal_claim_duration: Duration,

    /// Agents not refreshed within this window drop out of active queries.
    #[serde(with = "humantime_serde")]
    pub agent_stale_after: Duration,

    /// Position refresh cadence of the maintenance loop.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,

    /// Expired-lease sweep cadence of the maintenance loop.
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,

    /// Radius within which another agent's goal makes a target occupied.
    pub goal_occupancy_radius: f64,

    /// Largest ring searched for an alternative goal.
    pub goal_search_radius: u32,

    /// Seed for tie-break shuffles; unseeded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,

    pub scan: ScanConfig,
}

/// Defaults applied to scans that don't pass their own options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub max_cells: usize,
    pub max_radius: f64,
    pub sort_by_distance: bool,
    pub empty_labels: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = ScanOptions::default();
        Self {
            max_cells: defaults.max_cells,
            max_radius: defaults.max_radius,
            sort_by_distance: defaults.sort_by_distance,
            empty_labels: defaults.empty_labels.iter().map(str::to_string).collect(),
        }
    }
}

impl ScanConfig {
    pub fn to_options(&self) -> ScanOptions {
        ScanOptions {
            max_cells: self.max_cells,
            max_radius: self.max_radius,
            sort_by_distance: self.sort_by_distance,
            empty_labels: LabelSet::new(self.empty_labels.iter().cloned()),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            block_claim_duration: Duration::from_millis(30_000),
            area_claim_duration: Duration::from_millis(300_000),
            goal_claim_duration: Duration::from_millis(15_000),
            agent_stale_after: Duration::from_secs(5),
            refresh_interval: Duration::from_secs(1),
            cleanup_interval: Duration::from_secs(1),
            goal_occupancy_radius: 1.0,
            goal_search_radius: 3,
            rng_seed: None,
            scan: ScanConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load configuration with discovery, fallback to default
    ///
    /// 1. Explicit path (fails if missing/invalid)
    /// 2. `GRIDLOCK_CONFIG_PATH`
    /// 3. `./gridlock.yaml`
    /// 4. Defaults
    ///
    /// Environment overrides and validation run in every case.
    pub fn load_or_default(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        let path = explicit.or_else(Self::discover_config);
        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading coordinator configuration from {:?}", path);
                Self::from_yaml_file(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to load coordinator config at {:?}: {}", path, e)
                })?
            }
            None => {
                tracing::debug!("No coordinator configuration file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }
        let cwd = PathBuf::from("./gridlock.yaml");
        cwd.exists().then_some(cwd)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GRIDLOCK_RNG_SEED") {
            match val.trim().parse::<u64>() {
                Ok(seed) => {
                    tracing::info!("Environment override: GRIDLOCK_RNG_SEED={}", seed);
                    self.rng_seed = Some(seed);
                }
                Err(_) => {
                    tracing::warn!("Invalid value for GRIDLOCK_RNG_SEED: '{}'. Ignoring.", val);
                }
            }
        }

        if let Ok(val) = std::env::var("GRIDLOCK_BLOCK_CLAIM_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) => {
                    tracing::info!("Environment override: GRIDLOCK_BLOCK_CLAIM_MS={}", ms);
                    self.block_claim_duration = Duration::from_millis(ms);
                }
                Err(_) => {
                    tracing::warn!("Invalid value for GRIDLOCK_BLOCK_CLAIM_MS: '{}'. Ignoring.", val);
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("block_claim_duration", self.block_claim_duration),
            ("area_claim_duration", self.area_claim_duration),
            ("goal_claim_duration", self.goal_claim_duration),
            ("refresh_interval", self.refresh_interval),
            ("cleanup_interval", self.cleanup_interval),
        ] {
            if value.is_zero() {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }

        if !self.goal_occupancy_radius.is_finite() || self.goal_occupancy_radius < 0.0 {
            anyhow::bail!(
                "goal_occupancy_radius must be a non-negative number, got {}",
                self.goal_occupancy_radius
            );
        }

        if !self.scan.max_radius.is_finite() || self.scan.max_radius < 0.0 {
            anyhow::bail!("scan.max_radius must be a non-negative number, got {}", self.scan.max_radius);
        }

        if self.scan.max_cells == 0 {
            anyhow::bail!("scan.max_cells must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lease_lengths() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.block_claim_duration, Duration::from_millis(30_000));
        assert_eq!(config.area_claim_duration, Duration::from_millis(300_000));
        assert_eq!(config.goal_claim_duration, Duration::from_millis(15_000));
        assert_eq!(config.agent_stale_after, Duration::from_secs(5));
        assert_eq!(config.scan.max_cells, 64);
        assert_eq!(config.scan.max_radius, 16.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
block_claim_duration: 10s
area_claim_duration: 2m
rng_seed: 42
scan:
  max_cells: 128
"#;
        let config = CoordinatorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.block_claim_duration, Duration::from_secs(10));
        assert_eq!(config.area_claim_duration, Duration::from_secs(120));
        assert_eq!(config.goal_claim_duration, Duration::from_millis(15_000));
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.scan.max_cells, 128);
        assert_eq!(config.scan.max_radius, 16.0);
        assert!(config.scan.empty_labels.contains(&"air".to_string()));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = CoordinatorConfig {
            goal_search_radius: 6,
            rng_seed: Some(7),
            ..Default::default()
        };
        let yaml = config.to_yaml_string().unwrap();
        let parsed = CoordinatorConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_zero_lease() {
        let config = CoordinatorConfig {
            goal_claim_duration: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_radius() {
        let mut config = CoordinatorConfig::default();
        config.goal_occupancy_radius = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scan_config_to_options() {
        let options = ScanConfig::default().to_options();
        assert_eq!(options, ScanOptions::default());
    }
}
