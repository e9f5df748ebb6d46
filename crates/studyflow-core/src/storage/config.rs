//! TOML-based application configuration.
//!
//! Stores the planner's tunable constants (per-day capacity, horizon,
//! reschedule hour) and the AI gateway connection settings.
//!
//! Configuration is stored at `~/.config/studyflow/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::gateway::GatewayConfig;
use crate::rebalance::{RebalanceConfig, TieBreak};

/// Planner configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_capacity_per_day")]
    pub capacity_per_day: usize,
    #[serde(default = "default_replan_capacity")]
    pub replan_capacity: usize,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    #[serde(default = "default_reschedule_hour")]
    pub reschedule_hour: u32,
    #[serde(default = "default_light_load_threshold")]
    pub light_load_threshold: usize,
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// AI gateway configuration section. The API key is never stored here;
/// it comes from the STUDYFLOW_API_KEY environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyflow/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub gateway: GatewaySection,
}

fn default_capacity_per_day() -> usize {
    3
}
fn default_replan_capacity() -> usize {
    4
}
fn default_horizon_days() -> i64 {
    14
}
fn default_reschedule_hour() -> u32 {
    10
}
fn default_light_load_threshold() -> usize {
    2
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            capacity_per_day: default_capacity_per_day(),
            replan_capacity: default_replan_capacity(),
            horizon_days: default_horizon_days(),
            reschedule_hour: default_reschedule_hour(),
            light_load_threshold: default_light_load_threshold(),
            tie_break: TieBreak::default(),
        }
    }
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration, or fall back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load configuration from disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Planner section as a rebalancer config.
    pub fn rebalance_config(&self) -> RebalanceConfig {
        RebalanceConfig {
            capacity_per_day: self.planner.capacity_per_day,
            replan_capacity: self.planner.replan_capacity,
            horizon_days: self.planner.horizon_days,
            reschedule_hour: self.planner.reschedule_hour,
            light_load_threshold: self.planner.light_load_threshold,
            tie_break: self.planner.tie_break,
        }
    }

    /// Gateway section as a client config (key resolved from the
    /// environment at request time).
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.gateway.base_url.clone(),
            model: self.gateway.model.clone(),
            api_key: None,
        }
    }

    /// Update one setting by its dotted key, parsing the string value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        match key {
            "planner.capacity_per_day" => {
                self.planner.capacity_per_day =
                    value.parse().map_err(|_| invalid("expected an integer".to_string()))?;
            }
            "planner.replan_capacity" => {
                self.planner.replan_capacity =
                    value.parse().map_err(|_| invalid("expected an integer".to_string()))?;
            }
            "planner.horizon_days" => {
                self.planner.horizon_days =
                    value.parse().map_err(|_| invalid("expected an integer".to_string()))?;
            }
            "planner.reschedule_hour" => {
                self.planner.reschedule_hour =
                    value.parse().map_err(|_| invalid("expected an hour 0-23".to_string()))?;
            }
            "planner.light_load_threshold" => {
                self.planner.light_load_threshold =
                    value.parse().map_err(|_| invalid("expected an integer".to_string()))?;
            }
            "planner.tie_break" => {
                self.planner.tie_break = match value {
                    "keep_first" => TieBreak::KeepFirst,
                    "keep_highest_priority" => TieBreak::KeepHighestPriority,
                    _ => {
                        return Err(invalid(
                            "expected keep_first or keep_highest_priority".to_string(),
                        ))
                    }
                };
            }
            "gateway.enabled" => {
                self.gateway.enabled =
                    value.parse().map_err(|_| invalid("expected true or false".to_string()))?;
            }
            "gateway.base_url" => self.gateway.base_url = value.to_string(),
            "gateway.model" => self.gateway.model = value.to_string(),
            _ => return Err(invalid("unknown configuration key".to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_planner_constants() {
        let config = Config::default();
        assert_eq!(config.planner.capacity_per_day, 3);
        assert_eq!(config.planner.replan_capacity, 4);
        assert_eq!(config.planner.horizon_days, 14);
        assert_eq!(config.planner.reschedule_hour, 10);
        assert!(!config.gateway.enabled);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[planner]\ncapacity_per_day = 5\n").unwrap();
        assert_eq!(config.planner.capacity_per_day, 5);
        assert_eq!(config.planner.horizon_days, 14);
        assert_eq!(config.gateway.model, "gpt-4o-mini");
    }

    #[test]
    fn set_parses_and_rejects() {
        let mut config = Config::default();
        config.set("planner.horizon_days", "7").unwrap();
        assert_eq!(config.planner.horizon_days, 7);

        config.set("planner.tie_break", "keep_highest_priority").unwrap();
        assert_eq!(config.planner.tie_break, TieBreak::KeepHighestPriority);

        assert!(config.set("planner.horizon_days", "soon").is_err());
        assert!(config.set("nope", "1").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.gateway.enabled = true;
        let text = toml::to_string_pretty(&config).unwrap();
        let decoded: Config = toml::from_str(&text).unwrap();
        assert!(decoded.gateway.enabled);
        assert_eq!(decoded.planner.capacity_per_day, 3);
    }
}
