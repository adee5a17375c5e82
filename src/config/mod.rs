//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Metric, ThresholdLadder};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Badge thresholds per metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementConfig {
    #[serde(default = "default_games_played")]
    pub games_played: ThresholdLadder,

    #[serde(default = "default_games_won")]
    pub games_won: ThresholdLadder,

    #[serde(default = "default_partners")]
    pub partners: ThresholdLadder,

    #[serde(default = "default_efficiency")]
    pub efficiency: ThresholdLadder,

    #[serde(default = "default_longest_streak")]
    pub longest_streak: ThresholdLadder,

    /// Games needed before an efficiency badge can be awarded
    #[serde(default = "default_min_games_for_efficiency")]
    pub min_games_for_efficiency: u32,
}

fn default_games_played() -> ThresholdLadder {
    ThresholdLadder::new(10.0, 25.0, 50.0)
}

fn default_games_won() -> ThresholdLadder {
    ThresholdLadder::new(5.0, 15.0, 30.0)
}

fn default_partners() -> ThresholdLadder {
    ThresholdLadder::new(3.0, 5.0, 8.0)
}

fn default_efficiency() -> ThresholdLadder {
    ThresholdLadder::new(50.0, 65.0, 80.0)
}

fn default_longest_streak() -> ThresholdLadder {
    ThresholdLadder::new(3.0, 5.0, 8.0)
}

fn default_min_games_for_efficiency() -> u32 {
    5
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            games_played: default_games_played(),
            games_won: default_games_won(),
            partners: default_partners(),
            efficiency: default_efficiency(),
            longest_streak: default_longest_streak(),
            min_games_for_efficiency: default_min_games_for_efficiency(),
        }
    }
}

impl AchievementConfig {
    pub fn ladder(&self, metric: Metric) -> &ThresholdLadder {
        match metric {
            Metric::GamesPlayed => &self.games_played,
            Metric::GamesWon => &self.games_won,
            Metric::Partners => &self.partners,
            Metric::Efficiency => &self.efficiency,
            Metric::LongestStreak => &self.longest_streak,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tracked players. Empty means every player found in the records.
    #[serde(default)]
    pub roster: Vec<String>,

    #[serde(default)]
    pub achievements: AchievementConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            roster: Vec::new(),
            achievements: AchievementConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for metric in Metric::ALL {
            if !self.achievements.ladder(metric).is_ascending() {
                return Err(ConfigError::ValidationError(format!(
                    "Thresholds for {} must be ascending",
                    metric
                )));
            }
        }

        if self.achievements.min_games_for_efficiency == 0 {
            return Err(ConfigError::ValidationError(
                "min_games_for_efficiency must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.roster {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Roster names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate roster name: {}",
                    name
                )));
            }
        }

        Ok(())
    }
}
