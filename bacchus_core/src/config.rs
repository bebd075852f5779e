//! Configuration file support for Bacchus.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bacchus/config.toml`.

use crate::units::BacUnit;
use crate::{BiologicalSex, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub trend: TrendConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Widmark model parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    /// How fast BAC falls once alcohol is absorbed, in percent per hour.
    #[serde(default = "default_elimination_rate")]
    pub elimination_rate_per_hour: f64,

    #[serde(default = "default_male_ratio")]
    pub male_distribution_ratio: f64,

    #[serde(default = "default_female_ratio")]
    pub female_distribution_ratio: f64,

    /// Lower bound (inclusive) of the tipsy tier, in percent BAC.
    #[serde(default = "default_tipsy_threshold")]
    pub tipsy_threshold: f64,

    /// Lower bound (inclusive) of the drunk tier, in percent BAC.
    #[serde(default = "default_drunk_threshold")]
    pub drunk_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            elimination_rate_per_hour: default_elimination_rate(),
            male_distribution_ratio: default_male_ratio(),
            female_distribution_ratio: default_female_ratio(),
            tipsy_threshold: default_tipsy_threshold(),
            drunk_threshold: default_drunk_threshold(),
        }
    }
}

impl ModelConfig {
    /// Widmark distribution ratio for the given sex.
    pub fn distribution_ratio(&self, sex: &BiologicalSex) -> f64 {
        match sex {
            BiologicalSex::Male => self.male_distribution_ratio,
            BiologicalSex::Female => self.female_distribution_ratio,
        }
    }
}

/// Trend sampling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Minutes sampled on each side of the centre instant.
    #[serde(default = "default_half_window_minutes")]
    pub half_window_minutes: i64,

    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            half_window_minutes: default_half_window_minutes(),
            step_minutes: default_step_minutes(),
        }
    }
}

/// Display preferences
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_unit")]
    pub unit: BacUnit,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME")
            .expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("bacchus")
}

fn default_elimination_rate() -> f64 {
    0.015
}

fn default_male_ratio() -> f64 {
    0.68
}

fn default_female_ratio() -> f64 {
    0.55
}

fn default_tipsy_threshold() -> f64 {
    0.05
}

fn default_drunk_threshold() -> f64 {
    0.12
}

fn default_half_window_minutes() -> i64 {
    420
}

fn default_step_minutes() -> i64 {
    10
}

fn default_unit() -> BacUnit {
    BacUnit::Percent
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("bacchus").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Validate model and trend parameters, returning any problems found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let rate = self.model.elimination_rate_per_hour;
        if !rate.is_finite() || rate <= 0.0 {
            errors.push(format!(
                "model.elimination_rate_per_hour must be positive, got {}",
                rate
            ));
        }

        for (name, ratio) in [
            ("male", self.model.male_distribution_ratio),
            ("female", self.model.female_distribution_ratio),
        ] {
            if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
                errors.push(format!(
                    "model.{}_distribution_ratio must be within (0, 1], got {}",
                    name, ratio
                ));
            }
        }

        let tipsy = self.model.tipsy_threshold;
        let drunk = self.model.drunk_threshold;
        if !tipsy.is_finite() || tipsy <= 0.0 {
            errors.push(format!("model.tipsy_threshold must be positive, got {}", tipsy));
        }
        if !drunk.is_finite() || drunk <= tipsy {
            errors.push(format!(
                "model.drunk_threshold must be greater than tipsy_threshold ({}), got {}",
                tipsy, drunk
            ));
        }

        let half = self.trend.half_window_minutes;
        let step = self.trend.step_minutes;
        if half <= 0 {
            errors.push(format!("trend.half_window_minutes must be positive, got {}", half));
        }
        if step <= 0 {
            errors.push(format!("trend.step_minutes must be positive, got {}", step));
        } else if half > 0 && (2 * half) % step != 0 {
            errors.push(format!(
                "trend.step_minutes ({}) must divide the full window ({} minutes)",
                step,
                2 * half
            ));
        }

        errors
    }
}
