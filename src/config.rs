//! Configuration for the extractor.

use crate::writer::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory receiving the batch files
    pub output_dir: PathBuf,

    /// Localization samples accumulated per label window
    pub label_sample_interval: usize,

    /// Frames written per output file
    pub frames_per_file: usize,

    /// Window stride between trajectory label points
    pub trajectory_point_interval: usize,

    /// Samples evicted from the window front per frame close
    pub move_window_step: usize,

    /// True for binary batch files, false for human-readable JSON
    pub binary_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        let output_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drivelog-extractor")
            .join("data");

        Self {
            output_dir,
            label_sample_interval: 100,
            frames_per_file: 100,
            trajectory_point_interval: 10,
            move_window_step: 5,
            binary_output: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drivelog-extractor")
            .join("config.json")
    }

    /// Ensure the output directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Check the sampling parameters against each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label_sample_interval == 0 {
            return Err(ConfigError::Invalid(
                "label_sample_interval must be at least 1".to_string(),
            ));
        }
        if self.trajectory_point_interval == 0 {
            return Err(ConfigError::Invalid(
                "trajectory_point_interval must be at least 1".to_string(),
            ));
        }
        if self.frames_per_file == 0 {
            return Err(ConfigError::Invalid(
                "frames_per_file must be at least 1".to_string(),
            ));
        }
        if self.move_window_step == 0 {
            return Err(ConfigError::Invalid(
                "move_window_step must be at least 1".to_string(),
            ));
        }
        if self.move_window_step > self.label_sample_interval {
            return Err(ConfigError::Invalid(format!(
                "move_window_step ({}) must not exceed label_sample_interval ({})",
                self.move_window_step, self.label_sample_interval
            )));
        }
        Ok(())
    }

    /// Output serialization form.
    pub fn output_format(&self) -> OutputFormat {
        if self.binary_output {
            OutputFormat::Binary
        } else {
            OutputFormat::Text
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.label_sample_interval, 100);
        assert_eq!(config.frames_per_file, 100);
        assert_eq!(config.trajectory_point_interval, 10);
        assert_eq!(config.move_window_step, 5);
        assert!(config.binary_output);
        assert_eq!(config.output_format(), OutputFormat::Binary);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let mut config = Config::default();
        config.trajectory_point_interval = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.label_sample_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_move_step() {
        let mut config = Config::default();
        config.move_window_step = config.label_sample_interval + 1;
        assert!(config.validate().is_err());

        // Equal is allowed: disjoint windows.
        config.move_window_step = config.label_sample_interval;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_text_output_format() {
        let config = Config {
            binary_output: false,
            ..Default::default()
        };
        assert_eq!(config.output_format(), OutputFormat::Text);
    }
}
