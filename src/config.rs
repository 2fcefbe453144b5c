use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HrEffError;

/// Resting heart rate used as the normalization floor
pub const DEFAULT_RESTING_HR: f64 = 60.0;

/// Run speeds above this (m/s) are treated as GPS or unit glitches
pub const DEFAULT_RUN_MAX_SPEED: f64 = 5.0;

/// Run heart rates below this are treated as sensor dropouts
pub const DEFAULT_RUN_MIN_HR: f64 = 100.0;

/// Activities with a known-bad heart rate strap reading
pub const DEFAULT_BAD_HR_ACTIVITY_IDS: &[i64] = &[3577181319];

/// Main analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input file location
    pub input: InputSettings,

    /// Heart-rate normalization parameters
    pub normalization: NormalizationSettings,

    /// Data-quality overrides
    pub scrub: ScrubSettings,
}

/// Input file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Path to the header-less activity export
    pub path: PathBuf,
}

/// Heart-rate normalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationSettings {
    /// Resting heart rate in bpm
    pub resting_hr: f64,
}

/// Scrub thresholds for implausible readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubSettings {
    /// Maximum plausible run speed (m/s)
    pub run_max_speed: f64,

    /// Minimum plausible run heart rate (bpm)
    pub run_min_hr: f64,

    /// Activity ids whose heart rate is always discarded
    pub bad_hr_activity_ids: Vec<i64>,
}

impl Default for InputSettings {
    fn default() -> Self {
        InputSettings {
            path: PathBuf::from("../export.csv"),
        }
    }
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        NormalizationSettings {
            resting_hr: DEFAULT_RESTING_HR,
        }
    }
}

impl Default for ScrubSettings {
    fn default() -> Self {
        ScrubSettings {
            run_max_speed: DEFAULT_RUN_MAX_SPEED,
            run_min_hr: DEFAULT_RUN_MIN_HR,
            bad_hr_activity_ids: DEFAULT_BAD_HR_ACTIVITY_IDS.to_vec(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AnalysisConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hreff")
            .join("config.toml")
    }

    /// Load configuration from the default path with fallback to defaults
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(Self::default_config_path())
    }

    /// Load `path` if it exists; an absent file is the normal case and is not reported
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let config_path = path.as_ref();

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Reject thresholds that would make every comparison meaningless
    pub fn validate(&self) -> std::result::Result<(), HrEffError> {
        let checks = [
            ("normalization.resting_hr", self.normalization.resting_hr),
            ("scrub.run_max_speed", self.scrub.run_max_speed),
            ("scrub.run_min_hr", self.scrub.run_min_hr),
        ];

        for (name, value) in checks {
            if !value.is_finite() {
                return Err(HrEffError::Configuration(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        if self.normalization.resting_hr < 0.0 {
            return Err(HrEffError::Configuration(
                "normalization.resting_hr must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.normalization.resting_hr, 60.0);
        assert_eq!(config.scrub.run_max_speed, 5.0);
        assert_eq!(config.scrub.run_min_hr, 100.0);
        assert_eq!(config.scrub.bad_hr_activity_ids, vec![3577181319]);
        assert_eq!(config.input.path, PathBuf::from("../export.csv"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            [normalization]
            resting_hr = 52.0
            "#,
        )
        .unwrap();

        assert_eq!(config.normalization.resting_hr, 52.0);
        assert_eq!(config.scrub, ScrubSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = AnalysisConfig::default();
        config.scrub.bad_hr_activity_ids.push(42);
        config.save_to_file(&path).unwrap();

        let loaded = AnalysisConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_from() {
        let temp_dir = TempDir::new().unwrap();

        let absent = temp_dir.path().join("config.toml");
        assert_eq!(
            AnalysisConfig::load_or_default_from(&absent),
            AnalysisConfig::default()
        );

        let custom = temp_dir.path().join("custom.toml");
        fs::write(&custom, "[scrub]\nrun_min_hr = 90.0\n").unwrap();
        assert_eq!(
            AnalysisConfig::load_or_default_from(&custom).scrub.run_min_hr,
            90.0
        );

        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "[scrub\nrun_min_hr = ").unwrap();
        assert_eq!(
            AnalysisConfig::load_or_default_from(&broken),
            AnalysisConfig::default()
        );
    }

    #[test]
    fn test_validate_rejects_negative_resting_hr() {
        let mut config = AnalysisConfig::default();
        config.normalization.resting_hr = -1.0;
        assert!(matches!(
            config.validate(),
            Err(HrEffError::Configuration(_))
        ));
    }
}
