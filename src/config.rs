//! Persisted dashboard preferences (`profile-oxide.json`)

use crate::constants::{profile::DEFAULT_SEPARATOR, state::DEFAULT_BUCKET_SIZE, widgets::BUCKET_SIZES};
use crate::error::{DashboardError, Result};
use crate::state::{DashboardKind, Interpolation, StateMutation};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV field separator of the profiler export
    pub separator: char,
    pub bucket_size: f64,
    pub interpolation: Interpolation,
    pub dashboard: DashboardKind,
    pub dark_mode: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            bucket_size: DEFAULT_BUCKET_SIZE,
            interpolation: Interpolation::default(),
            dashboard: DashboardKind::Overview,
            dark_mode: true,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists; a broken file falls back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring configuration {}: {}", path.display(), e.user_message());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.separator.is_ascii() || self.separator.is_ascii_alphanumeric() {
            return Err(DashboardError::Config(format!(
                "separator must be an ASCII punctuation or whitespace character, got {:?}",
                self.separator
            )));
        }
        if !BUCKET_SIZES.contains(&self.bucket_size) {
            return Err(DashboardError::Config(format!(
                "bucket size {} is not one of {:?}",
                self.bucket_size, BUCKET_SIZES
            )));
        }
        Ok(())
    }

    /// Separator as the byte the CSV reader expects
    pub fn separator_byte(&self) -> u8 {
        u8::try_from(self.separator).unwrap_or(DEFAULT_SEPARATOR as u8)
    }

    /// Selection-context defaults to apply on startup and after a reset
    pub fn initial_mutations(&self) -> Vec<StateMutation> {
        vec![
            StateMutation::SetCurrentBucketSize(self.bucket_size),
            StateMutation::SetCurrentInterpolation(self.interpolation),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile-oxide.json");

        let config = DashboardConfig {
            separator: ',',
            bucket_size: 0.5,
            interpolation: Interpolation::Step,
            dashboard: DashboardKind::Uir,
            dark_mode: false,
        };
        config.save(&path).unwrap();

        assert_eq!(DashboardConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile-oxide.json");
        std::fs::write(&path, r#"{"bucket_size": 2.5}"#).unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.bucket_size, 2.5);
        assert_eq!(config.separator, ';');
        assert_eq!(config.separator_byte(), b';');
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = DashboardConfig {
            bucket_size: 0.3,
            ..DashboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));

        let config = DashboardConfig {
            separator: 'x',
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile-oxide.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
        assert_eq!(
            DashboardConfig::load_or_default(&dir.path().join("absent.json")),
            DashboardConfig::default()
        );
    }

    #[test]
    fn test_initial_mutations_carry_preferences() {
        let config = DashboardConfig {
            bucket_size: 5.0,
            ..DashboardConfig::default()
        };
        let mutations = config.initial_mutations();
        assert_eq!(mutations[0], StateMutation::SetCurrentBucketSize(5.0));
    }
}
