//! Engine configuration and volume settings.

use crate::error::AudioError;
use crate::listener::MAX_LISTENERS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Volume settings for the master output bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 to 1.0).
    pub master: f32,
    /// Whether all output is muted.
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Create new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the effective master volume (0.0 when muted).
    pub fn effective_master(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master
        }
    }

    /// Set master volume (clamped to 0.0-1.0).
    pub fn set_master(&mut self, volume: f32) {
        self.master = volume.clamp(0.0, 1.0);
    }

    /// Toggle mute state.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Load settings from a TOML file, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AudioSettings>(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AudioSettings::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                AudioSettings::default()
            }
        }
    }

    /// Save settings as TOML to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<(), AudioError> {
        let toml = toml::to_string_pretty(self).map_err(|err| AudioError::Persist {
            detail: err.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

/// Fixed engine parameters supplied to [`init`](crate::AudioEngine::init).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Most channels that can be live at once.
    ///
    /// Playing past the cap steals the oldest live channel.
    pub max_channels: usize,
    /// Number of 3D listeners (1 to [`MAX_LISTENERS`]).
    pub listeners: usize,
    /// Initial volume settings.
    pub settings: AudioSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_channels: 32,
            listeners: 1,
            settings: AudioSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Check configuration ranges.
    pub(crate) fn validate(&self) -> Result<(), AudioError> {
        if self.max_channels == 0 {
            return Err(AudioError::InvalidParameter {
                what: "max_channels must be at least 1",
            });
        }
        if self.listeners == 0 || self.listeners > MAX_LISTENERS {
            return Err(AudioError::InvalidParameter {
                what: "listeners must be between 1 and MAX_LISTENERS",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AudioSettings::default();
        assert_eq!(settings.master, 1.0);
        assert!(!settings.muted);
    }

    #[test]
    fn test_effective_master() {
        let mut settings = AudioSettings::default();
        settings.set_master(0.4);
        assert!((settings.effective_master() - 0.4).abs() < 1e-6);

        settings.toggle_mute();
        assert_eq!(settings.effective_master(), 0.0);

        settings.toggle_mute();
        assert!(settings.effective_master() > 0.0);
    }

    #[test]
    fn test_volume_clamping() {
        let mut settings = AudioSettings::default();
        settings.set_master(1.5);
        assert_eq!(settings.master, 1.0);

        settings.set_master(-0.5);
        assert_eq!(settings.master, 0.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("aulos-settings-that-do-not-exist.toml");
        let settings = AudioSettings::load_from_path(&path);
        assert_eq!(settings.master, 1.0);
        assert!(!settings.muted);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join("aulos-settings-roundtrip.toml");
        let mut settings = AudioSettings::default();
        settings.set_master(0.25);
        settings.muted = true;
        settings.save_to_path(&path).expect("can write settings");

        let loaded = AudioSettings::load_from_path(&path);
        assert!((loaded.master - 0.25).abs() < 1e-6);
        assert!(loaded.muted);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_channels, 32);
        assert_eq!(config.listeners, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig {
            max_channels: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_channels = 8;
        config.listeners = 0;
        assert!(config.validate().is_err());

        config.listeners = MAX_LISTENERS + 1;
        assert!(config.validate().is_err());

        config.listeners = MAX_LISTENERS;
        assert!(config.validate().is_ok());
    }
}
