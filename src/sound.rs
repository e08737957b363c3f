//! Sound sources, creation modes, and extended creation info.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a sound's audio data comes from.
#[derive(Debug, Clone)]
pub enum SoundSource {
    /// Load (or stream) encoded audio from a file on disk.
    File(PathBuf),
    /// Use encoded audio bytes already in memory.
    Memory(Vec<u8>),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Playback mode flags supplied at sound creation.
    ///
    /// The empty set means: play once, non-positional, preloaded into memory.
    pub struct SoundMode: u32 {
        /// Restart from the beginning whenever the end is reached.
        const LOOP = 0b0000_0001;
        /// Position the sound in 3D space relative to the listener.
        ///
        /// Channels of spatial sounds accept
        /// [`set_channel_3d_attributes`](crate::AudioEngine::set_channel_3d_attributes)
        /// and are attenuated by distance each
        /// [`update`](crate::AudioEngine::update).
        const SPATIAL = 0b0000_0010;
        /// Decode from the file at play time instead of preloading bytes.
        ///
        /// Memory sources are already resident, so for them this flag
        /// degrades to the preloaded path.
        const STREAM = 0b0000_0100;
    }
}

impl Default for SoundMode {
    fn default() -> Self {
        SoundMode::empty()
    }
}

/// Extended creation info for a sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundInfo {
    /// Volume a new channel of this sound starts at (0.0 to 1.0).
    pub default_volume: f32,
    /// Distance inside which a spatial sound plays at full volume.
    pub min_distance: f32,
    /// Distance at which a spatial sound becomes inaudible.
    pub max_distance: f32,
}

impl Default for SoundInfo {
    fn default() -> Self {
        Self {
            default_volume: 1.0,
            min_distance: 1.0,
            max_distance: 16.0,
        }
    }
}

impl SoundInfo {
    /// Creation info with the given distance range and default volume.
    pub fn new(default_volume: f32, min_distance: f32, max_distance: f32) -> Self {
        Self {
            default_volume,
            min_distance,
            max_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_empty() {
        let mode = SoundMode::default();
        assert!(!mode.contains(SoundMode::LOOP));
        assert!(!mode.contains(SoundMode::SPATIAL));
        assert!(!mode.contains(SoundMode::STREAM));
    }

    #[test]
    fn modes_combine() {
        let mode = SoundMode::LOOP | SoundMode::SPATIAL;
        assert!(mode.contains(SoundMode::LOOP));
        assert!(mode.contains(SoundMode::SPATIAL));
        assert!(!mode.contains(SoundMode::STREAM));
    }

    #[test]
    fn default_info_has_audible_range() {
        let info = SoundInfo::default();
        assert_eq!(info.default_volume, 1.0);
        assert!(info.max_distance > info.min_distance);
    }
}
