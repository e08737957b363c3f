//! Aulos: a lightweight game audio engine with positional 3D sound.
//!
//! Provides sound loading, channel-based playback, named channel groups,
//! and 3D listener/emitter attributes with distance attenuation and
//! Doppler. Uses rodio for cross-platform audio output (behind the
//! `rodio_backend` feature); without it, a bookkeeping stub backend keeps
//! the full API working for tests and headless runs.
//!
//! # Architecture
//!
//! - [`AudioEngine`] - Caller-owned engine: init once, update per frame
//! - [`SoundHandle`] / [`ChannelHandle`] / [`ChannelGroupHandle`] - Opaque
//!   ids for loaded sounds, playback instances, and buses
//! - [`SoundMode`] / [`SoundInfo`] - Playback flags and creation info
//! - [`ListenerAttributes`] - Position, velocity, and orientation for 3D
//! - [`AudioSettings`] / [`EngineConfig`] - Volume settings and engine
//!   parameters, persisted as TOML
//!
//! # Example
//!
//! ```no_run
//! use aulos::{AudioEngine, EngineConfig, SoundInfo, SoundMode, SoundSource};
//!
//! # fn main() -> Result<(), aulos::AudioError> {
//! let mut engine = AudioEngine::init(EngineConfig::default())?;
//! let sound = engine.create_sound(
//!     SoundSource::File("assets/step.ogg".into()),
//!     SoundMode::SPATIAL,
//!     SoundInfo::default(),
//! )?;
//! let channel = engine.play_sound(sound, None, false)?;
//! // Once per frame:
//! engine.update()?;
//! # let _ = channel;
//! # Ok(())
//! # }
//! ```

mod backend;
mod engine;
mod error;
mod handle;
mod listener;
mod settings;
mod sound;
pub mod spatial;

pub use engine::AudioEngine;
pub use error::AudioError;
pub use handle::{ChannelGroupHandle, ChannelHandle, SoundHandle};
pub use listener::{ListenerAttributes, MAX_LISTENERS};
pub use settings::{AudioSettings, EngineConfig};
pub use sound::{SoundInfo, SoundMode, SoundSource};

/// Engine version this crate was built against, as 0x00MMmmpp.
///
/// [`AudioEngine::init`] refuses a backend reporting an older version.
pub const VERSION: u32 = 0x0001_0000;
