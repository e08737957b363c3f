//! The audio engine facade.

use crate::backend::{Backend, SoundData, VoiceParams};
use crate::error::AudioError;
use crate::handle::{ChannelGroupHandle, ChannelHandle, SoundHandle};
use crate::listener::ListenerAttributes;
use crate::settings::{AudioSettings, EngineConfig};
use crate::sound::{SoundInfo, SoundMode, SoundSource};
use crate::spatial;
use glam::Vec3;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A loaded audio asset.
struct LoadedSound {
    data: SoundData,
    mode: SoundMode,
    info: SoundInfo,
}

/// One active playback instance of a sound.
struct Channel {
    sound: SoundHandle,
    group: Option<ChannelGroupHandle>,
    /// The channel's own pause flag; a paused group also silences members.
    paused: bool,
    volume: f32,
    position: Vec3,
    velocity: Vec3,
    /// Effective gain as of the last update or play.
    last_gain: f32,
}

/// A named bus for collective channel control.
struct ChannelGroup {
    name: String,
    volume: f32,
    paused: bool,
}

/// The audio engine.
///
/// Owns the output backend and every sound, channel, and channel group.
/// Callers construct one with [`init`](AudioEngine::init), keep it for the
/// life of the process, and drive [`update`](AudioEngine::update) once per
/// frame; all other operations happen on demand between updates.
pub struct AudioEngine {
    /// Backend, or `None` for a headless engine.
    backend: Option<Backend>,
    max_channels: usize,
    settings: AudioSettings,
    listeners: Vec<ListenerAttributes>,
    sounds: HashMap<u32, LoadedSound>,
    channels: HashMap<u32, Channel>,
    groups: HashMap<u32, ChannelGroup>,
    next_sound: u32,
    next_channel: u32,
    next_group: u32,
}

impl AudioEngine {
    /// Initialize the engine.
    ///
    /// Checks the backend version against the version this crate was built
    /// with before anything else; an older backend is refused with
    /// [`AudioError::VersionMismatch`] and no output is opened. On success
    /// the output device is opened with the configured channel cap.
    pub fn init(config: EngineConfig) -> Result<Self, AudioError> {
        Self::init_with_backend_version(config, Backend::version())
    }

    fn init_with_backend_version(
        config: EngineConfig,
        backend_version: u32,
    ) -> Result<Self, AudioError> {
        info!(
            "audio backend version {:#010x}, engine built against {:#010x}",
            backend_version,
            crate::VERSION
        );
        if backend_version < crate::VERSION {
            let err = AudioError::VersionMismatch {
                found: backend_version,
                required: crate::VERSION,
            };
            error!("audio init refused: code {} ({err})", err.code());
            return Err(err);
        }
        if let Err(err) = config.validate() {
            error!("audio init refused: code {} ({err})", err.code());
            return Err(err);
        }
        let backend = match Backend::new() {
            Ok(backend) => backend,
            Err(err) => {
                error!("audio output init failed: code {} ({err})", err.code());
                return Err(err);
            }
        };
        info!(
            "audio engine initialized: {} channels, {} listener(s)",
            config.max_channels, config.listeners
        );
        Ok(Self::with_backend(Some(backend), config))
    }

    /// Create an engine without any output backend.
    ///
    /// All bookkeeping works as usual but nothing reaches a device. Useful
    /// for tests and headless operation; the configuration is used as given.
    pub fn headless(config: EngineConfig) -> Self {
        debug!("audio engine headless: no output backend");
        Self::with_backend(None, config)
    }

    fn with_backend(backend: Option<Backend>, config: EngineConfig) -> Self {
        Self {
            backend,
            max_channels: config.max_channels,
            settings: config.settings,
            listeners: vec![ListenerAttributes::default(); config.listeners],
            sounds: HashMap::new(),
            channels: HashMap::new(),
            groups: HashMap::new(),
            next_sound: 1,
            next_channel: 1,
            next_group: 1,
        }
    }

    /// Check whether playback reaches a real output device.
    pub fn is_available(&self) -> bool {
        self.backend
            .as_ref()
            .map(|backend| backend.is_available())
            .unwrap_or(false)
    }

    /// Advance the engine by one frame.
    ///
    /// Reaps channels whose voice finished, then pushes every live
    /// channel's effective gain, Doppler speed, and pause state to the
    /// backend. Listener and emitter attribute changes take effect here,
    /// not at their setters.
    pub fn update(&mut self) -> Result<(), AudioError> {
        self.reap_finished();
        for (id, channel) in self.channels.iter_mut() {
            let Some(sound) = self.sounds.get(&channel.sound.0) else {
                continue;
            };
            let group = channel.group.and_then(|g| self.groups.get(&g.0));
            let gain = effective_gain(channel, sound, group, &self.settings, &self.listeners);
            let speed = effective_speed(channel, sound, &self.listeners);
            let paused = channel.paused || group.map(|g| g.paused).unwrap_or(false);
            channel.last_gain = gain;
            if let Some(backend) = self.backend.as_mut() {
                backend.set_gain(*id, gain);
                backend.set_speed(*id, speed);
                backend.set_paused(*id, paused);
            }
        }
        Ok(())
    }

    /// Load a sound from a file or from raw bytes.
    ///
    /// File sources are read into memory unless `mode` contains
    /// [`SoundMode::STREAM`], in which case decoding is deferred to each
    /// play. The file must exist either way.
    pub fn create_sound(
        &mut self,
        source: SoundSource,
        mode: SoundMode,
        info: SoundInfo,
    ) -> Result<SoundHandle, AudioError> {
        if !(info.min_distance >= 0.0) || !(info.max_distance > info.min_distance) {
            return Err(log_code(
                "create_sound",
                AudioError::InvalidParameter {
                    what: "max_distance must exceed min_distance, both non-negative",
                },
            ));
        }
        let data = match source {
            SoundSource::Memory(bytes) => SoundData::Preloaded(Arc::new(bytes)),
            SoundSource::File(path) => {
                if mode.contains(SoundMode::STREAM) {
                    if let Err(err) = fs::metadata(&path) {
                        return Err(log_code("create_sound", AudioError::from(err)));
                    }
                    SoundData::Streamed(path)
                } else {
                    match fs::read(&path) {
                        Ok(bytes) => SoundData::Preloaded(Arc::new(bytes)),
                        Err(err) => return Err(log_code("create_sound", AudioError::from(err))),
                    }
                }
            }
        };
        let id = self.next_sound;
        self.next_sound += 1;
        self.sounds.insert(id, LoadedSound { data, mode, info });
        let handle = SoundHandle(id);
        debug!("loaded sound {:?} (mode {:?})", handle, mode);
        Ok(handle)
    }

    /// Release a sound, stopping any channels still playing it.
    pub fn release_sound(&mut self, sound: SoundHandle) -> Result<(), AudioError> {
        if !self.sounds.contains_key(&sound.0) {
            return Err(log_code("release_sound", AudioError::InvalidHandle));
        }
        let dependents: Vec<u32> = self
            .channels
            .iter()
            .filter(|(_, channel)| channel.sound == sound)
            .map(|(id, _)| *id)
            .collect();
        for id in dependents {
            self.stop_channel_id(id);
        }
        self.sounds.remove(&sound.0);
        debug!("released sound {:?}", sound);
        Ok(())
    }

    /// Start playing a sound, producing a channel.
    ///
    /// The channel starts at the sound's default volume, optionally routed
    /// into `group` and optionally paused. At the channel cap the oldest
    /// live channel is stolen to make room; the stolen handle becomes
    /// invalid.
    pub fn play_sound(
        &mut self,
        sound: SoundHandle,
        group: Option<ChannelGroupHandle>,
        paused: bool,
    ) -> Result<ChannelHandle, AudioError> {
        if !self.sounds.contains_key(&sound.0) {
            return Err(log_code("play_sound", AudioError::InvalidHandle));
        }
        if let Some(g) = group {
            if !self.groups.contains_key(&g.0) {
                return Err(log_code("play_sound", AudioError::InvalidHandle));
            }
        }

        self.reap_finished();
        if self.channels.len() >= self.max_channels {
            if let Some(oldest) = self.channels.keys().copied().min() {
                debug!(
                    "channel cap {} reached, stealing channel {oldest}",
                    self.max_channels
                );
                self.stop_channel_id(oldest);
            }
        }

        let id = self.next_channel;
        self.next_channel += 1;

        let Some(snd) = self.sounds.get(&sound.0) else {
            return Err(AudioError::InvalidHandle);
        };
        let group_state = group.and_then(|g| self.groups.get(&g.0));

        let mut channel = Channel {
            sound,
            group,
            paused,
            volume: snd.info.default_volume.clamp(0.0, 1.0),
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            last_gain: 0.0,
        };
        let gain = effective_gain(&channel, snd, group_state, &self.settings, &self.listeners);
        let speed = effective_speed(&channel, snd, &self.listeners);
        let params = VoiceParams {
            gain,
            speed,
            paused: paused || group_state.map(|g| g.paused).unwrap_or(false),
            looping: snd.mode.contains(SoundMode::LOOP),
        };
        if let Some(backend) = self.backend.as_mut() {
            backend
                .start_voice(id, &snd.data, &params)
                .map_err(|err| log_code("play_sound", err))?;
        }
        channel.last_gain = gain;
        self.channels.insert(id, channel);
        let handle = ChannelHandle(id);
        debug!("playing sound {:?} on channel {:?}", sound, handle);
        Ok(handle)
    }

    /// Create a named channel group.
    pub fn create_channel_group(&mut self, name: &str) -> Result<ChannelGroupHandle, AudioError> {
        if name.is_empty() {
            return Err(log_code(
                "create_channel_group",
                AudioError::InvalidParameter {
                    what: "channel group name must not be empty",
                },
            ));
        }
        let id = self.next_group;
        self.next_group += 1;
        self.groups.insert(
            id,
            ChannelGroup {
                name: name.to_string(),
                volume: 1.0,
                paused: false,
            },
        );
        let handle = ChannelGroupHandle(id);
        debug!("created channel group {:?} ({name})", handle);
        Ok(handle)
    }

    /// Get the name a channel group was created with.
    pub fn group_name(&self, group: ChannelGroupHandle) -> Result<&str, AudioError> {
        self.groups
            .get(&group.0)
            .map(|state| state.name.as_str())
            .ok_or(AudioError::InvalidHandle)
    }

    /// Set a group's volume (clamped to 0.0-1.0).
    ///
    /// Applied to member channels at the next [`update`](AudioEngine::update).
    pub fn set_group_volume(
        &mut self,
        group: ChannelGroupHandle,
        volume: f32,
    ) -> Result<(), AudioError> {
        let Some(state) = self.groups.get_mut(&group.0) else {
            return Err(log_code("set_group_volume", AudioError::InvalidHandle));
        };
        state.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    /// Pause or resume every channel routed into a group.
    ///
    /// Applied to member channels at the next [`update`](AudioEngine::update);
    /// each channel keeps its own pause flag.
    pub fn set_group_paused(
        &mut self,
        group: ChannelGroupHandle,
        paused: bool,
    ) -> Result<(), AudioError> {
        let Some(state) = self.groups.get_mut(&group.0) else {
            return Err(log_code("set_group_paused", AudioError::InvalidHandle));
        };
        state.paused = paused;
        Ok(())
    }

    /// Stop a channel and invalidate its handle.
    pub fn stop_channel(&mut self, channel: ChannelHandle) -> Result<(), AudioError> {
        if !self.channels.contains_key(&channel.0) {
            return Err(log_code("stop_channel", AudioError::InvalidHandle));
        }
        self.stop_channel_id(channel.0);
        debug!("stopped channel {:?}", channel);
        Ok(())
    }

    /// Pause or resume a channel.
    ///
    /// Applied to the output at the next [`update`](AudioEngine::update).
    pub fn set_channel_paused(
        &mut self,
        channel: ChannelHandle,
        paused: bool,
    ) -> Result<(), AudioError> {
        let Some(state) = self.channels.get_mut(&channel.0) else {
            return Err(log_code("set_channel_paused", AudioError::InvalidHandle));
        };
        state.paused = paused;
        Ok(())
    }

    /// Set a channel's volume (clamped to 0.0-1.0).
    ///
    /// Applied to the output at the next [`update`](AudioEngine::update).
    pub fn set_channel_volume(
        &mut self,
        channel: ChannelHandle,
        volume: f32,
    ) -> Result<(), AudioError> {
        let Some(state) = self.channels.get_mut(&channel.0) else {
            return Err(log_code("set_channel_volume", AudioError::InvalidHandle));
        };
        state.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    /// Set a channel's emitter position and velocity.
    ///
    /// Only valid for channels of sounds created with
    /// [`SoundMode::SPATIAL`]. Applied at the next
    /// [`update`](AudioEngine::update).
    pub fn set_channel_3d_attributes(
        &mut self,
        channel: ChannelHandle,
        position: Vec3,
        velocity: Vec3,
    ) -> Result<(), AudioError> {
        let Some(state) = self.channels.get_mut(&channel.0) else {
            return Err(log_code("set_channel_3d_attributes", AudioError::InvalidHandle));
        };
        let Some(sound) = self.sounds.get(&state.sound.0) else {
            return Err(AudioError::InvalidHandle);
        };
        if !sound.mode.contains(SoundMode::SPATIAL) {
            return Err(log_code("set_channel_3d_attributes", AudioError::NotSpatial));
        }
        if !position.is_finite() || !velocity.is_finite() {
            return Err(log_code(
                "set_channel_3d_attributes",
                AudioError::InvalidParameter {
                    what: "position and velocity must be finite",
                },
            ));
        }
        state.position = position;
        state.velocity = velocity;
        Ok(())
    }

    /// Check whether a channel is still live.
    ///
    /// Paused channels count as playing. Once the channel stops or its
    /// voice finishes and is reaped, the handle yields
    /// [`AudioError::InvalidHandle`].
    pub fn channel_is_playing(&self, channel: ChannelHandle) -> Result<bool, AudioError> {
        if !self.channels.contains_key(&channel.0) {
            return Err(AudioError::InvalidHandle);
        }
        Ok(match self.backend.as_ref() {
            Some(backend) => !backend.voice_finished(channel.0),
            None => true,
        })
    }

    /// Get the effective gain last pushed for a channel.
    ///
    /// Composed of channel volume, group volume, master volume, and
    /// spatial attenuation, as of the last play or
    /// [`update`](AudioEngine::update).
    pub fn channel_audibility(&self, channel: ChannelHandle) -> Result<f32, AudioError> {
        self.channels
            .get(&channel.0)
            .map(|state| state.last_gain)
            .ok_or(AudioError::InvalidHandle)
    }

    /// Set position, velocity, and orientation for a 3D listener.
    ///
    /// `listener` indexes the listeners configured at init. Orientation
    /// vectors must be unit length and orthogonal. Takes effect at the
    /// next [`update`](AudioEngine::update).
    pub fn set_3d_listener_attributes(
        &mut self,
        listener: usize,
        attrs: &ListenerAttributes,
    ) -> Result<(), AudioError> {
        if listener >= self.listeners.len() {
            return Err(log_code(
                "set_3d_listener_attributes",
                AudioError::InvalidParameter {
                    what: "listener index out of range",
                },
            ));
        }
        if !attrs.position.is_finite() || !attrs.velocity.is_finite() {
            return Err(log_code(
                "set_3d_listener_attributes",
                AudioError::InvalidParameter {
                    what: "position and velocity must be finite",
                },
            ));
        }
        if !attrs.orientation_valid() {
            return Err(log_code(
                "set_3d_listener_attributes",
                AudioError::InvalidVector,
            ));
        }
        self.listeners[listener] = *attrs;
        Ok(())
    }

    /// Get a listener's current attributes.
    pub fn listener_attributes(&self, listener: usize) -> Result<ListenerAttributes, AudioError> {
        self.listeners
            .get(listener)
            .copied()
            .ok_or(AudioError::InvalidParameter {
                what: "listener index out of range",
            })
    }

    /// Get the current volume settings.
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Replace the volume settings wholesale.
    pub fn update_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
        self.settings.master = self.settings.master.clamp(0.0, 1.0);
    }

    /// Set the master volume (clamped to 0.0-1.0).
    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.set_master(volume);
    }

    /// Mute or unmute all output.
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
    }

    /// Get the number of live channels.
    pub fn active_channels(&self) -> usize {
        self.channels.len()
    }

    /// Stop every live channel.
    pub fn stop_all_channels(&mut self) {
        let ids: Vec<u32> = self.channels.keys().copied().collect();
        for id in ids {
            self.stop_channel_id(id);
        }
        debug!("stopped all channels");
    }

    fn stop_channel_id(&mut self, id: u32) {
        if let Some(backend) = self.backend.as_mut() {
            backend.stop_voice(id);
        }
        self.channels.remove(&id);
    }

    fn reap_finished(&mut self) {
        let finished: Vec<u32> = match self.backend.as_ref() {
            Some(backend) => self
                .channels
                .keys()
                .copied()
                .filter(|id| backend.voice_finished(*id))
                .collect(),
            None => Vec::new(),
        };
        for id in finished {
            if let Some(backend) = self.backend.as_mut() {
                backend.stop_voice(id);
            }
            self.channels.remove(&id);
            debug!("channel {id} finished");
        }
    }
}

/// Log an operation failure with its result code, passing the error through.
fn log_code(op: &str, err: AudioError) -> AudioError {
    warn!("{op} failed: code {} ({err})", err.code());
    err
}

fn effective_gain(
    channel: &Channel,
    sound: &LoadedSound,
    group: Option<&ChannelGroup>,
    settings: &AudioSettings,
    listeners: &[ListenerAttributes],
) -> f32 {
    let mut gain = channel.volume * settings.effective_master();
    if let Some(group) = group {
        gain *= group.volume;
    }
    if sound.mode.contains(SoundMode::SPATIAL) {
        gain *= spatial::emitter_gain(
            channel.position,
            listeners,
            sound.info.min_distance,
            sound.info.max_distance,
        );
    }
    gain
}

fn effective_speed(channel: &Channel, sound: &LoadedSound, listeners: &[ListenerAttributes]) -> f32 {
    if sound.mode.contains(SoundMode::SPATIAL) {
        spatial::doppler_for(listeners, channel.position, channel.velocity)
    } else {
        1.0
    }
}
