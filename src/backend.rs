//! Output backends.
//!
//! The engine talks to exactly one backend, selected at compile time: a
//! rodio-based output when the `rodio_backend` feature is enabled, and a
//! bookkeeping stub otherwise. Both expose the same surface, so the facade
//! code is identical either way.

use std::path::PathBuf;
use std::sync::Arc;

/// Audio payload for a loaded sound.
#[derive(Debug, Clone)]
pub(crate) enum SoundData {
    /// Encoded bytes resident in memory.
    Preloaded(Arc<Vec<u8>>),
    /// File decoded lazily at each play.
    Streamed(PathBuf),
}

/// Initial state for a new voice.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VoiceParams {
    /// Effective gain at start.
    pub gain: f32,
    /// Playback rate multiplier at start.
    pub speed: f32,
    /// Whether the voice starts paused.
    pub paused: bool,
    /// Whether the voice restarts at its end.
    pub looping: bool,
}

#[cfg(feature = "rodio_backend")]
mod rodio_out {
    use super::{SoundData, VoiceParams};
    use crate::error::AudioError;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::{BufReader, Cursor, Read, Seek};

    /// Rodio-backed output: one sink per voice.
    pub(crate) struct Backend {
        /// Output stream (must be kept alive)
        _stream: OutputStream,
        /// Stream handle for creating sinks
        stream_handle: OutputStreamHandle,
        /// Live voices by channel id
        voices: HashMap<u32, Sink>,
    }

    impl Backend {
        pub fn new() -> Result<Self, AudioError> {
            let (stream, stream_handle) =
                OutputStream::try_default().map_err(|err| AudioError::OutputDevice {
                    detail: err.to_string(),
                })?;
            Ok(Self {
                _stream: stream,
                stream_handle,
                voices: HashMap::new(),
            })
        }

        pub fn version() -> u32 {
            crate::VERSION
        }

        pub fn is_available(&self) -> bool {
            true
        }

        pub fn start_voice(
            &mut self,
            id: u32,
            data: &SoundData,
            params: &VoiceParams,
        ) -> Result<(), AudioError> {
            let sink = Sink::try_new(&self.stream_handle).map_err(|err| AudioError::Playback {
                detail: err.to_string(),
            })?;
            sink.set_volume(params.gain);
            sink.set_speed(params.speed);
            if params.paused {
                sink.pause();
            }

            match data {
                SoundData::Preloaded(bytes) => {
                    let cursor = Cursor::new(bytes.as_ref().clone());
                    let source =
                        rodio::Decoder::new(cursor).map_err(|err| AudioError::Decode {
                            detail: err.to_string(),
                        })?;
                    append(&sink, source, params.looping);
                }
                SoundData::Streamed(path) => {
                    let reader = BufReader::new(File::open(path)?);
                    let source =
                        rodio::Decoder::new(reader).map_err(|err| AudioError::Decode {
                            detail: err.to_string(),
                        })?;
                    append(&sink, source, params.looping);
                }
            }

            self.voices.insert(id, sink);
            Ok(())
        }

        pub fn set_gain(&mut self, id: u32, gain: f32) {
            if let Some(sink) = self.voices.get(&id) {
                sink.set_volume(gain);
            }
        }

        pub fn set_speed(&mut self, id: u32, speed: f32) {
            if let Some(sink) = self.voices.get(&id) {
                sink.set_speed(speed);
            }
        }

        pub fn set_paused(&mut self, id: u32, paused: bool) {
            if let Some(sink) = self.voices.get(&id) {
                if paused {
                    sink.pause();
                } else {
                    sink.play();
                }
            }
        }

        pub fn stop_voice(&mut self, id: u32) {
            if let Some(sink) = self.voices.remove(&id) {
                sink.stop();
            }
        }

        pub fn voice_finished(&self, id: u32) -> bool {
            self.voices.get(&id).map(|sink| sink.empty()).unwrap_or(true)
        }
    }

    fn append<R>(sink: &Sink, source: rodio::Decoder<R>, looping: bool)
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
    }
}

#[cfg(not(feature = "rodio_backend"))]
mod stub {
    use super::{SoundData, VoiceParams};
    use crate::error::AudioError;
    use std::collections::HashMap;
    use tracing::debug;

    /// Voice state tracked without a device.
    #[allow(dead_code)]
    struct StubVoice {
        gain: f32,
        speed: f32,
        paused: bool,
    }

    /// Bookkeeping backend used without real output.
    ///
    /// Stub voices never finish on their own; only a stop ends them, which
    /// keeps lifecycle behavior deterministic for tests and headless use.
    pub(crate) struct Backend {
        voices: HashMap<u32, StubVoice>,
    }

    impl Backend {
        pub fn new() -> Result<Self, AudioError> {
            debug!("audio backend: stub (no output device)");
            Ok(Self {
                voices: HashMap::new(),
            })
        }

        pub fn version() -> u32 {
            crate::VERSION
        }

        pub fn is_available(&self) -> bool {
            false
        }

        pub fn start_voice(
            &mut self,
            id: u32,
            _data: &SoundData,
            params: &VoiceParams,
        ) -> Result<(), AudioError> {
            self.voices.insert(
                id,
                StubVoice {
                    gain: params.gain,
                    speed: params.speed,
                    paused: params.paused,
                },
            );
            Ok(())
        }

        pub fn set_gain(&mut self, id: u32, gain: f32) {
            if let Some(voice) = self.voices.get_mut(&id) {
                voice.gain = gain;
            }
        }

        pub fn set_speed(&mut self, id: u32, speed: f32) {
            if let Some(voice) = self.voices.get_mut(&id) {
                voice.speed = speed;
            }
        }

        pub fn set_paused(&mut self, id: u32, paused: bool) {
            if let Some(voice) = self.voices.get_mut(&id) {
                voice.paused = paused;
            }
        }

        pub fn stop_voice(&mut self, id: u32) {
            self.voices.remove(&id);
        }

        pub fn voice_finished(&self, id: u32) -> bool {
            !self.voices.contains_key(&id)
        }
    }

}

#[cfg(feature = "rodio_backend")]
pub(crate) use rodio_out::Backend;
#[cfg(not(feature = "rodio_backend"))]
pub(crate) use stub::Backend;
