//! Opaque handles for engine-owned resources.
//!
//! Handles are plain `Copy` identifiers with no lifetime tie to the engine.
//! The engine allocates them from monotonically increasing counters and
//! never reuses a value, so a handle whose resource is gone stays
//! detectably stale instead of aliasing a newer resource.

/// Handle to a loaded or streamed audio asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub(crate) u32);

/// Handle to one active playback instance of a sound.
///
/// Channel handles are invalidated when the channel stops: immediately on
/// [`stop_channel`](crate::AudioEngine::stop_channel), or during the next
/// [`update`](crate::AudioEngine::update) once the voice finishes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub(crate) u32);

/// Handle to a named bus that groups channels for collective control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelGroupHandle(pub(crate) u32);
