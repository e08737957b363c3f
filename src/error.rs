//! Errors and result codes for engine operations.

use thiserror::Error;

/// Errors returned by engine operations.
///
/// Every variant carries a stable numeric result code (see
/// [`AudioError::code`]); the engine writes that code into its log lines and
/// otherwise passes errors through to the caller without classification or
/// recovery.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The audio output device could not be opened.
    #[error("audio output unavailable: {detail}")]
    OutputDevice {
        /// Backend description of the device failure.
        detail: String,
    },
    /// The backend is older than the version this crate was built against.
    #[error("backend version {found:#010x} is older than required {required:#010x}")]
    VersionMismatch {
        /// Version reported by the backend.
        found: u32,
        /// Version the engine was built against ([`crate::VERSION`]).
        required: u32,
    },
    /// Sound data could not be decoded.
    #[error("failed to decode sound data: {detail}")]
    Decode {
        /// Backend description of the decode failure.
        detail: String,
    },
    /// The backend failed to start a playback voice.
    #[error("failed to start playback: {detail}")]
    Playback {
        /// Backend description of the playback failure.
        detail: String,
    },
    /// Reading a sound file failed.
    #[error("failed to read sound file: {0}")]
    Io(#[from] std::io::Error),
    /// The handle does not refer to a live resource.
    #[error("stale or unknown handle")]
    InvalidHandle,
    /// An argument was outside its documented range.
    #[error("invalid parameter: {what}")]
    InvalidParameter {
        /// Which argument was rejected and why.
        what: &'static str,
    },
    /// A listener orientation vector was not unit length or not orthogonal.
    #[error("listener forward/up vectors must be orthonormal")]
    InvalidVector,
    /// The operation requires a sound created with
    /// [`SoundMode::SPATIAL`](crate::SoundMode::SPATIAL).
    #[error("channel's sound was not created with SPATIAL mode")]
    NotSpatial,
    /// Settings could not be encoded for persistence.
    #[error("failed to persist settings: {detail}")]
    Persist {
        /// Description of the encoding failure.
        detail: String,
    },
}

impl AudioError {
    /// Stable numeric result code for this error.
    ///
    /// Codes identify the failure category across releases; log lines carry
    /// them alongside the human-readable message.
    pub fn code(&self) -> u32 {
        match self {
            AudioError::OutputDevice { .. } => 1,
            AudioError::VersionMismatch { .. } => 2,
            AudioError::Decode { .. } => 3,
            AudioError::Playback { .. } => 4,
            AudioError::Io(_) => 5,
            AudioError::InvalidHandle => 6,
            AudioError::InvalidParameter { .. } => 7,
            AudioError::InvalidVector => 8,
            AudioError::NotSpatial => 9,
            AudioError::Persist { .. } => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_and_distinct() {
        let errors = [
            AudioError::OutputDevice {
                detail: String::new(),
            },
            AudioError::VersionMismatch {
                found: 0,
                required: 1,
            },
            AudioError::Decode {
                detail: String::new(),
            },
            AudioError::Playback {
                detail: String::new(),
            },
            AudioError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x")),
            AudioError::InvalidHandle,
            AudioError::InvalidParameter { what: "x" },
            AudioError::InvalidVector,
            AudioError::NotSpatial,
            AudioError::Persist {
                detail: String::new(),
            },
        ];

        let codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn version_mismatch_message_shows_both_versions() {
        let err = AudioError::VersionMismatch {
            found: 0x0000_0001,
            required: 0x0000_0100,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x00000001"));
        assert!(msg.contains("0x00000100"));
    }
}
