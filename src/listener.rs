//! Listener attributes for 3D audio.

use glam::Vec3;

/// Most listeners an engine can be configured with.
pub const MAX_LISTENERS: usize = 8;

/// Position, motion, and orientation of a 3D audio listener.
///
/// `forward` and `up` must be unit length and orthogonal;
/// [`set_3d_listener_attributes`](crate::AudioEngine::set_3d_listener_attributes)
/// rejects attributes that violate this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerAttributes {
    /// World-space position.
    pub position: Vec3,
    /// World-space velocity in units per second; drives the Doppler shift.
    pub velocity: Vec3,
    /// Unit vector the listener is facing.
    pub forward: Vec3,
    /// Unit vector out of the top of the listener's head.
    pub up: Vec3,
}

impl Default for ListenerAttributes {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl ListenerAttributes {
    /// A stationary listener at `position`, facing -Z.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Check that `forward` and `up` are unit length and orthogonal.
    pub(crate) fn orientation_valid(&self) -> bool {
        const EPS: f32 = 1e-3;
        (self.forward.length() - 1.0).abs() <= EPS
            && (self.up.length() - 1.0).abs() <= EPS
            && self.forward.dot(self.up).abs() <= EPS
    }
}
