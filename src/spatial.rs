//! Distance attenuation and Doppler math applied by the output backend.
//!
//! The facade never transforms audio itself; it forwards listener and
//! emitter attributes, and these functions compute the gain and pitch the
//! backend applies to each voice during
//! [`update`](crate::AudioEngine::update).

use crate::listener::ListenerAttributes;
use glam::Vec3;

/// Speed of sound used for the Doppler shift, in world units per second.
pub const SPEED_OF_SOUND: f32 = 343.0;

/// Doppler factors outside this range are clamped.
pub const DOPPLER_RANGE: (f32, f32) = (0.5, 2.0);

/// Linear distance attenuation.
///
/// Full gain inside `min_distance`, silence at `max_distance` and beyond,
/// linear in between.
pub fn distance_gain(distance: f32, min_distance: f32, max_distance: f32) -> f32 {
    if distance <= min_distance {
        return 1.0;
    }
    if distance >= max_distance {
        return 0.0;
    }
    1.0 - (distance - min_distance) / (max_distance - min_distance)
}

/// Gain for an emitter as heard by the closest of `listeners`.
pub fn emitter_gain(
    emitter: Vec3,
    listeners: &[ListenerAttributes],
    min_distance: f32,
    max_distance: f32,
) -> f32 {
    listeners
        .iter()
        .map(|l| distance_gain(emitter.distance(l.position), min_distance, max_distance))
        .fold(0.0, f32::max)
}

/// Doppler factor for an emitter relative to one listener.
///
/// Greater than 1.0 while the two close on each other, less than 1.0 while
/// they separate, clamped to [`DOPPLER_RANGE`].
pub fn doppler_factor(listener: &ListenerAttributes, emitter: Vec3, emitter_velocity: Vec3) -> f32 {
    let offset = emitter - listener.position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return 1.0;
    }
    let dir = offset / distance;
    // Radial velocity components along the listener-to-emitter line.
    let listener_radial = listener.velocity.dot(dir);
    let emitter_radial = emitter_velocity.dot(dir);
    // Supersonic closure would make the denominator non-positive; the clamp
    // bounds the shift either way.
    let factor = (SPEED_OF_SOUND + listener_radial) / (SPEED_OF_SOUND + emitter_radial).max(1.0);
    factor.clamp(DOPPLER_RANGE.0, DOPPLER_RANGE.1)
}

/// Doppler factor for an emitter against a listener set.
///
/// The shift is only applied in single-listener setups; with several
/// listeners there is no one reference frame, so the factor is 1.0.
pub fn doppler_for(
    listeners: &[ListenerAttributes],
    emitter: Vec3,
    emitter_velocity: Vec3,
) -> f32 {
    match listeners {
        [listener] => doppler_factor(listener, emitter, emitter_velocity),
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_plateaus_inside_min_distance() {
        assert_eq!(distance_gain(0.0, 1.0, 10.0), 1.0);
        assert_eq!(distance_gain(1.0, 1.0, 10.0), 1.0);
    }

    #[test]
    fn gain_is_silent_beyond_max_distance() {
        assert_eq!(distance_gain(10.0, 1.0, 10.0), 0.0);
        assert_eq!(distance_gain(50.0, 1.0, 10.0), 0.0);
    }

    #[test]
    fn gain_is_linear_between_bounds() {
        let gain = distance_gain(5.5, 1.0, 10.0);
        assert!((gain - 0.5).abs() < 1e-6);
    }

    #[test]
    fn closest_listener_wins() {
        let near = ListenerAttributes::at(Vec3::new(2.0, 0.0, 0.0));
        let far = ListenerAttributes::at(Vec3::new(100.0, 0.0, 0.0));
        let gain_near_only = emitter_gain(Vec3::ZERO, &[near], 1.0, 10.0);
        let gain_both = emitter_gain(Vec3::ZERO, &[far, near], 1.0, 10.0);
        assert_eq!(gain_near_only, gain_both);
    }

    #[test]
    fn stationary_pair_has_no_shift() {
        let listener = ListenerAttributes::default();
        let factor = doppler_factor(&listener, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn approaching_emitter_raises_pitch() {
        let listener = ListenerAttributes::default();
        // Emitter at +X moving toward the listener at the origin.
        let factor = doppler_factor(
            &listener,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-20.0, 0.0, 0.0),
        );
        assert!(factor > 1.0);
    }

    #[test]
    fn receding_listener_lowers_pitch() {
        let listener = ListenerAttributes {
            velocity: Vec3::new(-20.0, 0.0, 0.0),
            ..Default::default()
        };
        let factor = doppler_factor(&listener, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        assert!(factor < 1.0);
    }

    #[test]
    fn extreme_closure_is_clamped() {
        let listener = ListenerAttributes::default();
        let factor = doppler_factor(
            &listener,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-10_000.0, 0.0, 0.0),
        );
        assert_eq!(factor, DOPPLER_RANGE.1);
    }

    #[test]
    fn multiple_listeners_disable_doppler() {
        let listeners = [ListenerAttributes::default(), ListenerAttributes::default()];
        let factor = doppler_for(&listeners, Vec3::X, Vec3::new(-100.0, 0.0, 0.0));
        assert_eq!(factor, 1.0);
    }
}
