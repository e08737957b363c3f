//! Property-based tests for spatial math and channel bookkeeping
//!
//! Validates the backend-side audio invariants:
//! - Distance attenuation stays in [0, 1] and never rises with distance
//! - Doppler factors stay inside their clamp range with the right sign
//! - The live channel count never exceeds the configured cap

use aulos::{spatial, AudioEngine, EngineConfig, ListenerAttributes, SoundInfo, SoundMode, SoundSource};
use glam::Vec3;
use proptest::prelude::*;

fn finite_vec3() -> impl Strategy<Value = Vec3> {
    (-1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    /// Property: attenuation is a gain, never negative and never above 1
    #[test]
    fn distance_gain_stays_in_range(
        distance in 0.0f32..10_000.0,
        min in 0.0f32..100.0,
        span in 0.1f32..1000.0,
    ) {
        let gain = spatial::distance_gain(distance, min, min + span);
        prop_assert!((0.0..=1.0).contains(&gain), "gain {} out of range", gain);
    }

    /// Property: moving an emitter farther away never makes it louder
    #[test]
    fn distance_gain_is_monotonic(
        near in 0.0f32..1000.0,
        step in 0.0f32..1000.0,
        min in 0.0f32..100.0,
        span in 0.1f32..1000.0,
    ) {
        let close = spatial::distance_gain(near, min, min + span);
        let far = spatial::distance_gain(near + step, min, min + span);
        prop_assert!(far <= close, "gain rose from {} to {} with distance", close, far);
    }

    /// Property: with several listeners the loudest one decides
    ///
    /// Adding a listener can only keep or raise an emitter's gain.
    #[test]
    fn extra_listener_never_lowers_gain(
        emitter in finite_vec3(),
        first in finite_vec3(),
        second in finite_vec3(),
    ) {
        let one = [ListenerAttributes::at(first)];
        let two = [ListenerAttributes::at(first), ListenerAttributes::at(second)];
        let gain_one = spatial::emitter_gain(emitter, &one, 1.0, 100.0);
        let gain_two = spatial::emitter_gain(emitter, &two, 1.0, 100.0);
        prop_assert!(gain_two >= gain_one);
    }

    /// Property: Doppler factors never escape their clamp range
    #[test]
    fn doppler_factor_is_clamped(
        emitter in finite_vec3(),
        emitter_velocity in finite_vec3(),
        listener_pos in finite_vec3(),
        listener_velocity in finite_vec3(),
    ) {
        let listener = ListenerAttributes {
            position: listener_pos,
            velocity: listener_velocity,
            ..Default::default()
        };
        let factor = spatial::doppler_factor(&listener, emitter, emitter_velocity);
        let (lo, hi) = spatial::DOPPLER_RANGE;
        prop_assert!((lo..=hi).contains(&factor), "factor {} escaped clamp", factor);
    }

    /// Property: an emitter closing on a stationary listener never drops pitch
    #[test]
    fn approach_never_lowers_pitch(
        distance in 1.0f32..1000.0,
        closing_speed in 0.0f32..300.0,
    ) {
        let listener = ListenerAttributes::default();
        let emitter = Vec3::new(distance, 0.0, 0.0);
        let velocity = Vec3::new(-closing_speed, 0.0, 0.0);
        let factor = spatial::doppler_factor(&listener, emitter, velocity);
        prop_assert!(factor >= 1.0, "closing emitter gave factor {}", factor);
    }

    /// Property: the live channel count never exceeds the configured cap
    ///
    /// However many plays are issued against whatever cap, stealing keeps
    /// the engine at or below the cap, and the newest play always lands.
    #[test]
    fn channel_cap_is_never_exceeded(
        cap in 1usize..16,
        plays in 1usize..64,
    ) {
        let mut engine = AudioEngine::headless(EngineConfig {
            max_channels: cap,
            ..Default::default()
        });
        let sound = engine
            .create_sound(
                SoundSource::Memory(vec![0u8; 8]),
                SoundMode::default(),
                SoundInfo::default(),
            )
            .expect("memory sound loads");

        let mut last = None;
        for _ in 0..plays {
            last = Some(engine.play_sound(sound, None, false).expect("play starts"));
            prop_assert!(engine.active_channels() <= cap);
        }
        prop_assert_eq!(engine.active_channels(), plays.min(cap));
        prop_assert!(engine.channel_is_playing(last.expect("played at least once")).is_ok());
    }
}
