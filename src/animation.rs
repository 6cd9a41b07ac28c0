//! Wing spin and neck swing.
//!
//! Both motions are driven by a [`SpeedRamp`]: while the animation is on the
//! speed climbs linearly to its maximum, when it is switched off the speed
//! eases back down to rest. [`AnimationState::frame`] advances both ramps once
//! and applies the resulting rotations to the figure and all of its copies.

use std::f32::consts::TAU;

use winit::keyboard::{Key, NamedKey};

use crate::{
    data_structures::scene_graph::SceneNode,
    scene::{
        figure::{Figure, neck_of},
        params::AnimationParams,
    },
};

/// Ease-out quad on `[0, 1]`.
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Add `delta` to the angle `angle`, wrapped to `[0, 2pi)` so spin angles
/// keep their precision no matter how long the fans run.
pub fn spin(angle: f32, delta: f32) -> f32 {
    (angle + delta).rem_euclid(TAU)
}

/// Fraction of `max` below which a decelerating ramp snaps to rest.
pub const REST_THRESHOLD: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedRamp {
    pub speed: f32,
    pub step: f32,
    pub max: f32,
}

impl SpeedRamp {
    pub fn new(step: f32, max: f32) -> Self {
        Self {
            speed: 0.0,
            step,
            max,
        }
    }

    /// Advance one frame and return the new speed.
    pub fn advance(&mut self, on: bool) -> f32 {
        if on {
            if self.speed < self.max {
                self.speed = (self.speed + self.step).min(self.max);
            }
        } else if self.speed > 0.0 {
            let t = (self.speed / self.max).clamp(0.0, 1.0);
            self.speed = (self.speed - self.step * ease_out_quad(t)).max(0.0);
            if self.speed < self.max * REST_THRESHOLD {
                self.speed = 0.0;
            }
        }
        self.speed
    }

    pub fn is_at_rest(&self) -> bool {
        self.speed == 0.0
    }
}

/// Rotation applied in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameDelta {
    /// Added to the wing Z rotation, which then wraps to `[0, 2pi)`.
    pub wing: f32,
    /// Added to the neck Y rotation after clamping.
    pub neck: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub rotating: bool,
    pub wing: SpeedRamp,
    pub neck: SpeedRamp,
    /// +1 or -1, the direction the neck currently swings in.
    pub neck_direction: f32,
    pub neck_limit: f32,
}

impl AnimationState {
    pub fn new(params: &AnimationParams) -> Self {
        Self {
            rotating: false,
            wing: SpeedRamp::new(params.wing_step, params.wing_max),
            neck: SpeedRamp::new(params.neck_step, params.neck_max),
            neck_direction: 1.0,
            neck_limit: params.neck_limit,
        }
    }

    pub fn toggle(&mut self) {
        self.rotating = !self.rotating;
        log::debug!("Rotation {}", if self.rotating { "on" } else { "off" });
    }

    /// Space flips the animation, every other key is ignored. Returns whether
    /// the key was used.
    pub fn on_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::Space) => {
                self.toggle();
                true
            }
            _ => false,
        }
    }

    /// Advance both ramps, returning `(wing, neck)` speeds.
    pub fn advance_speeds(&mut self) -> (f32, f32) {
        (self.wing.advance(self.rotating), self.neck.advance(self.rotating))
    }

    /// Step the neck angle `current` by the neck speed, keeping it within the
    /// swing limit. Returns the delta that was actually applied.
    pub fn swing(&mut self, current: f32, neck_speed: f32) -> f32 {
        let target = current + neck_speed * self.neck_direction;
        if target > self.neck_limit {
            self.neck_direction = -1.0;
        } else if target < -self.neck_limit {
            self.neck_direction = 1.0;
        }
        target.clamp(-self.neck_limit, self.neck_limit) - current
    }

    /// Advance one frame: spin the wing of `figure`, swing its neck and pass
    /// the same motion on to the neck of every copy.
    pub fn frame(&mut self, figure: &mut Figure, instances: &mut [SceneNode]) -> FrameDelta {
        let (wing_speed, neck_speed) = self.advance_speeds();

        if let Some(wing) = figure.wing_mut() {
            wing.transform.rotation.z = spin(wing.transform.rotation.z, wing_speed);
        }
        let mut delta = FrameDelta {
            wing: wing_speed,
            neck: 0.0,
        };
        if let Some(neck) = figure.neck_mut() {
            delta.neck = self.swing(neck.transform.rotation.y, neck_speed);
            neck.transform.rotation.y += delta.neck;
        }

        for instance in instances.iter_mut() {
            if let Some(neck) = neck_of(instance) {
                neck.transform.rotation.z = spin(neck.transform.rotation.z, delta.wing);
                neck.transform.rotation.y += delta.neck;
            }
        }
        delta
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(&AnimationParams::default())
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn ease_is_monotone_with_fixed_ends() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        let mut last = 0.0;
        for i in 0..=100 {
            let value = ease_out_quad(i as f32 / 100.0);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn ramp_up_is_linear_until_max() {
        let mut state = AnimationState::default();
        state.toggle();
        for n in 1..=60 {
            let (wing, neck) = state.advance_speeds();
            assert!((wing - (0.01 * n as f32).min(0.3)).abs() < EPS, "frame {n}");
            assert!((neck - (0.001 * n as f32).min(0.01)).abs() < EPS, "frame {n}");
        }
        assert_eq!(state.wing.speed, 0.3);
        assert_eq!(state.neck.speed, 0.01);
    }

    #[test]
    fn holding_keeps_max_speed() {
        let mut ramp = SpeedRamp {
            speed: 0.3,
            step: 0.01,
            max: 0.3,
        };
        for _ in 0..10 {
            assert_eq!(ramp.advance(true), 0.3);
        }
    }

    #[test]
    fn rest_stays_at_rest() {
        let mut ramp = SpeedRamp::new(0.01, 0.3);
        for _ in 0..10 {
            assert_eq!(ramp.advance(false), 0.0);
        }
    }

    #[test]
    fn deceleration_stops_exactly_in_bounded_frames() {
        for (step, max) in [(0.01, 0.3), (0.001, 0.01)] {
            let mut reachable = SpeedRamp::new(step, max);
            while reachable.speed < max {
                reachable.advance(true);
                let mut ramp = reachable;
                let mut frames = 0;
                while !ramp.is_at_rest() {
                    let before = ramp.speed;
                    let after = ramp.advance(false);
                    assert!(after >= 0.0);
                    assert!(after < before);
                    frames += 1;
                    assert!(frames < 1000, "no rest from {}", reachable.speed);
                }
                assert_eq!(ramp.speed, 0.0);
            }
        }
    }

    #[test]
    fn neck_stays_within_limits() {
        let mut state = AnimationState::default();
        state.toggle();
        let mut figure = Figure::build();
        let mut flips = 0;
        let mut direction = state.neck_direction;
        for _ in 0..2000 {
            state.frame(&mut figure, &mut []);
            let angle = figure.neck().map_or(0.0, |n| n.transform.rotation.y);
            assert!(angle.abs() <= FRAC_PI_4 + EPS, "angle {angle}");
            if state.neck_direction != direction {
                flips += 1;
                direction = state.neck_direction;
            }
        }
        assert!(flips >= 2);
    }

    #[test]
    fn swing_records_the_clamped_delta() {
        let mut state = AnimationState::default();
        let delta = state.swing(FRAC_PI_4 - 0.004, 0.01);
        assert!((delta - 0.004).abs() < EPS);
        assert_eq!(state.neck_direction, -1.0);
        let delta = state.swing(FRAC_PI_4, 0.01);
        assert!((delta + 0.01).abs() < EPS);
    }

    #[test]
    fn copies_receive_the_applied_motion() {
        let mut state = AnimationState::default();
        state.toggle();
        let mut figure = Figure::build();
        let mut copies = vec![figure.root().clone(), figure.root().clone()];
        let delta = state.frame(&mut figure, &mut copies);
        for copy in &copies {
            let neck = &copy.children()[0].transform;
            assert_eq!(neck.rotation.z, delta.wing);
            assert_eq!(neck.rotation.y, delta.neck);
            // the copy's own wing is not spun separately
            assert_eq!(copy.children()[0].children()[0].transform.rotation.z, 0.0);
        }
    }

    #[test]
    fn long_running_spin_keeps_full_precision() {
        let mut state = AnimationState::default();
        state.toggle();
        state.wing.speed = state.wing.max;
        let mut figure = Figure::build();
        let mut copies = vec![figure.root().clone()];
        // about ten hours of spinning at 60 fps
        if let Some(wing) = figure.wing_mut() {
            wing.transform.rotation.z = 6.5e5;
        }
        if let Some(neck) = neck_of(&mut copies[0]) {
            neck.transform.rotation.z = 5e6;
        }

        state.frame(&mut figure, &mut copies);
        for _ in 0..1000 {
            let wing_before = figure.wing().map_or(0.0, |w| w.transform.rotation.z);
            let copy_before = copies[0].children()[0].transform.rotation.z;
            let delta = state.frame(&mut figure, &mut copies);
            let wing_after = figure.wing().map_or(0.0, |w| w.transform.rotation.z);
            let copy_after = copies[0].children()[0].transform.rotation.z;

            assert!((0.0..TAU).contains(&wing_after));
            assert!((0.0..TAU).contains(&copy_after));
            let wing_step = (wing_after - wing_before).rem_euclid(TAU);
            let copy_step = (copy_after - copy_before).rem_euclid(TAU);
            assert!((wing_step - 0.3).abs() < 1e-5, "wing advanced {wing_step}");
            assert!((copy_step - 0.3).abs() < 1e-5, "copy advanced {copy_step}");
            assert_eq!(delta.wing, 0.3);
        }
    }

    #[test]
    fn spin_wraps_into_one_turn() {
        assert!((spin(TAU - 0.1, 0.3) - 0.2).abs() < 1e-5);
        assert_eq!(spin(0.0, 0.0), 0.0);
        assert!((0.0..TAU).contains(&spin(5e6, 0.3)));
    }

    #[test]
    fn only_space_toggles() {
        let mut state = AnimationState::default();
        assert!(state.on_key(&Key::Named(NamedKey::Space)));
        assert!(state.rotating);
        assert!(!state.on_key(&Key::Named(NamedKey::Enter)));
        assert!(!state.on_key(&Key::Character("a".into())));
        assert!(!state.on_key(&Key::Character(" ".into())));
        assert!(state.rotating);
        assert!(state.on_key(&Key::Named(NamedKey::Space)));
        assert!(!state.rotating);
    }
}
