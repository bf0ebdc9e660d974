use std::time::Duration;

use elemental_farm_core::{Element, TransitionDirection};
use elemental_farm_system_weather::{AmbientFrame, EffectDriver, Tween};

use crate::{fade, settled};

const LEAF_DELAY: Duration = Duration::from_millis(100);
const LEAF_FADE: Duration = Duration::from_millis(1_000);
const SWAY_FADE_IN: Duration = Duration::from_millis(1_000);
const SWAY_FADE_OUT: Duration = Duration::from_millis(1_500);

/// Swaying crops and blowing leaves shown while air dominates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wind {
    leaves_visible: bool,
    leaf_alpha: f32,
    mix: f32,
    clock_seconds: f32,
}

impl Wind {
    /// Whether the leaf sprites are shown.
    #[must_use]
    pub fn leaves_visible(&self) -> bool {
        self.leaves_visible
    }

    /// Opacity of the leaf sprites.
    #[must_use]
    pub fn leaf_alpha(&self) -> f32 {
        self.leaf_alpha
    }

    /// Shader clock last fed to the sway pass.
    #[must_use]
    pub fn clock_seconds(&self) -> f32 {
        self.clock_seconds
    }
}

impl EffectDriver for Wind {
    fn element(&self) -> Element {
        Element::Air
    }

    fn start(&mut self) -> Tween {
        self.leaves_visible = true;
        self.leaf_alpha = 0.0;
        self.mix = 0.0;
        Tween::new(SWAY_FADE_IN)
    }

    fn stop(&mut self) -> Tween {
        Tween::new(SWAY_FADE_OUT)
    }

    fn animate(&mut self, direction: TransitionDirection, progress: f32) {
        self.mix = fade(direction, progress);
        // The sway gates completion; leaves run on their own delayed fade.
        let gate = match direction {
            TransitionDirection::Start => SWAY_FADE_IN,
            TransitionDirection::Stop => SWAY_FADE_OUT,
        };
        let elapsed = gate.as_secs_f32() * progress;
        let leaf_progress = (elapsed - LEAF_DELAY.as_secs_f32()) / LEAF_FADE.as_secs_f32();
        self.leaf_alpha = fade(direction, leaf_progress);
    }

    fn settle(&mut self, direction: TransitionDirection) {
        self.mix = settled(direction);
        self.leaf_alpha = self.mix;
        if direction == TransitionDirection::Stop {
            self.leaves_visible = false;
        }
    }

    fn feed(&mut self, frame: &AmbientFrame) {
        self.clock_seconds = frame.clock_seconds;
    }

    fn mix(&self) -> f32 {
        self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sway_gates_the_start_while_leaves_wait_for_their_delay() {
        let mut wind = Wind::default();
        let tween = wind.start();
        assert_eq!(tween.total(), Duration::from_millis(1_000));
        assert!(wind.leaves_visible());
        assert!(wind.leaf_alpha().abs() < f32::EPSILON);

        // 100 ms into the fade in: sway under way, leaves just about to appear.
        wind.animate(TransitionDirection::Start, 0.1);
        assert!((wind.mix() - 0.1).abs() < 1e-5);
        assert!(wind.leaf_alpha().abs() < 1e-5);

        wind.animate(TransitionDirection::Start, 0.6);
        assert!((wind.leaf_alpha() - 0.5).abs() < 1e-5);

        wind.settle(TransitionDirection::Start);
        assert!((wind.leaf_alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn leaves_are_gone_before_the_sway_stops() {
        let mut wind = Wind::default();
        let _ = wind.start();
        wind.settle(TransitionDirection::Start);
        let _ = wind.stop();

        // 1100 ms into the 1500 ms fade out.
        wind.animate(TransitionDirection::Stop, 1_100.0 / 1_500.0);
        assert!(wind.leaf_alpha().abs() < 1e-5);
        assert!(wind.mix() > 0.2);

        wind.settle(TransitionDirection::Stop);
        assert!(!wind.leaves_visible());
    }
}
