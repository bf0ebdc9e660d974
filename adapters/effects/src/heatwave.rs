use std::time::Duration;

use elemental_farm_core::{Element, TransitionDirection};
use elemental_farm_system_weather::{AmbientFrame, EffectDriver, Tween};

use crate::{fade, settled};

const FADE: Duration = Duration::from_millis(1_500);

/// Camera-wide heat shimmer shown while fire dominates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Heatwave {
    attached: bool,
    mix: f32,
    clock_seconds: f32,
}

impl Heatwave {
    /// Whether the shimmer pass is attached to the camera.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Shader clock last fed to the shimmer.
    #[must_use]
    pub fn clock_seconds(&self) -> f32 {
        self.clock_seconds
    }
}

impl EffectDriver for Heatwave {
    fn element(&self) -> Element {
        Element::Fire
    }

    fn start(&mut self) -> Tween {
        self.attached = true;
        self.mix = 0.0;
        Tween::new(FADE)
    }

    fn stop(&mut self) -> Tween {
        Tween::new(FADE)
    }

    fn animate(&mut self, direction: TransitionDirection, progress: f32) {
        self.mix = fade(direction, progress);
    }

    fn settle(&mut self, direction: TransitionDirection) {
        self.mix = settled(direction);
        if direction == TransitionDirection::Stop {
            self.attached = false;
        }
    }

    fn feed(&mut self, frame: &AmbientFrame) {
        self.clock_seconds = frame.clock_seconds;
    }

    fn mix(&self) -> f32 {
        self.mix
    }
}
