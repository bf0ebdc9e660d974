use std::time::Duration;

use elemental_farm_core::{Element, TransitionDirection};
use elemental_farm_system_weather::{AmbientFrame, EffectDriver, Tween};

use crate::{fade, settled};

const FADE: Duration = Duration::from_millis(1_500);

/// Rain pass with lightning flashes shown while water dominates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Storm {
    attached: bool,
    mix: f32,
    clock_seconds: f32,
    lightning_intensity: f32,
}

impl Storm {
    /// Whether the rain pass is attached to the camera.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Shader clock last fed to the rain pass.
    #[must_use]
    pub fn clock_seconds(&self) -> f32 {
        self.clock_seconds
    }

    /// Brightness of the current lightning flash.
    #[must_use]
    pub fn lightning_intensity(&self) -> f32 {
        self.lightning_intensity
    }
}

impl EffectDriver for Storm {
    fn element(&self) -> Element {
        Element::Water
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
            self.lightning_intensity = 0.0;
        }
    }

    fn feed(&mut self, frame: &AmbientFrame) {
        self.clock_seconds = frame.clock_seconds;
        self.lightning_intensity = frame.lightning_intensity;
    }

    fn mix(&self) -> f32 {
        self.mix
    }
}
