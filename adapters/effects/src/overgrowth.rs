use std::time::Duration;

use elemental_farm_core::{Element, TransitionDirection};
use elemental_farm_system_weather::{EffectDriver, Tween};
use glam::Vec2;

use crate::{fade, settled};

const TILE_SIZE: f32 = 64.0;
const SPROUT_SCALE: f32 = 0.1;
const GROWN_SCALE: f32 = 2.0;
const GROW_DELAY: Duration = Duration::from_millis(100);
const GROW: Duration = Duration::from_millis(2_000);
const WITHER_DELAY: Duration = Duration::from_millis(100);
const WITHER: Duration = Duration::from_millis(1_000);

/// Tufts scattered across the farm, in tile units, with their sprite frame.
const TUFTS: [(f32, f32, u8); 11] = [
    (2.0, 8.0, 1),
    (4.0, 6.0, 0),
    (14.0, 0.5, 0),
    (5.5, 2.0, 0),
    (11.0, 3.0, 0),
    (9.0, 1.0, 1),
    (4.0, 1.0, 0),
    (0.0, 4.0, 0),
    (14.0, 7.0, 1),
    (10.0, 6.5, 1),
    (7.5, 4.0, 0),
];

/// Grass sprite placed while earth dominates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// Position in world pixels.
    pub position: Vec2,
    /// Sprite frame within the grass sheet.
    pub frame: u8,
}

/// Wild grass that sprouts across the farm while earth dominates.
#[derive(Clone, Debug, PartialEq)]
pub struct Overgrowth {
    decorations: Vec<Decoration>,
    visible: bool,
    alpha: f32,
    scale: Vec2,
}

impl Overgrowth {
    /// Grass placements in world pixels.
    #[must_use]
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Whether the grass sprites are shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Opacity shared by every grass sprite.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Scale shared by every grass sprite.
    #[must_use]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }
}

impl Default for Overgrowth {
    fn default() -> Self {
        let decorations = TUFTS
            .iter()
            .map(|&(column, row, frame)| Decoration {
                position: Vec2::new(column, row) * TILE_SIZE,
                frame,
            })
            .collect();
        Self {
            decorations,
            visible: false,
            alpha: 0.0,
            scale: Vec2::splat(GROWN_SCALE),
        }
    }
}

impl EffectDriver for Overgrowth {
    fn element(&self) -> Element {
        Element::Earth
    }

    fn start(&mut self) -> Tween {
        self.visible = true;
        self.alpha = 0.0;
        self.scale = Vec2::splat(SPROUT_SCALE);
        Tween::delayed(GROW_DELAY, GROW)
    }

    fn stop(&mut self) -> Tween {
        Tween::delayed(WITHER_DELAY, WITHER)
    }

    fn animate(&mut self, direction: TransitionDirection, progress: f32) {
        self.alpha = fade(direction, progress);
        if direction == TransitionDirection::Start {
            self.scale = Vec2::splat(SPROUT_SCALE).lerp(Vec2::splat(GROWN_SCALE), progress);
        }
    }

    fn settle(&mut self, direction: TransitionDirection) {
        self.alpha = settled(direction);
        self.scale = Vec2::splat(GROWN_SCALE);
        if direction == TransitionDirection::Stop {
            self.visible = false;
        }
    }

    fn mix(&self) -> f32 {
        self.alpha
    }
}
