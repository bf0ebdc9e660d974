#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation-side effect drivers for the four weather effects.
//!
//! Each driver models the values a renderer samples every frame (blend
//! factors, shader clocks, sprite alpha, decoration layout) and reports its
//! animation lengths to the weather controller.

mod heatwave;
mod overgrowth;
mod storm;
mod wind;

use elemental_farm_core::TransitionDirection;
use elemental_farm_system_weather::{DriverSetError, EffectDriver, EffectDrivers};

pub use heatwave::Heatwave;
pub use overgrowth::{Decoration, Overgrowth};
pub use storm::Storm;
pub use wind::Wind;

/// Builds the dispatch table holding one driver of each kind.
pub fn standard_drivers() -> Result<EffectDrivers, DriverSetError> {
    EffectDrivers::new(vec![
        Box::new(Heatwave::default()) as Box<dyn EffectDriver>,
        Box::new(Storm::default()),
        Box::new(Overgrowth::default()),
        Box::new(Wind::default()),
    ])
}

/// Blend value for a fade in or out at the provided progress.
fn fade(direction: TransitionDirection, progress: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    match direction {
        TransitionDirection::Start => progress,
        TransitionDirection::Stop => 1.0 - progress,
    }
}

/// Final blend value once a fade settled.
fn settled(direction: TransitionDirection) -> f32 {
    fade(direction, 1.0)
}
