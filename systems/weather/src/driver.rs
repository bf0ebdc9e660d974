//! Effect driver capability and the completion handles the controller polls.

use std::{fmt, time::Duration};

use elemental_farm_core::{Element, TransitionDirection};

/// Progress of a [`Tween`] after it was advanced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStatus {
    /// The animation is still playing.
    Running,
    /// The animation reached its end during this advance.
    Finished,
}

/// Completion handle returned by [`EffectDriver::start`] and [`EffectDriver::stop`].
///
/// A tween only finishes once its delay and duration have both elapsed
/// through [`Tween::advance`], so a zero-length animation still completes on
/// the frame after it began, never inside the call that began it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tween {
    delay: Duration,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    /// Animation that starts immediately and runs for `duration`.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self::delayed(Duration::ZERO, duration)
    }

    /// Animation that waits for `delay` before running for `duration`.
    #[must_use]
    pub const fn delayed(delay: Duration, duration: Duration) -> Self {
        Self {
            delay,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Time from the beginning of the tween until it finishes.
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }

    /// Advances the tween clock by `dt`.
    pub fn advance(&mut self, dt: Duration) -> TweenStatus {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.total());
        if self.elapsed >= self.total() {
            TweenStatus::Finished
        } else {
            TweenStatus::Running
        }
    }

    /// Fraction of the animated portion that has played, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let animated = self.elapsed.saturating_sub(self.delay);
        if self.duration.is_zero() {
            return if self.elapsed >= self.delay { 1.0 } else { 0.0 };
        }
        (animated.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Per-frame data handed to the active effect's driver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AmbientFrame {
    /// Running simulation clock in seconds.
    pub clock_seconds: f32,
    /// Current lightning flash intensity; zero outside storms.
    pub lightning_intensity: f32,
}

/// Presentation-side capability that animates one element's weather effect.
///
/// Drivers never touch the weather state. They describe how long their
/// animations take, follow the progress the controller reports, and are told
/// when an animation has settled.
pub trait EffectDriver: fmt::Debug {
    /// Element whose effect this driver presents.
    fn element(&self) -> Element;

    /// Begins fading the effect in.
    fn start(&mut self) -> Tween;

    /// Begins fading the effect out.
    fn stop(&mut self) -> Tween;

    /// Reports animation progress for the transition in flight.
    fn animate(&mut self, _direction: TransitionDirection, _progress: f32) {}

    /// Reports that the transition finished; called exactly once per start or stop.
    fn settle(&mut self, _direction: TransitionDirection) {}

    /// Supplies per-frame ambient data while the effect is active.
    fn feed(&mut self, _frame: &AmbientFrame) {}

    /// Blend factor a renderer applies to the effect, in `0.0..=1.0`.
    fn mix(&self) -> f32 {
        0.0
    }
}

/// Errors raised when assembling a driver table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DriverSetError {
    /// No driver was supplied for the element.
    #[error("no effect driver registered for {0:?}")]
    Missing(Element),
    /// More than one driver reported the element.
    #[error("more than one effect driver registered for {0:?}")]
    Duplicate(Element),
}

/// Dispatch table holding exactly one driver per element.
#[derive(Debug)]
pub struct EffectDrivers {
    drivers: Vec<Box<dyn EffectDriver>>,
}

impl EffectDrivers {
    /// Builds the table, keyed by the element each driver reports.
    pub fn new(drivers: Vec<Box<dyn EffectDriver>>) -> Result<Self, DriverSetError> {
        let mut slots: [Option<Box<dyn EffectDriver>>; 4] = [None, None, None, None];
        for driver in drivers {
            let element = driver.element();
            let slot = &mut slots[element.index()];
            if slot.is_some() {
                return Err(DriverSetError::Duplicate(element));
            }
            *slot = Some(driver);
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for (element, slot) in Element::ALL.into_iter().zip(slots) {
            ordered.push(slot.ok_or(DriverSetError::Missing(element))?);
        }
        Ok(Self { drivers: ordered })
    }

    /// Driver presenting the provided element.
    pub fn get_mut(&mut self, element: Element) -> &mut dyn EffectDriver {
        self.drivers[element.index()].as_mut()
    }

    /// Driver presenting the provided element.
    #[must_use]
    pub fn get(&self, element: Element) -> &dyn EffectDriver {
        self.drivers[element.index()].as_ref()
    }
}
