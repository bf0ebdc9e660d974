#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weather transition controller.
//!
//! The controller owns the weather state and serialises every start and stop
//! animation through a single in-flight slot backed by a FIFO queue. Effect
//! drivers only animate; state changes happen here.

mod driver;
mod lightning;

use std::{collections::VecDeque, time::Duration};

use elemental_farm_core::{
    Element, Event, TransitionDirection, TransitionRequest, WeatherFlags, WeatherState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

pub use driver::{AmbientFrame, DriverSetError, EffectDriver, EffectDrivers, Tween, TweenStatus};
pub use lightning::LightningConfig;

use lightning::Lightning;

/// Configuration parameters required to construct the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    rng_seed: u64,
    lightning: LightningConfig,
}

impl Config {
    /// Creates a configuration with the provided lightning seed and default lightning tuning.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            lightning: LightningConfig::default(),
        }
    }

    /// Replaces the lightning tuning.
    #[must_use]
    pub const fn with_lightning(mut self, lightning: LightningConfig) -> Self {
        self.lightning = lightning;
        self
    }

    /// Seed used for the lightning random stream.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Lightning tuning.
    #[must_use]
    pub const fn lightning(&self) -> LightningConfig {
        self.lightning
    }
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    direction: TransitionDirection,
    element: Element,
    tween: Tween,
}

/// Serialises weather transitions and drives the active effect every tick.
#[derive(Debug)]
pub struct WeatherController {
    state: WeatherState,
    queue: VecDeque<TransitionRequest>,
    in_flight: Option<InFlight>,
    drivers: EffectDrivers,
    onboarding_finished: bool,
    lightning: Lightning,
    rng: ChaCha8Rng,
}

impl WeatherController {
    /// Creates an idle controller with clear skies.
    #[must_use]
    pub fn new(config: Config, drivers: EffectDrivers) -> Self {
        Self {
            state: WeatherState::None,
            queue: VecDeque::new(),
            in_flight: None,
            drivers,
            onboarding_finished: false,
            lightning: Lightning::new(config.lightning),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Committed weather state.
    #[must_use]
    pub fn state(&self) -> WeatherState {
        self.state
    }

    /// Per-effect flag view of the committed state.
    #[must_use]
    pub fn flags(&self) -> WeatherFlags {
        self.state.flags()
    }

    /// Reports whether an animation is currently in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Direction and element of the animation in flight, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<(TransitionDirection, Element)> {
        self.in_flight
            .as_ref()
            .map(|flight| (flight.direction, flight.element))
    }

    /// Requests waiting for the in-flight animation to finish, in drain order.
    pub fn queued(&self) -> impl Iterator<Item = &TransitionRequest> + '_ {
        self.queue.iter()
    }

    /// Current lightning flash intensity.
    #[must_use]
    pub fn lightning_intensity(&self) -> f32 {
        self.lightning.intensity()
    }

    /// Whether weather clearances are reported as resolutions.
    #[must_use]
    pub fn onboarding_finished(&self) -> bool {
        self.onboarding_finished
    }

    /// Effect drivers owned by the controller.
    #[must_use]
    pub fn drivers(&self) -> &EffectDrivers {
        &self.drivers
    }

    /// State the weather will settle in once every queued request has drained.
    ///
    /// An in-flight stop already counts as clear skies.
    #[must_use]
    pub fn projected_state(&self) -> WeatherState {
        let committed = match self.in_flight {
            Some(InFlight {
                direction: TransitionDirection::Stop,
                ..
            }) => WeatherState::None,
            _ => self.state,
        };

        self.queue
            .iter()
            .fold(committed, |projected, request| match request.direction() {
                TransitionDirection::Start => request
                    .element()
                    .map_or(projected, WeatherState::Active),
                TransitionDirection::Stop if request.is_clear_only() => WeatherState::None,
                TransitionDirection::Stop => match (projected, request.element()) {
                    (WeatherState::Active(active), Some(target)) if active == target => {
                        WeatherState::None
                    }
                    _ => projected,
                },
            })
    }

    /// Translates the detector's latest finding into transition requests.
    ///
    /// `dominant` is the element that crossed the imbalance threshold, or
    /// `None` when the farm is balanced. Requests that would not change the
    /// projected state are ignored.
    pub fn request(&mut self, dominant: Option<Element>, out: &mut Vec<Event>) {
        match (dominant, self.projected_state()) {
            (Some(element), WeatherState::Active(active)) if active == element => {
                trace!(?element, "weather already heading towards dominant element");
            }
            (Some(element), WeatherState::None) => {
                self.submit(TransitionRequest::start(element), out);
            }
            (Some(element), WeatherState::Active(active)) => {
                self.submit(TransitionRequest::stop(active), out);
                self.submit(TransitionRequest::start(element), out);
            }
            (None, WeatherState::Active(_)) => {
                self.submit(TransitionRequest::clear(), out);
            }
            (None, WeatherState::None) => {
                trace!("balanced farm with clear skies");
            }
        }
    }

    /// Begins the request immediately when idle, otherwise queues it.
    pub fn submit(&mut self, request: TransitionRequest, out: &mut Vec<Event>) {
        if self.in_flight.is_none() && self.queue.is_empty() {
            self.begin(request, out);
        } else {
            trace!(?request, queued = self.queue.len(), "deferring weather request");
            self.queue.push_back(request);
        }
    }

    /// Consumes world events, advancing animations on every clock tick.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::OnboardingFinished => self.onboarding_finished = true,
                Event::TimeAdvanced { now, dt } => self.update(*now, *dt, out),
                _ => {}
            }
        }
    }

    /// Advances the in-flight animation, drains at most one queued request
    /// and runs the active effect's per-tick behaviour.
    pub fn update(&mut self, now: Duration, dt: Duration, out: &mut Vec<Event>) {
        self.advance_in_flight(dt, out);

        if self.in_flight.is_none() {
            if let Some(next) = self.queue.pop_front() {
                self.begin(next, out);
            }
        }

        self.run_ambient(now, dt, out);
    }

    fn advance_in_flight(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let Some(flight) = self.in_flight.as_mut() else {
            return;
        };

        let status = flight.tween.advance(dt);
        let (direction, element) = (flight.direction, flight.element);
        let progress = flight.tween.progress();
        self.drivers.get_mut(element).animate(direction, progress);

        if status == TweenStatus::Finished {
            self.in_flight = None;
            self.complete(direction, element, out);
        }
    }

    fn begin(&mut self, request: TransitionRequest, out: &mut Vec<Event>) {
        match request.direction() {
            TransitionDirection::Start => {
                let Some(element) = request.element() else {
                    return;
                };
                match self.state {
                    WeatherState::Active(active) if active == element => {
                        trace!(?element, "effect already active");
                    }
                    WeatherState::Active(active) => {
                        // Only one effect may be visible: stop first, then retry.
                        self.queue.push_front(request);
                        self.begin_stop(active, out);
                    }
                    WeatherState::None => self.begin_start(element, out),
                }
            }
            TransitionDirection::Stop => {
                let target = if request.is_clear_only() {
                    self.state.element()
                } else {
                    request
                        .element()
                        .filter(|element| self.state == WeatherState::Active(*element))
                };
                match target {
                    Some(element) => self.begin_stop(element, out),
                    None => trace!(?request, state = ?self.state, "nothing to stop"),
                }
            }
        }
    }

    fn begin_start(&mut self, element: Element, out: &mut Vec<Event>) {
        let from = self.state;
        self.state = WeatherState::Active(element);
        let tween = self.drivers.get_mut(element).start();
        self.in_flight = Some(InFlight {
            direction: TransitionDirection::Start,
            element,
            tween,
        });
        debug!(?element, duration = ?tween.total(), "weather effect starting");

        out.push(Event::WeatherTransitionStarted {
            direction: TransitionDirection::Start,
            element,
        });
        out.push(Event::WeatherChanged {
            from,
            to: self.state,
        });
    }

    fn begin_stop(&mut self, element: Element, out: &mut Vec<Event>) {
        let tween = self.drivers.get_mut(element).stop();
        self.in_flight = Some(InFlight {
            direction: TransitionDirection::Stop,
            element,
            tween,
        });
        debug!(?element, duration = ?tween.total(), "weather effect stopping");

        out.push(Event::WeatherTransitionStarted {
            direction: TransitionDirection::Stop,
            element,
        });
    }

    fn complete(&mut self, direction: TransitionDirection, element: Element, out: &mut Vec<Event>) {
        self.drivers.get_mut(element).settle(direction);
        out.push(Event::WeatherTransitionCompleted { direction, element });

        if direction == TransitionDirection::Start {
            debug!(?element, "weather effect in place");
            return;
        }

        let from = self.state;
        self.state = WeatherState::None;
        if element == Element::Water {
            self.lightning.calm();
        }
        out.push(Event::WeatherChanged {
            from,
            to: self.state,
        });

        if self.onboarding_finished {
            info!(?element, "weather event resolved");
            out.push(Event::WeatherResolved { element });
        } else {
            debug!(?element, "weather cleared during onboarding");
        }
        out.push(Event::GoalCheckRequested);
    }

    fn run_ambient(&mut self, now: Duration, dt: Duration, out: &mut Vec<Event>) {
        let Some(element) = self.state.element() else {
            return;
        };

        let lightning_intensity = match element {
            Element::Water => {
                if self.lightning.roll(now, &mut self.rng) {
                    trace!(at = ?now, "lightning");
                    out.push(Event::LightningStruck { at: now });
                }
                self.lightning.decay(dt);
                self.lightning.intensity()
            }
            Element::Fire | Element::Air => 0.0,
            Element::Earth => return,
        };

        let frame = AmbientFrame {
            clock_seconds: now.as_secs_f32(),
            lightning_intensity,
        };
        self.drivers.get_mut(element).feed(&frame);
    }
}
