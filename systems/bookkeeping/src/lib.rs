#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Daily and lifetime progress counters, daily goals and the day clock.

mod goals;
mod tally;

use std::time::Duration;

use elemental_farm_core::Event;
use serde::Serialize;
use tracing::{debug, info};

pub use goals::{Quest, FIRST_DAY_GOALS, GOALS_PER_DAY, GOAL_POOL};
pub use tally::{ElementCounts, PlantCounts, Tally};

use goals::DailyGoals;

/// Length of one in-game day.
pub const DEFAULT_DAY_LENGTH: Duration = Duration::from_secs(60);

/// Configuration parameters required to construct the bookkeeping system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    day_length: Duration,
    goal_seed: u64,
}

impl Config {
    /// Creates a configuration with the provided day length.
    ///
    /// A zero day length disables the day clock; the first day never ends.
    #[must_use]
    pub const fn new(day_length: Duration) -> Self {
        Self {
            day_length,
            goal_seed: 0,
        }
    }

    /// Seeds the stream that draws each new day's goals.
    #[must_use]
    pub const fn with_goal_seed(mut self, seed: u64) -> Self {
        self.goal_seed = seed;
        self
    }

    /// Length of one in-game day.
    #[must_use]
    pub const fn day_length(&self) -> Duration {
        self.day_length
    }

    /// Seed of the daily goal draw.
    #[must_use]
    pub const fn goal_seed(&self) -> u64 {
        self.goal_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_LENGTH)
    }
}

/// Position of the simulation clock within the in-game day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimeOfDay {
    /// One-based index of the current day.
    pub day: u32,
    /// Hour on a 24 hour dial.
    pub hours: u32,
    /// Minute within the hour.
    pub minutes: u32,
    /// Fraction of the day that has passed, in `0.0..1.0`.
    pub progress: f32,
}

/// Maps a simulation clock reading onto the in-game day.
#[must_use]
pub fn time_of_day(clock: Duration, day_length: Duration) -> TimeOfDay {
    let day_ms = day_length.as_millis();
    let clock_ms = clock.as_millis();
    let Some(within) = clock_ms.checked_rem(day_ms) else {
        return TimeOfDay {
            day: 1,
            hours: 0,
            minutes: 0,
            progress: 0.0,
        };
    };

    let minute_of_day = within * 24 * 60 / day_ms;
    TimeOfDay {
        day: u32::try_from(clock_ms / day_ms + 1).unwrap_or(u32::MAX),
        hours: u32::try_from(minute_of_day / 60).unwrap_or(0),
        minutes: u32::try_from(minute_of_day % 60).unwrap_or(0),
        progress: (within as f64 / day_ms as f64) as f32,
    }
}

/// Pure system that counts plantings, harvests and resolved weather events
/// and marks the day's goals as they are met.
///
/// Goals are evaluated on [`Event::GoalCheckRequested`] once onboarding has
/// finished; requests seen earlier are ignored.
#[derive(Debug)]
pub struct Bookkeeping {
    day_length: Duration,
    clock: Duration,
    day: u32,
    daily: Tally,
    lifetime: Tally,
    goals: DailyGoals,
    onboarding_finished: bool,
}

impl Bookkeeping {
    /// Creates a bookkeeping system positioned at the start of day one.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            day_length: config.day_length,
            clock: Duration::ZERO,
            day: 1,
            daily: Tally::default(),
            lifetime: Tally::default(),
            goals: DailyGoals::new(config.goal_seed),
            onboarding_finished: false,
        }
    }

    /// Goals of the current day in display order.
    #[must_use]
    pub fn goals(&self) -> &[Quest; GOALS_PER_DAY] {
        self.goals.quests()
    }

    /// Counters accumulated since the current day began.
    #[must_use]
    pub fn daily(&self) -> &Tally {
        &self.daily
    }

    /// Counters accumulated since the session began.
    #[must_use]
    pub fn lifetime(&self) -> &Tally {
        &self.lifetime
    }

    /// One-based index of the current day.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Position of the last observed clock reading within the day.
    #[must_use]
    pub fn time_of_day(&self) -> TimeOfDay {
        time_of_day(self.clock, self.day_length)
    }

    /// Consumes world and weather events.
    ///
    /// Emits [`Event::DayStarted`] and [`Event::GoalsRefreshed`] on rollover
    /// and [`Event::GoalCompleted`] for goals met at a goal check.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::CropPlanted { plant, .. } => {
                    self.daily.record_planted(*plant);
                    self.lifetime.record_planted(*plant);
                }
                Event::CropHarvested { plant, .. } => {
                    self.daily.record_harvested(*plant);
                    self.lifetime.record_harvested(*plant);
                }
                Event::WeatherResolved { element } => {
                    self.daily.record_resolved(*element);
                    self.lifetime.record_resolved(*element);
                    debug!(?element, "resolution counted");
                }
                Event::OnboardingFinished => self.onboarding_finished = true,
                Event::GoalCheckRequested if self.onboarding_finished => self.check_goals(out),
                Event::TimeAdvanced { now, .. } => self.advance_clock(*now, out),
                _ => {}
            }
        }
    }

    fn advance_clock(&mut self, now: Duration, out: &mut Vec<Event>) {
        self.clock = now;
        let current = time_of_day(now, self.day_length).day;
        while self.day < current {
            self.day += 1;
            self.daily = Tally::default();
            info!(day = self.day, "new day");
            out.push(Event::DayStarted { day: self.day });

            let goals = self.goals.refresh();
            debug!(?goals, "goals refreshed");
            out.push(Event::GoalsRefreshed { goals });
        }
    }

    fn check_goals(&mut self, out: &mut Vec<Event>) {
        for (slot, goal) in self.goals.evaluate(&self.daily) {
            self.daily.record_quest_completed();
            self.lifetime.record_quest_completed();
            info!(%goal, "quest completed");
            out.push(Event::GoalCompleted { slot, goal });
        }
    }
}
