//! End-of-run report.

use std::fmt;

use elemental_farm_core::{Element, ElementBalance, Event, WeatherState};
use elemental_farm_session::Session;
use elemental_farm_system_bookkeeping::{Quest, Tally, TimeOfDay, GOALS_PER_DAY};
use serde::Serialize;
use tracing::{debug, info};

/// Event counters accumulated while the session ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Counts {
    transitions: u32,
    resolutions: u32,
    lightning_strikes: u32,
    rejections: u32,
    days: u32,
}

impl Counts {
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WeatherTransitionStarted { direction, element } => {
                    self.transitions += 1;
                    debug!(?direction, ?element, "transition started");
                }
                Event::WeatherChanged { from, to } => info!(?from, ?to, "weather changed"),
                Event::WeatherResolved { .. } => self.resolutions += 1,
                Event::LightningStruck { .. } => self.lightning_strikes += 1,
                Event::PlantRejected { .. }
                | Event::HarvestRejected { .. }
                | Event::SoilRestoreRejected { .. } => self.rejections += 1,
                Event::DayStarted { .. } => self.days += 1,
                Event::GoalCompleted { goal, .. } => info!(%goal, "quest completed"),
                _ => {}
            }
        }
    }
}

/// Snapshot of a finished run.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Summary {
    clock: TimeOfDay,
    weather: WeatherState,
    global_balance: ElementBalance,
    today: Tally,
    lifetime: Tally,
    goals: [Quest; GOALS_PER_DAY],
    events: Counts,
}

impl Summary {
    pub(crate) fn capture(session: &Session, events: Counts) -> Self {
        let bookkeeping = session.bookkeeping();
        Self {
            clock: session.time_of_day(),
            weather: session.weather_state(),
            global_balance: session.global_balance(),
            today: *bookkeeping.daily(),
            lifetime: *bookkeeping.lifetime(),
            goals: *bookkeeping.goals(),
            events,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Day {} {:02}:{:02}",
            self.clock.day, self.clock.hours, self.clock.minutes
        )?;
        match self.weather {
            WeatherState::None => writeln!(f, "Weather: clear")?,
            WeatherState::Active(element) => writeln!(f, "Weather: {} event", element.name())?,
        }
        let balance: Vec<String> = self
            .global_balance
            .iter()
            .map(|(element, value)| format!("{} {value}", element.name()))
            .collect();
        writeln!(f, "Balance: {}", balance.join(", "))?;
        writeln!(
            f,
            "Planted {} / harvested {} (lifetime {} / {})",
            self.today.planted(),
            self.today.harvested(),
            self.lifetime.planted(),
            self.lifetime.harvested()
        )?;
        let resolved: Vec<String> = Element::ALL
            .into_iter()
            .map(|element| {
                format!(
                    "{} {}",
                    element.name(),
                    self.lifetime.events_resolved().get(element)
                )
            })
            .collect();
        writeln!(f, "Resolved: {}", resolved.join(", "))?;
        for quest in &self.goals {
            let mark = if quest.completed { 'x' } else { ' ' };
            writeln!(f, "[{mark}] {}", quest.goal)?;
        }
        writeln!(
            f,
            "Quests completed {} (lifetime {})",
            self.today.quests_completed(),
            self.lifetime.quests_completed()
        )?;
        write!(
            f,
            "Transitions {}, lightning strikes {}, rejected actions {}, days started {}",
            self.events.transitions,
            self.events.lightning_strikes,
            self.events.rejections,
            self.events.days
        )
    }
}
