#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One farming session: the world, its systems and the outbound event log.
//!
//! A [`Session`] owns every piece of mutable game state, so independent
//! sessions never share anything and can run side by side.

mod config;

use std::{mem, time::Duration};

use elemental_farm_core::{
    CellId, Command, Element, ElementBalance, Event, HarvestError, PlantError, PlantType,
    RestoreError, WeatherState,
};
use elemental_farm_effects::standard_drivers;
use elemental_farm_system_bookkeeping::{Bookkeeping, TimeOfDay};
use elemental_farm_system_imbalance::ImbalanceDetector;
use elemental_farm_system_weather::{DriverSetError, EffectDrivers, WeatherController};
use elemental_farm_world::{self as world, query, World};
use tracing::info;

pub use config::{
    BookkeepingSection, ConfigError, FarmConfig, FarmSection, PlantSection, ThresholdSection,
    WeatherSection, MAX_CELLS,
};

/// Errors raised while assembling a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The effect driver table is incomplete.
    #[error(transparent)]
    Drivers(#[from] DriverSetError),
}

/// Simulation context tying a world to its detector, weather and bookkeeping.
#[derive(Debug)]
pub struct Session {
    world: World,
    detector: ImbalanceDetector,
    weather: WeatherController,
    bookkeeping: Bookkeeping,
    log: Vec<Event>,
}

impl Session {
    /// Creates a session presented by the standard effect drivers.
    pub fn new(config: &FarmConfig) -> Result<Self, SessionError> {
        Self::with_drivers(config, standard_drivers()?)
    }

    /// Creates a session presented by the provided effect drivers.
    pub fn with_drivers(config: &FarmConfig, drivers: EffectDrivers) -> Result<Self, SessionError> {
        config.validate()?;

        let mut session = Self {
            world: World::with_rules(config.rules()),
            detector: ImbalanceDetector::new(config.detector_config()),
            weather: WeatherController::new(config.weather_config(), drivers),
            bookkeeping: Bookkeeping::new(config.bookkeeping_config()),
            log: Vec::new(),
        };
        let _ = session.dispatch(Command::ConfigureFarm {
            columns: config.farm.columns,
            rows: config.farm.rows,
            soils: config.soils(),
        });
        if config.farm.skip_onboarding {
            session.finish_onboarding();
        }

        info!(
            columns = config.farm.columns,
            rows = config.farm.rows,
            initial_total = query::ledger(&session.world).initial_total(),
            "session ready"
        );
        Ok(session)
    }

    /// Plants a crop on the provided cell.
    pub fn on_plant(&mut self, plant: PlantType, cell: CellId) -> Result<(), PlantError> {
        let events = self.dispatch(Command::PlantCrop { cell, plant });
        match events.iter().find_map(|event| match event {
            Event::PlantRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Harvests the crop growing on the provided cell.
    pub fn on_harvest(&mut self, cell: CellId) -> Result<PlantType, HarvestError> {
        let events = self.dispatch(Command::HarvestCrop { cell });
        events
            .iter()
            .find_map(|event| match event {
                Event::CropHarvested { plant, .. } => Some(Ok(*plant)),
                Event::HarvestRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(HarvestError::UnknownCell))
    }

    /// Resets an empty cell's soil to the balanced profile.
    ///
    /// Heavy starting soils are not brought back; a restored cell is balanced.
    pub fn restore_soil(&mut self, cell: CellId) -> Result<(), RestoreError> {
        let events = self.dispatch(Command::RestoreSoil { cell });
        match events.iter().find_map(|event| match event {
            Event::SoilRestoreRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Ends onboarding; from now on clearances count as resolutions.
    pub fn finish_onboarding(&mut self) {
        let _ = self.dispatch(Command::FinishOnboarding);
    }

    /// Shows an element's effect outside of imbalance detection.
    pub fn showcase(&mut self, element: Element) {
        let mut out = Vec::new();
        self.weather.request(Some(element), &mut out);
        self.log.extend(out);
    }

    /// Clears whatever effect is showing or about to show.
    pub fn clear_showcase(&mut self) {
        let mut out = Vec::new();
        self.weather.request(None, &mut out);
        self.log.extend(out);
    }

    /// Advances the simulation clock.
    pub fn tick(&mut self, dt: Duration) {
        let _ = self.dispatch(Command::Tick { dt });
    }

    /// Takes every event recorded since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.log)
    }

    /// Authoritative farm state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Weather controller of the session.
    #[must_use]
    pub fn weather(&self) -> &WeatherController {
        &self.weather
    }

    /// Imbalance detector of the session.
    #[must_use]
    pub fn detector(&self) -> &ImbalanceDetector {
        &self.detector
    }

    /// Progress counters of the session.
    #[must_use]
    pub fn bookkeeping(&self) -> &Bookkeeping {
        &self.bookkeeping
    }

    /// Committed weather state.
    #[must_use]
    pub fn weather_state(&self) -> WeatherState {
        self.weather.state()
    }

    /// Farm-wide element balance.
    #[must_use]
    pub fn global_balance(&self) -> ElementBalance {
        query::global_balance(&self.world)
    }

    /// Position of the simulation clock within the in-game day.
    #[must_use]
    pub fn time_of_day(&self) -> TimeOfDay {
        self.bookkeeping.time_of_day()
    }

    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut world_events = Vec::new();
        world::apply(&mut self.world, command, &mut world_events);

        let ledger = query::ledger(&self.world);
        let verdict = self
            .detector
            .handle(&world_events, ledger.global(), ledger.initial_total());

        let mut weather_events = Vec::new();
        self.weather.handle(&world_events, &mut weather_events);
        if let Some(verdict) = verdict {
            self.weather.request(verdict.dominant(), &mut weather_events);
        }

        let mut day_events = Vec::new();
        self.bookkeeping.handle(&world_events, &mut day_events);
        self.bookkeeping.handle(&weather_events, &mut day_events);

        self.log.extend(world_events.iter().cloned());
        self.log.extend(weather_events);
        self.log.extend(day_events);
        world_events
    }
}
