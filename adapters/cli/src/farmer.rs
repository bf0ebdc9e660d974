//! Scripted farmer that works the beds in row-major order.

use elemental_farm_core::{CellId, PlantError, PlantType};
use elemental_farm_session::Session;
use elemental_farm_world::query;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Crop selection policy of the farmer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Cycles through every crop in catalog order.
    Rotate,
    /// Draws crops from a seeded random stream.
    Random,
    /// Always plants the same crop.
    Only(PlantType),
}

/// Visits one bed per call: harvests grown crops, plants empty beds and
/// re-prepares depleted soil.
#[derive(Debug)]
pub(crate) struct Farmer {
    strategy: Strategy,
    cursor: u32,
    rotation: usize,
    rng: ChaCha8Rng,
}

impl Farmer {
    pub(crate) fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            strategy,
            cursor: 0,
            rotation: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn work(&mut self, session: &mut Session) {
        let (columns, rows) = query::dimensions(session.world());
        let cells = columns.saturating_mul(rows);
        if cells == 0 {
            return;
        }
        let cell = CellId::new(self.cursor % cells);
        self.cursor = self.cursor.wrapping_add(1);

        if query::crop(session.world(), cell).is_some() {
            if let Err(reason) = session.on_harvest(cell) {
                debug!(cell = cell.get(), %reason, "harvest failed");
            }
            return;
        }

        let plant = self.next_crop();
        match session.on_plant(plant, cell) {
            Ok(()) => {}
            Err(PlantError::Depleted) => {
                if session.restore_soil(cell).is_ok() {
                    if let Err(reason) = session.on_plant(plant, cell) {
                        debug!(cell = cell.get(), %reason, "planting failed after restoring soil");
                    }
                }
            }
            Err(reason) => debug!(cell = cell.get(), %reason, "planting failed"),
        }
    }

    fn next_crop(&mut self) -> PlantType {
        match self.strategy {
            Strategy::Rotate => {
                let plant = PlantType::ALL[self.rotation % PlantType::ALL.len()];
                self.rotation = self.rotation.wrapping_add(1);
                plant
            }
            Strategy::Random => PlantType::ALL[self.rng.gen_range(0..PlantType::ALL.len())],
            Strategy::Only(plant) => plant,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use elemental_farm_core::{Element, Event, TransitionDirection};
    use elemental_farm_session::{FarmConfig, FarmSection};

    use super::*;

    fn session() -> Session {
        let config = FarmConfig {
            farm: FarmSection {
                skip_onboarding: true,
                ..FarmSection::default()
            },
            ..FarmConfig::default()
        };
        Session::new(&config).expect("session")
    }

    #[test]
    fn rotation_cycles_through_the_catalog() {
        let mut farmer = Farmer::new(Strategy::Rotate, 0);
        let crops: Vec<_> = (0..5).map(|_| farmer.next_crop()).collect();
        assert_eq!(
            crops,
            vec![
                PlantType::Pumpkin,
                PlantType::Potato,
                PlantType::Carrot,
                PlantType::Tomato,
                PlantType::Pumpkin,
            ]
        );
    }

    #[test]
    fn first_pass_plants_every_bed() {
        let mut session = session();
        let mut farmer = Farmer::new(Strategy::Random, 5);
        for _ in 0..30 {
            farmer.work(&mut session);
        }
        let world = session.world();
        assert!(query::cells(world).all(|cell| query::crop(world, cell).is_some()));
    }

    #[test]
    fn tomato_monoculture_brings_a_heatwave() {
        let mut session = session();
        let mut farmer = Farmer::new(Strategy::Only(PlantType::Tomato), 0);
        let mut log = Vec::new();
        for _ in 0..120 {
            farmer.work(&mut session);
            session.tick(Duration::from_millis(100));
            log.extend(session.drain_events());
        }
        assert!(log.contains(&Event::WeatherTransitionStarted {
            direction: TransitionDirection::Start,
            element: Element::Fire,
        }));
    }
}
