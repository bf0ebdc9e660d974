#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative farm state management for Elemental Farm.

mod ledger;

use std::time::Duration;

use elemental_farm_core::{
    CellId, Command, Event, HarvestError, PlantCatalog, PlantError, PlantType, RestoreError,
    SoilProfile, SoilTone, SOIL_BALANCE_MARGIN,
};
use tracing::{debug, trace};

pub use ledger::Ledger;

/// Number of columns in the default farm layout.
pub const DEFAULT_COLUMNS: u32 = 6;
/// Number of rows in the default farm layout.
pub const DEFAULT_ROWS: u32 = 5;

/// Static rules the world enforces for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Consume and return vectors per plant type.
    pub catalog: PlantCatalog,
    /// Minimum lead the dominant soil element needs to tint a cell.
    pub soil_margin: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            catalog: PlantCatalog::default(),
            soil_margin: SOIL_BALANCE_MARGIN,
        }
    }
}

/// Represents the authoritative Elemental Farm world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    columns: u32,
    rows: u32,
    beds: Vec<Bed>,
    ledger: Ledger,
    onboarding_finished: bool,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world using the default farm layout and rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a world using the default farm layout and the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        let soils = default_soils(DEFAULT_COLUMNS, DEFAULT_ROWS);
        let mut world = Self {
            rules,
            columns: 0,
            rows: 0,
            beds: Vec::new(),
            ledger: Ledger::from_soils(Vec::new()),
            onboarding_finished: false,
            clock: Duration::ZERO,
            tick_index: 0,
        };
        world.lay_out(DEFAULT_COLUMNS, DEFAULT_ROWS, &soils);
        world
    }

    fn lay_out(&mut self, columns: u32, rows: u32, soils: &[SoilProfile]) {
        let count = columns.saturating_mul(rows);
        self.columns = columns;
        self.rows = rows;
        self.beds = (0..count)
            .map(|index| {
                let profile = usize::try_from(index)
                    .ok()
                    .and_then(|index| soils.get(index).copied())
                    .unwrap_or_default();
                Bed::new(profile)
            })
            .collect();
        self.ledger = Ledger::from_soils(
            self.beds
                .iter()
                .map(|bed| bed.profile.starting_balance())
                .collect(),
        );
        self.clock = Duration::ZERO;
        self.tick_index = 0;
    }

    fn bed(&self, cell: CellId) -> Option<&Bed> {
        usize::try_from(cell.get())
            .ok()
            .and_then(|index| self.beds.get(index))
    }

    fn bed_mut(&mut self, cell: CellId) -> Option<&mut Bed> {
        usize::try_from(cell.get())
            .ok()
            .and_then(|index| self.beds.get_mut(index))
    }

    fn publish_soil(&self, cell: CellId, out_events: &mut Vec<Event>) {
        if let Some(balance) = self.ledger.soil(cell) {
            out_events.push(Event::SoilChanged {
                cell,
                balance: *balance,
                tone: SoilTone::classify(balance, self.rules.soil_margin),
            });
        }
        out_events.push(Event::BalanceChanged {
            balance: *self.ledger.global(),
        });
    }

    fn plant(&mut self, cell: CellId, plant: PlantType) -> Result<(), PlantError> {
        let Some(bed) = self.bed(cell) else {
            return Err(PlantError::UnknownCell);
        };
        if bed.crop.is_some() {
            return Err(PlantError::Occupied);
        }
        let impact = *self.rules.catalog.impact(plant);
        let soil = self.ledger.soil(cell).ok_or(PlantError::UnknownCell)?;
        if !self.ledger.can_consume(&impact, soil) {
            return Err(PlantError::Depleted);
        }

        self.ledger.apply_plant(cell, &impact);
        if let Some(bed) = self.bed_mut(cell) {
            bed.crop = Some(plant);
        }
        Ok(())
    }

    fn harvest(&mut self, cell: CellId) -> Result<PlantType, HarvestError> {
        let bed = self.bed_mut(cell).ok_or(HarvestError::UnknownCell)?;
        let plant = bed.crop.take().ok_or(HarvestError::Empty)?;
        let impact = *self.rules.catalog.impact(plant);
        self.ledger.apply_harvest(cell, &impact);
        Ok(plant)
    }

    fn restore(&mut self, cell: CellId) -> Result<(), RestoreError> {
        let bed = self.bed_mut(cell).ok_or(RestoreError::UnknownCell)?;
        if bed.crop.is_some() {
            return Err(RestoreError::Occupied);
        }
        // Re-prepared soil is always balanced, whatever the cell started with.
        bed.profile = SoilProfile::Balanced;
        self.ledger
            .restore_soil(cell, SoilProfile::Balanced.starting_balance());
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureFarm {
            columns,
            rows,
            soils,
        } => {
            world.lay_out(columns, rows, &soils);
            debug!(
                columns,
                rows,
                initial_total = world.ledger.initial_total(),
                "farm configured"
            );
            out_events.push(Event::FarmConfigured {
                cells: columns.saturating_mul(rows),
                initial_total: world.ledger.initial_total(),
            });
            out_events.push(Event::BalanceChanged {
                balance: *world.ledger.global(),
            });
        }
        Command::PlantCrop { cell, plant } => match world.plant(cell, plant) {
            Ok(()) => {
                debug!(cell = cell.get(), plant = plant.name(), "crop planted");
                out_events.push(Event::CropPlanted { cell, plant });
                world.publish_soil(cell, out_events);
            }
            Err(reason) => {
                trace!(cell = cell.get(), plant = plant.name(), %reason, "planting rejected");
                out_events.push(Event::PlantRejected {
                    cell,
                    plant,
                    reason,
                });
            }
        },
        Command::HarvestCrop { cell } => match world.harvest(cell) {
            Ok(plant) => {
                debug!(cell = cell.get(), plant = plant.name(), "crop harvested");
                out_events.push(Event::CropHarvested { cell, plant });
                world.publish_soil(cell, out_events);
            }
            Err(reason) => {
                trace!(cell = cell.get(), %reason, "harvest rejected");
                out_events.push(Event::HarvestRejected { cell, reason });
            }
        },
        Command::RestoreSoil { cell } => match world.restore(cell) {
            Ok(()) => {
                debug!(cell = cell.get(), "soil restored");
                out_events.push(Event::SoilRestored { cell });
                world.publish_soil(cell, out_events);
            }
            Err(reason) => {
                trace!(cell = cell.get(), %reason, "soil restore rejected");
                out_events.push(Event::SoilRestoreRejected { cell, reason });
            }
        },
        Command::FinishOnboarding => {
            if !world.onboarding_finished {
                world.onboarding_finished = true;
                debug!("onboarding finished");
                out_events.push(Event::OnboardingFinished);
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                now: world.clock,
                dt,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Ledger, World};
    use elemental_farm_core::{
        CellId, ElementBalance, PlantCatalog, PlantType, SoilProfile, SoilTone,
    };

    /// Provides read-only access to the global and soil ledgers.
    #[must_use]
    pub fn ledger(world: &World) -> &Ledger {
        &world.ledger
    }

    /// Farm-wide element balance.
    #[must_use]
    pub fn global_balance(world: &World) -> ElementBalance {
        *world.ledger.global()
    }

    /// Soil balance of a single cell, if it exists.
    #[must_use]
    pub fn soil_balance(world: &World, cell: CellId) -> Option<ElementBalance> {
        world.ledger.soil(cell).copied()
    }

    /// Derived soil colour classification of a single cell, if it exists.
    #[must_use]
    pub fn soil_tone(world: &World, cell: CellId) -> Option<SoilTone> {
        world
            .ledger
            .soil(cell)
            .map(|balance| SoilTone::classify(balance, world.rules.soil_margin))
    }

    /// Profile the cell's soil was last prepared with, if the cell exists.
    #[must_use]
    pub fn soil_profile(world: &World, cell: CellId) -> Option<SoilProfile> {
        world.bed(cell).map(|bed| bed.profile)
    }

    /// Crop currently growing on the cell, if any.
    #[must_use]
    pub fn crop(world: &World, cell: CellId) -> Option<PlantType> {
        world.bed(cell).and_then(|bed| bed.crop)
    }

    /// Reports whether planting `plant` on `cell` would currently be accepted.
    #[must_use]
    pub fn can_plant(world: &World, cell: CellId, plant: PlantType) -> bool {
        let Some(bed) = world.bed(cell) else {
            return false;
        };
        let Some(soil) = world.ledger.soil(cell) else {
            return false;
        };
        bed.crop.is_none() && world.ledger.can_consume(world.rules.catalog.impact(plant), soil)
    }

    /// Identifiers of every cell in row-major order.
    pub fn cells(world: &World) -> impl Iterator<Item = CellId> + '_ {
        (0..world.columns.saturating_mul(world.rows)).map(CellId::new)
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// Plant impact table the world enforces.
    #[must_use]
    pub fn catalog(world: &World) -> &PlantCatalog {
        &world.rules.catalog
    }

    /// Reports whether onboarding has been completed.
    #[must_use]
    pub fn onboarding_finished(world: &World) -> bool {
        world.onboarding_finished
    }

    /// Simulated time elapsed since the farm was configured.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed since the farm was configured.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Copy, Debug)]
struct Bed {
    profile: SoilProfile,
    crop: Option<PlantType>,
}

impl Bed {
    const fn new(profile: SoilProfile) -> Self {
        Self {
            profile,
            crop: None,
        }
    }
}

/// Default farm layout: warm soil along the west edge, damp soil along the east edge.
pub fn default_soils(columns: u32, rows: u32) -> Vec<SoilProfile> {
    let last_column = columns.saturating_sub(1);
    (0..rows)
        .flat_map(|_| 0..columns)
        .map(|column| {
            if column == 0 {
                SoilProfile::FireHeavy
            } else if column == last_column {
                SoilProfile::WaterHeavy
            } else {
                SoilProfile::Balanced
            }
        })
        .collect()
}
