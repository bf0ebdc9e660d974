#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Elemental Farm engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values. Systems
//! consume event streams and read-only ledger views; the weather controller
//! additionally publishes its own transition events into the same stream.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Margin above the average share of the initial resource mass at which a
/// single element is considered dominant.
pub const IMBALANCE_MARGIN: i32 = 15;

/// Minimum gap between the two largest soil entries for a cell to be tinted
/// by its dominant element.
pub const SOIL_BALANCE_MARGIN: i32 = 2;

/// One of the four resource categories tracked by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Heat; dominance triggers a heatwave.
    Fire,
    /// Moisture; dominance triggers a storm.
    Water,
    /// Soil richness; dominance triggers overgrowth.
    Earth,
    /// Wind; dominance triggers gusts.
    Air,
}

impl Element {
    /// Every element in ledger order.
    pub const ALL: [Element; 4] = [Element::Fire, Element::Water, Element::Earth, Element::Air];

    /// Lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Earth => "earth",
            Self::Air => "air",
        }
    }

    /// Position of the element within [`Element::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Fire => 0,
            Self::Water => 1,
            Self::Earth => 2,
            Self::Air => 3,
        }
    }
}

/// Quantity of each element held by a ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementBalance {
    fire: i32,
    water: i32,
    earth: i32,
    air: i32,
}

impl ElementBalance {
    /// Balance with every element at zero.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a balance from explicit per-element quantities.
    #[must_use]
    pub const fn new(fire: i32, water: i32, earth: i32, air: i32) -> Self {
        Self {
            fire,
            water,
            earth,
            air,
        }
    }

    /// Quantity stored for the provided element.
    #[must_use]
    pub const fn get(&self, element: Element) -> i32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Air => self.air,
        }
    }

    /// Overwrites the quantity stored for the provided element.
    pub fn set(&mut self, element: Element, value: i32) {
        *self.slot(element) = value;
    }

    /// Iterates `(element, quantity)` pairs in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, i32)> + '_ {
        Element::ALL
            .into_iter()
            .map(move |element| (element, self.get(element)))
    }

    /// Sum of all four quantities.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.fire + self.water + self.earth + self.air
    }

    /// Reports whether every quantity is zero or above.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.iter().all(|(_, value)| value >= 0)
    }

    /// Entries sorted by descending quantity; ties keep ledger order.
    #[must_use]
    pub fn ranked(&self) -> [(Element, i32); 4] {
        let mut entries = Element::ALL.map(|element| (element, self.get(element)));
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Returns a balance with `other` added element-wise.
    #[must_use]
    pub fn plus(&self, other: &ElementBalance) -> Self {
        Self::new(
            self.fire + other.fire,
            self.water + other.water,
            self.earth + other.earth,
            self.air + other.air,
        )
    }

    /// Returns a balance with `other` subtracted element-wise.
    #[must_use]
    pub fn minus(&self, other: &ElementBalance) -> Self {
        Self::new(
            self.fire - other.fire,
            self.water - other.water,
            self.earth - other.earth,
            self.air - other.air,
        )
    }

    fn slot(&mut self, element: Element) -> &mut i32 {
        match element {
            Element::Fire => &mut self.fire,
            Element::Water => &mut self.water,
            Element::Earth => &mut self.earth,
            Element::Air => &mut self.air,
        }
    }
}

/// Crops that can be planted on a farm cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    /// Pumpkin seeds; counted as a water planting.
    Pumpkin,
    /// Potato seeds; counted as an earth planting.
    Potato,
    /// Carrot seeds; counted as an air planting.
    Carrot,
    /// Tomato seeds; counted as a fire planting.
    Tomato,
}

impl PlantType {
    /// Every plant type in catalog order.
    pub const ALL: [PlantType; 4] = [
        PlantType::Pumpkin,
        PlantType::Potato,
        PlantType::Carrot,
        PlantType::Tomato,
    ];

    /// Element the plant is credited to when tallying plantings.
    #[must_use]
    pub const fn affinity(self) -> Element {
        match self {
            Self::Pumpkin => Element::Water,
            Self::Potato => Element::Earth,
            Self::Carrot => Element::Air,
            Self::Tomato => Element::Fire,
        }
    }

    /// Lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pumpkin => "pumpkin",
            Self::Potato => "potato",
            Self::Carrot => "carrot",
            Self::Tomato => "tomato",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Pumpkin => 0,
            Self::Potato => 1,
            Self::Carrot => 2,
            Self::Tomato => 3,
        }
    }
}

/// Elements a plant draws from the soil when planted and gives back when harvested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementImpact {
    /// Quantities removed from the global and soil ledgers on planting.
    pub consumes: ElementBalance,
    /// Quantities added to the global and soil ledgers on harvest.
    pub returns: ElementBalance,
}

impl ElementImpact {
    /// Creates an impact from its consume and return vectors.
    #[must_use]
    pub const fn new(consumes: ElementBalance, returns: ElementBalance) -> Self {
        Self { consumes, returns }
    }
}

/// Static per-plant impact table for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlantCatalog {
    impacts: [ElementImpact; 4],
}

impl PlantCatalog {
    /// Impact applied by the provided plant type.
    #[must_use]
    pub const fn impact(&self, plant: PlantType) -> &ElementImpact {
        &self.impacts[plant.index()]
    }

    /// Replaces the impact associated with a plant type.
    #[must_use]
    pub fn with_impact(mut self, plant: PlantType, impact: ElementImpact) -> Self {
        self.impacts[plant.index()] = impact;
        self
    }
}

impl Default for PlantCatalog {
    fn default() -> Self {
        Self {
            impacts: [
                ElementImpact::new(
                    ElementBalance::new(2, 0, 3, 0),
                    ElementBalance::new(0, 4, 0, 0),
                ),
                ElementImpact::new(
                    ElementBalance::new(0, 3, 0, 2),
                    ElementBalance::new(4, 0, 0, 0),
                ),
                ElementImpact::new(
                    ElementBalance::new(3, 2, 0, 0),
                    ElementBalance::new(0, 0, 0, 4),
                ),
                ElementImpact::new(
                    ElementBalance::new(0, 2, 0, 2),
                    ElementBalance::new(4, 0, 0, 0),
                ),
            ],
        }
    }
}

/// Unique identifier of a farm cell, assigned in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Soil composition a cell starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilProfile {
    /// Even soil with five of every element.
    #[default]
    Balanced,
    /// Warm soil leaning toward fire.
    FireHeavy,
    /// Damp soil leaning toward water.
    WaterHeavy,
}

impl SoilProfile {
    /// Soil balance a freshly prepared cell of this profile holds.
    #[must_use]
    pub const fn starting_balance(self) -> ElementBalance {
        match self {
            Self::Balanced => ElementBalance::new(5, 5, 5, 5),
            Self::FireHeavy => ElementBalance::new(7, 4, 5, 4),
            Self::WaterHeavy => ElementBalance::new(4, 7, 4, 5),
        }
    }
}

/// Derived visual classification of a soil balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilTone {
    /// No element leads by the configured margin; default soil colour.
    Balanced,
    /// The element leads the runner-up by at least the configured margin.
    Dominant(Element),
}

impl SoilTone {
    /// Classifies a soil balance by the gap between its two largest entries.
    #[must_use]
    pub fn classify(balance: &ElementBalance, margin: i32) -> Self {
        let ranked = balance.ranked();
        let (top_element, top_value) = ranked[0];
        if top_value - ranked[1].1 < margin {
            Self::Balanced
        } else {
            Self::Dominant(top_element)
        }
    }
}

/// Weather effect currently owned by the weather controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherState {
    /// Clear skies; no effect is shown.
    #[default]
    None,
    /// The effect associated with the element is shown.
    Active(Element),
}

impl WeatherState {
    /// Element whose effect is active, if any.
    #[must_use]
    pub const fn element(self) -> Option<Element> {
        match self {
            Self::None => None,
            Self::Active(element) => Some(element),
        }
    }

    /// Legacy per-effect flag view of the state.
    #[must_use]
    pub const fn flags(self) -> WeatherFlags {
        let element = self.element();
        WeatherFlags {
            heat_wave: matches!(element, Some(Element::Fire)),
            storming: matches!(element, Some(Element::Water)),
            windy: matches!(element, Some(Element::Air)),
            overgrown: matches!(element, Some(Element::Earth)),
        }
    }
}

/// Per-effect boolean view of a [`WeatherState`]; at most one flag is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherFlags {
    /// Fire effect is active.
    pub heat_wave: bool,
    /// Water effect is active.
    pub storming: bool,
    /// Air effect is active.
    pub windy: bool,
    /// Earth effect is active.
    pub overgrown: bool,
}

/// Direction of a weather transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionDirection {
    /// Fade an effect in.
    Start,
    /// Fade an effect out.
    Stop,
}

/// Unit of work queued on the weather controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionRequest {
    direction: TransitionDirection,
    element: Option<Element>,
    clear_only: bool,
}

impl TransitionRequest {
    /// Requests that the element's effect fades in.
    #[must_use]
    pub const fn start(element: Element) -> Self {
        Self {
            direction: TransitionDirection::Start,
            element: Some(element),
            clear_only: false,
        }
    }

    /// Requests that the element's effect fades out.
    #[must_use]
    pub const fn stop(element: Element) -> Self {
        Self {
            direction: TransitionDirection::Stop,
            element: Some(element),
            clear_only: false,
        }
    }

    /// Requests that whichever effect is active when drained fades out.
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            direction: TransitionDirection::Stop,
            element: None,
            clear_only: true,
        }
    }

    /// Direction of the requested transition.
    #[must_use]
    pub const fn direction(&self) -> TransitionDirection {
        self.direction
    }

    /// Element named by the request; `None` for clear-only requests.
    #[must_use]
    pub const fn element(&self) -> Option<Element> {
        self.element
    }

    /// Whether the element is resolved from the active state when drained.
    #[must_use]
    pub const fn is_clear_only(&self) -> bool {
        self.clear_only
    }
}

/// Reasons a planting request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlantError {
    /// No cell with the provided identifier exists.
    #[error("no such farm cell")]
    UnknownCell,
    /// The cell already holds a crop.
    #[error("cell already holds a crop")]
    Occupied,
    /// The global or soil ledger cannot cover the plant's consumption.
    #[error("not enough elements left to plant")]
    Depleted,
}

/// Reasons a harvest request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum HarvestError {
    /// No cell with the provided identifier exists.
    #[error("no such farm cell")]
    UnknownCell,
    /// The cell holds no crop.
    #[error("cell holds no crop")]
    Empty,
}

/// Reasons a soil restoration request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RestoreError {
    /// No cell with the provided identifier exists.
    #[error("no such farm cell")]
    UnknownCell,
    /// The cell holds a crop and cannot be re-prepared.
    #[error("cell holds a crop")]
    Occupied,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Lays out the farm grid and resets every ledger.
    ConfigureFarm {
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
        /// Soil profile per cell in row-major order; missing entries are balanced.
        soils: Vec<SoilProfile>,
    },
    /// Requests planting a crop on a cell.
    PlantCrop {
        /// Cell receiving the crop.
        cell: CellId,
        /// Crop to plant.
        plant: PlantType,
    },
    /// Requests harvesting the crop growing on a cell.
    HarvestCrop {
        /// Cell holding the crop.
        cell: CellId,
    },
    /// Requests resetting an empty cell's soil to the balanced profile.
    RestoreSoil {
        /// Cell to re-prepare.
        cell: CellId,
    },
    /// Marks the onboarding phase as complete.
    FinishOnboarding,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Daily objective measured against the day's progress counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Goal {
    /// Harvest at least `count` crops.
    Harvest {
        /// Harvests required.
        count: u32,
    },
    /// Plant at least `count` crops.
    Plant {
        /// Plantings required.
        count: u32,
    },
    /// Clear one weather event of the element after onboarding.
    Resolve {
        /// Element whose event must be resolved.
        element: Element,
    },
    /// Plant at least `count` crops affine to the element.
    Grow {
        /// Affinity the crops must have.
        element: Element,
        /// Plantings required.
        count: u32,
    },
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Harvest { count } => write!(f, "Harvest {count} plants"),
            Self::Plant { count } => write!(f, "Plant {count} seeds"),
            Self::Resolve { element } => {
                write!(f, "Resolve a {} imbalance event", element.name())
            }
            Self::Grow { element, count } => {
                write!(f, "Grow at least {count} {} plants", element.name())
            }
        }
    }
}

/// Events broadcast by the world and the weather controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms the farm was laid out.
    FarmConfigured {
        /// Number of cells in the farm.
        cells: u32,
        /// Resource mass captured as the fixed imbalance denominator.
        initial_total: i32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated time elapsed since the farm was configured.
        now: Duration,
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms a crop was planted.
    CropPlanted {
        /// Cell that received the crop.
        cell: CellId,
        /// Crop that was planted.
        plant: PlantType,
    },
    /// Reports that a planting request was rejected.
    PlantRejected {
        /// Cell named by the request.
        cell: CellId,
        /// Crop named by the request.
        plant: PlantType,
        /// Specific reason the planting failed.
        reason: PlantError,
    },
    /// Confirms a crop was harvested.
    CropHarvested {
        /// Cell the crop was removed from.
        cell: CellId,
        /// Crop that was harvested.
        plant: PlantType,
    },
    /// Reports that a harvest request was rejected.
    HarvestRejected {
        /// Cell named by the request.
        cell: CellId,
        /// Specific reason the harvest failed.
        reason: HarvestError,
    },
    /// Publishes a cell's soil balance after it changed.
    SoilChanged {
        /// Cell whose soil changed.
        cell: CellId,
        /// Soil balance after the change.
        balance: ElementBalance,
        /// Classification derived from the new balance.
        tone: SoilTone,
    },
    /// Publishes the global ledger after it changed.
    BalanceChanged {
        /// Global balance after the change.
        balance: ElementBalance,
    },
    /// Confirms an empty cell's soil was reset to the balanced profile.
    SoilRestored {
        /// Cell that was re-prepared.
        cell: CellId,
    },
    /// Reports that a soil restoration request was rejected.
    SoilRestoreRejected {
        /// Cell named by the request.
        cell: CellId,
        /// Specific reason the restoration failed.
        reason: RestoreError,
    },
    /// Announces the end of onboarding.
    OnboardingFinished,
    /// A start or stop animation began on an effect driver.
    WeatherTransitionStarted {
        /// Direction of the animation.
        direction: TransitionDirection,
        /// Element whose driver is animating.
        element: Element,
    },
    /// A start or stop animation reported completion.
    WeatherTransitionCompleted {
        /// Direction of the animation.
        direction: TransitionDirection,
        /// Element whose driver finished.
        element: Element,
    },
    /// The controller's weather state changed.
    WeatherChanged {
        /// State before the change.
        from: WeatherState,
        /// State after the change.
        to: WeatherState,
    },
    /// A lightning flash began during a storm.
    LightningStruck {
        /// Simulation time of the flash.
        at: Duration,
    },
    /// A weather event was cleared after onboarding.
    WeatherResolved {
        /// Element whose effect was cleared.
        element: Element,
    },
    /// Goal progress should be re-evaluated.
    GoalCheckRequested,
    /// The day clock rolled over.
    DayStarted {
        /// One-based index of the new day.
        day: u32,
    },
    /// A fresh set of daily goals replaced the previous day's.
    GoalsRefreshed {
        /// Goals of the new day in display order.
        goals: [Goal; 3],
    },
    /// A daily goal was met for the first time.
    GoalCompleted {
        /// Position of the goal in the day's list.
        slot: usize,
        /// Goal that was met.
        goal: Goal,
    },
}
