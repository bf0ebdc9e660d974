//! Counters accumulated by the bookkeeping system.

use elemental_farm_core::{Element, PlantType};
use serde::Serialize;

/// Count kept per element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ElementCounts {
    fire: u32,
    water: u32,
    earth: u32,
    air: u32,
}

impl ElementCounts {
    /// Count recorded for the element.
    #[must_use]
    pub const fn get(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Air => self.air,
        }
    }

    fn bump(&mut self, element: Element) {
        let slot = match element {
            Element::Fire => &mut self.fire,
            Element::Water => &mut self.water,
            Element::Earth => &mut self.earth,
            Element::Air => &mut self.air,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Count kept per crop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlantCounts {
    pumpkin: u32,
    potato: u32,
    carrot: u32,
    tomato: u32,
}

impl PlantCounts {
    /// Count recorded for the crop.
    #[must_use]
    pub const fn get(&self, plant: PlantType) -> u32 {
        match plant {
            PlantType::Pumpkin => self.pumpkin,
            PlantType::Potato => self.potato,
            PlantType::Carrot => self.carrot,
            PlantType::Tomato => self.tomato,
        }
    }

    fn bump(&mut self, plant: PlantType) {
        let slot = match plant {
            PlantType::Pumpkin => &mut self.pumpkin,
            PlantType::Potato => &mut self.potato,
            PlantType::Carrot => &mut self.carrot,
            PlantType::Tomato => &mut self.tomato,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Progress counters consulted by goal checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    planted: u32,
    harvested: u32,
    elemental_planted: ElementCounts,
    events_resolved: ElementCounts,
    plants_harvested: PlantCounts,
    quests_completed: u32,
}

impl Tally {
    /// Number of crops planted.
    #[must_use]
    pub const fn planted(&self) -> u32 {
        self.planted
    }

    /// Number of crops harvested.
    #[must_use]
    pub const fn harvested(&self) -> u32 {
        self.harvested
    }

    /// Plantings grouped by the element each crop is affine to.
    #[must_use]
    pub const fn elemental_planted(&self) -> &ElementCounts {
        &self.elemental_planted
    }

    /// Weather events resolved after onboarding, grouped by element.
    #[must_use]
    pub const fn events_resolved(&self) -> &ElementCounts {
        &self.events_resolved
    }

    /// Harvests grouped by crop.
    #[must_use]
    pub const fn plants_harvested(&self) -> &PlantCounts {
        &self.plants_harvested
    }

    /// Daily goals met.
    #[must_use]
    pub const fn quests_completed(&self) -> u32 {
        self.quests_completed
    }

    pub(crate) fn record_planted(&mut self, plant: PlantType) {
        self.planted = self.planted.saturating_add(1);
        self.elemental_planted.bump(plant.affinity());
    }

    pub(crate) fn record_harvested(&mut self, plant: PlantType) {
        self.harvested = self.harvested.saturating_add(1);
        self.plants_harvested.bump(plant);
    }

    pub(crate) fn record_resolved(&mut self, element: Element) {
        self.events_resolved.bump(element);
    }

    pub(crate) fn record_quest_completed(&mut self) {
        self.quests_completed = self.quests_completed.saturating_add(1);
    }
}
