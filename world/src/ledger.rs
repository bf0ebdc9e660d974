//! Global and per-cell element accounting.

use elemental_farm_core::{CellId, ElementBalance, ElementImpact};

/// Farm-wide element ledger together with one soil ledger per cell.
///
/// The global balance always equals the sum of the soil balances. The
/// imbalance denominator is captured once, when the ledger is created, and
/// is never recomputed from the fluctuating balances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    global: ElementBalance,
    soils: Vec<ElementBalance>,
    initial_total: i32,
}

impl Ledger {
    /// Creates a ledger whose global balance is the sum of the provided soils.
    #[must_use]
    pub fn from_soils(soils: Vec<ElementBalance>) -> Self {
        let global = soils
            .iter()
            .fold(ElementBalance::ZERO, |sum, soil| sum.plus(soil));
        Self {
            initial_total: global.total(),
            global,
            soils,
        }
    }

    /// Farm-wide balance.
    #[must_use]
    pub const fn global(&self) -> &ElementBalance {
        &self.global
    }

    /// Soil balance of the provided cell, if it exists.
    #[must_use]
    pub fn soil(&self, cell: CellId) -> Option<&ElementBalance> {
        self.soils.get(slot(cell)?)
    }

    /// Soil balances of every cell in identifier order.
    #[must_use]
    pub fn soils(&self) -> &[ElementBalance] {
        &self.soils
    }

    /// Resource mass captured when the ledger was created.
    #[must_use]
    pub const fn initial_total(&self) -> i32 {
        self.initial_total
    }

    /// Reports whether both the global ledger and `cell_balance` can cover
    /// the impact's consumption without any element dropping below zero.
    #[must_use]
    pub fn can_consume(&self, impact: &ElementImpact, cell_balance: &ElementBalance) -> bool {
        impact.consumes.iter().all(|(element, amount)| {
            self.global.get(element) - amount >= 0 && cell_balance.get(element) - amount >= 0
        })
    }

    /// Removes the impact's consumption from the global and cell ledgers.
    ///
    /// Callers must have validated the request with [`Ledger::can_consume`];
    /// driving any balance negative is a contract violation.
    pub fn apply_plant(&mut self, cell: CellId, impact: &ElementImpact) {
        let Some(soil) = slot(cell).and_then(|index| self.soils.get_mut(index)) else {
            debug_assert!(false, "apply_plant on unknown cell {cell:?}");
            return;
        };
        *soil = soil.minus(&impact.consumes);
        self.global = self.global.minus(&impact.consumes);

        debug_assert!(
            soil.is_non_negative(),
            "soil ledger of {cell:?} went negative: {soil:?}"
        );
        debug_assert!(
            self.global.is_non_negative(),
            "global ledger went negative: {:?}",
            self.global
        );
    }

    /// Adds the impact's returns to the global and cell ledgers.
    pub fn apply_harvest(&mut self, cell: CellId, impact: &ElementImpact) {
        let Some(soil) = slot(cell).and_then(|index| self.soils.get_mut(index)) else {
            debug_assert!(false, "apply_harvest on unknown cell {cell:?}");
            return;
        };
        *soil = soil.plus(&impact.returns);
        self.global = self.global.plus(&impact.returns);
    }

    /// Replaces a cell's soil balance, moving the global ledger by the same delta.
    pub fn restore_soil(&mut self, cell: CellId, balance: ElementBalance) {
        let Some(soil) = slot(cell).and_then(|index| self.soils.get_mut(index)) else {
            debug_assert!(false, "restore_soil on unknown cell {cell:?}");
            return;
        };
        self.global = self.global.minus(soil).plus(&balance);
        *soil = balance;
    }
}

fn slot(cell: CellId) -> Option<usize> {
    usize::try_from(cell.get()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use elemental_farm_core::{Element, PlantCatalog, PlantType, SoilProfile};

    fn two_cell_ledger() -> Ledger {
        Ledger::from_soils(vec![
            SoilProfile::Balanced.starting_balance(),
            SoilProfile::FireHeavy.starting_balance(),
        ])
    }

    #[test]
    fn global_starts_as_sum_of_soils() {
        let ledger = two_cell_ledger();
        assert_eq!(*ledger.global(), ElementBalance::new(12, 9, 10, 9));
        assert_eq!(ledger.initial_total(), 40);
    }

    #[test]
    fn can_consume_accepts_exactly_zero_remaining() {
        let ledger = Ledger::from_soils(vec![ElementBalance::new(2, 0, 3, 0)]);
        let pumpkin = *PlantCatalog::default().impact(PlantType::Pumpkin);
        let cell = *ledger.soil(CellId::new(0)).expect("cell exists");
        assert!(ledger.can_consume(&pumpkin, &cell));

        let short = ElementBalance::new(2, 0, 2, 0);
        assert!(!ledger.can_consume(&pumpkin, &short));
    }

    #[test]
    fn can_consume_checks_global_independently_of_cell() {
        let ledger = Ledger::from_soils(vec![ElementBalance::new(1, 0, 0, 0)]);
        let carrot = *PlantCatalog::default().impact(PlantType::Carrot);
        let generous_cell = ElementBalance::new(10, 10, 10, 10);
        assert!(!ledger.can_consume(&carrot, &generous_cell));
    }

    #[test]
    fn can_consume_boundary_is_exact_for_every_element() {
        for element in Element::ALL {
            for global in 0..=4 {
                for cell in 0..=4 {
                    for amount in 0..=4 {
                        let mut pool = ElementBalance::new(9, 9, 9, 9);
                        pool.set(element, global);
                        let ledger = Ledger::from_soils(vec![pool]);

                        let mut cell_balance = ElementBalance::new(9, 9, 9, 9);
                        cell_balance.set(element, cell);
                        let mut consumes = ElementBalance::ZERO;
                        consumes.set(element, amount);
                        let impact = ElementImpact::new(consumes, ElementBalance::ZERO);

                        assert_eq!(
                            ledger.can_consume(&impact, &cell_balance),
                            amount <= global && amount <= cell,
                            "{element:?} global={global} cell={cell} amount={amount}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn plant_then_harvest_moves_both_ledgers() {
        let mut ledger = two_cell_ledger();
        let catalog = PlantCatalog::default();
        let cell = CellId::new(1);
        let tomato = *catalog.impact(PlantType::Tomato);

        ledger.apply_plant(cell, &tomato);
        assert_eq!(
            ledger.soil(cell).copied(),
            Some(ElementBalance::new(7, 2, 5, 2))
        );

        ledger.apply_harvest(cell, &tomato);
        assert_eq!(
            ledger.soil(cell).copied(),
            Some(ElementBalance::new(11, 2, 5, 2))
        );
        assert_eq!(ledger.global().get(Element::Fire), 16);
        assert_eq!(ledger.initial_total(), 40, "denominator stays frozen");
    }

    #[test]
    fn restore_keeps_global_equal_to_sum_of_soils() {
        let mut ledger = two_cell_ledger();
        let cell = CellId::new(0);
        ledger.restore_soil(cell, SoilProfile::WaterHeavy.starting_balance());

        let sum = ledger
            .soils()
            .iter()
            .fold(ElementBalance::ZERO, |acc, soil| acc.plus(soil));
        assert_eq!(*ledger.global(), sum);
    }
}
