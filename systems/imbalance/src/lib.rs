#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides whether a single element dominates the farm.

use elemental_farm_core::{Element, ElementBalance, Event, IMBALANCE_MARGIN};
use tracing::debug;

/// Configuration parameters required to construct the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    margin: i32,
    start_dormant: bool,
}

impl Config {
    /// Creates a new configuration with the provided margin and dormancy.
    ///
    /// A dormant detector ignores balance changes until onboarding finishes.
    #[must_use]
    pub const fn new(margin: i32, start_dormant: bool) -> Self {
        Self {
            margin,
            start_dormant,
        }
    }

    /// Margin above the average share that marks an element as dominant.
    #[must_use]
    pub const fn margin(&self) -> i32 {
        self.margin
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(IMBALANCE_MARGIN, true)
    }
}

/// Outcome of a balance evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The element crossed the imbalance threshold.
    Dominant(Element),
    /// No element crossed the threshold.
    Settled,
}

impl Verdict {
    /// Dominant element, if any.
    #[must_use]
    pub const fn dominant(self) -> Option<Element> {
        match self {
            Self::Dominant(element) => Some(element),
            Self::Settled => None,
        }
    }
}

/// Order in which equally large elements win a dominance check.
pub const TIE_ORDER: [Element; 4] = [Element::Air, Element::Earth, Element::Fire, Element::Water];

/// Largest element of the balance; ties go to the earliest entry of [`TIE_ORDER`].
#[must_use]
pub fn leading(balance: &ElementBalance) -> (Element, i32) {
    TIE_ORDER
        .into_iter()
        .map(|element| (element, balance.get(element)))
        .fold((TIE_ORDER[0], i32::MIN), |best, entry| {
            if entry.1 > best.1 {
                entry
            } else {
                best
            }
        })
}

/// Reports the element whose quantity reaches `initial_total / 4 + margin`.
///
/// The comparison is carried out on integers scaled by four so fractional
/// averages are honoured exactly.
#[must_use]
pub fn check_balances(balance: &ElementBalance, initial_total: i32, margin: i32) -> Option<Element> {
    let (element, value) = leading(balance);
    let scaled_top = i64::from(value) * 4;
    let threshold = i64::from(initial_total) + i64::from(margin) * 4;
    (scaled_top >= threshold).then_some(element)
}

/// Imbalance detector that evaluates the ledger after balance-affecting events.
#[derive(Debug)]
pub struct ImbalanceDetector {
    margin: i32,
    dormant: bool,
    last_verdict: Option<Verdict>,
}

impl ImbalanceDetector {
    /// Creates a new detector using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            margin: config.margin,
            dormant: config.start_dormant,
            last_verdict: None,
        }
    }

    /// Reports whether the detector is waiting for onboarding to finish.
    #[must_use]
    pub fn is_dormant(&self) -> bool {
        self.dormant
    }

    /// Verdict produced by the most recent evaluation, if any.
    #[must_use]
    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    /// Consumes world events and the current global balance.
    ///
    /// Returns a verdict when the batch contained a balance change observed
    /// while awake, or the end of onboarding, and `None` otherwise.
    pub fn handle(
        &mut self,
        events: &[Event],
        balance: &ElementBalance,
        initial_total: i32,
    ) -> Option<Verdict> {
        let mut evaluate = false;
        for event in events {
            match event {
                Event::BalanceChanged { .. } if !self.dormant => evaluate = true,
                Event::OnboardingFinished => {
                    self.dormant = false;
                    evaluate = true;
                }
                _ => {}
            }
        }

        if !evaluate {
            return None;
        }

        let verdict = match check_balances(balance, initial_total, self.margin) {
            Some(element) => Verdict::Dominant(element),
            None => Verdict::Settled,
        };
        if self.last_verdict != Some(verdict) {
            debug!(?verdict, top = ?leading(balance), initial_total, "balance verdict changed");
        }
        self.last_verdict = Some(verdict);
        Some(verdict)
    }
}
