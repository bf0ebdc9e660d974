//! Daily goals drawn from a fixed pool.

use elemental_farm_core::{Element, Goal};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::Tally;

/// Number of goals offered each day.
pub const GOALS_PER_DAY: usize = 3;

/// Every goal a day can offer.
pub const GOAL_POOL: [Goal; 10] = [
    Goal::Harvest { count: 20 },
    Goal::Plant { count: 20 },
    Goal::Resolve {
        element: Element::Fire,
    },
    Goal::Resolve {
        element: Element::Water,
    },
    Goal::Resolve {
        element: Element::Air,
    },
    Goal::Resolve {
        element: Element::Earth,
    },
    Goal::Grow {
        element: Element::Air,
        count: 10,
    },
    Goal::Grow {
        element: Element::Fire,
        count: 10,
    },
    Goal::Grow {
        element: Element::Water,
        count: 10,
    },
    Goal::Grow {
        element: Element::Earth,
        count: 10,
    },
];

/// Goals offered on the first day.
pub const FIRST_DAY_GOALS: [Goal; GOALS_PER_DAY] = [GOAL_POOL[0], GOAL_POOL[1], GOAL_POOL[9]];

/// Goal together with its completion mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Quest {
    /// Objective of the quest.
    pub goal: Goal,
    /// Whether the goal was met today.
    pub completed: bool,
}

impl Quest {
    const fn open(goal: Goal) -> Self {
        Self {
            goal,
            completed: false,
        }
    }
}

impl Tally {
    /// Reports whether the counters satisfy the goal.
    #[must_use]
    pub fn satisfies(&self, goal: Goal) -> bool {
        match goal {
            Goal::Harvest { count } => self.harvested() >= count,
            Goal::Plant { count } => self.planted() >= count,
            Goal::Resolve { element } => self.events_resolved().get(element) >= 1,
            Goal::Grow { element, count } => self.elemental_planted().get(element) >= count,
        }
    }
}

/// Goals of the current day and the seeded stream that picks the next ones.
#[derive(Debug)]
pub(crate) struct DailyGoals {
    quests: [Quest; GOALS_PER_DAY],
    pool: [Goal; 10],
    rng: ChaCha8Rng,
}

impl DailyGoals {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            quests: FIRST_DAY_GOALS.map(Quest::open),
            pool: GOAL_POOL,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn quests(&self) -> &[Quest; GOALS_PER_DAY] {
        &self.quests
    }

    /// Shuffles the pool and offers its first goals.
    pub(crate) fn refresh(&mut self) -> [Goal; GOALS_PER_DAY] {
        self.pool.shuffle(&mut self.rng);
        let goals = [self.pool[0], self.pool[1], self.pool[2]];
        self.quests = goals.map(Quest::open);
        goals
    }

    /// Marks every open quest the tally satisfies and returns the newly met ones.
    pub(crate) fn evaluate(&mut self, tally: &Tally) -> Vec<(usize, Goal)> {
        self.quests
            .iter_mut()
            .enumerate()
            .filter(|(_, quest)| !quest.completed && tally.satisfies(quest.goal))
            .map(|(slot, quest)| {
                quest.completed = true;
                (slot, quest.goal)
            })
            .collect()
    }
}
