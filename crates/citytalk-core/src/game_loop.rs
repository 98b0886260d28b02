//! Game loop: one executor step and one round of upkeep per tick.
//!
//! Each tick:
//!
//! 1. **Execute** -- the oldest queued task, if any.
//! 2. **Census** -- population is ten inhabitants per House on the map.
//! 3. **Upkeep** -- population / 10 Food is eaten, never below zero.

use citytalk_types::BuildingType;
use tracing::debug;

use crate::executor::{ExecutedTask, TaskExecutor};

/// Inhabitants contributed by each House.
pub const INHABITANTS_PER_HOUSE: i64 = 10;

/// Inhabitants that share one unit of Food per tick.
const INHABITANTS_PER_FOOD: i64 = 10;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Task processed this tick, if the queue was not empty.
    pub executed: Option<ExecutedTask>,
    /// Population after the task was applied.
    pub population: i64,
    /// Food actually removed from the ledger.
    pub food_consumed: i64,
}

/// Drives a [`TaskExecutor`] tick by tick.
#[derive(Debug, Clone, Default)]
pub struct GameLoop {
    tick: u64,
    executor: TaskExecutor,
}

impl GameLoop {
    /// Wrap an executor. The tick counter starts at 0.
    pub const fn new(executor: TaskExecutor) -> Self {
        Self { tick: 0, executor }
    }

    /// Ticks completed so far.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The executor and the state it owns.
    pub const fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    /// Mutable executor access, used to queue tasks.
    pub const fn executor_mut(&mut self) -> &mut TaskExecutor {
        &mut self.executor
    }

    /// Current population.
    pub fn population(&self) -> i64 {
        let houses = self.executor.world().count_buildings(BuildingType::House);
        i64::try_from(houses)
            .unwrap_or(i64::MAX)
            .saturating_mul(INHABITANTS_PER_HOUSE)
    }

    /// Advance the game by one tick.
    pub fn tick(&mut self) -> TickReport {
        self.tick = self.tick.saturating_add(1);
        let executed = self.executor.step().cloned();

        let population = self.population();
        let demand = population.checked_div(INHABITANTS_PER_FOOD).unwrap_or(0);
        let food_consumed = self.executor.ledger_mut().consume_food(demand);

        debug!(
            tick = self.tick,
            population,
            food_consumed,
            pending = self.executor.pending(),
            "tick complete"
        );

        TickReport {
            tick: self.tick,
            executed,
            population,
            food_consumed,
        }
    }

    /// Tick until the queue is empty. Returns one report per tick.
    pub fn run_until_idle(&mut self) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while self.executor.pending() > 0 {
            reports.push(self.tick());
        }
        reports
    }
}
