//! Sequential task executor.
//!
//! Tasks are applied strictly in the order they were queued, one per call to
//! [`TaskExecutor::step`]. Every task, applied or refused, ends up in the
//! history list together with its outcome.
//!
//! # Rules
//!
//! | Task | Refused when | Effect |
//! |------|--------------|--------|
//! | Add | target holds a building, or no building named | building placed |
//! | Delete | no building at target | tile reset to Grass |
//! | Move | no building at source | source reset, building placed at destination |
//! | Buy | see [`ResourceLedger::buy`] | ledger updated |
//! | Sell | see [`ResourceLedger::sell`] | ledger updated |
//!
//! Move does not check whether the destination is free; an existing building
//! there is overwritten. Add, by contrast, refuses occupied tiles.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use citytalk_ledger::{ResourceLedger, Trade};
use citytalk_types::{BuildingType, Coord, Task, TaskAction, TaskId};
use citytalk_world::{WorldModel, create_starting_world};
use tracing::{debug, info, warn};

use crate::violation::RuleViolation;

/// What an applied task changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A building was placed.
    Placed {
        /// Target tile.
        at: Coord,
        /// Building placed.
        building: BuildingType,
    },
    /// A building was removed.
    Cleared {
        /// Tile reset to Grass.
        at: Coord,
        /// Building removed.
        building: BuildingType,
    },
    /// A building was moved.
    Moved {
        /// Old tile, now Grass.
        from: Coord,
        /// New tile.
        to: Coord,
        /// Building moved.
        building: BuildingType,
    },
    /// A store trade settled.
    Traded(Trade),
}

/// Result of executing one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task changed the game state.
    Applied(Effect),
    /// The task was refused; nothing changed.
    Rejected(RuleViolation),
}

impl TaskOutcome {
    /// Whether the task changed the game state.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// A task that has left the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedTask {
    /// Id assigned at enqueue time.
    pub id: TaskId,
    /// The task as extracted.
    pub task: Task,
    /// What happened.
    pub outcome: TaskOutcome,
    /// When it was processed.
    pub executed_at: DateTime<Utc>,
}

/// FIFO queue of tasks plus the game state they act on.
///
/// The executor is the only writer of the world and the ledger.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    queue: VecDeque<(TaskId, Task)>,
    world: WorldModel,
    ledger: ResourceLedger,
    history: Vec<ExecutedTask>,
}

impl Default for TaskExecutor {
    /// Default starting layout and starting holdings.
    fn default() -> Self {
        Self::new(create_starting_world(), ResourceLedger::starting())
    }
}

impl TaskExecutor {
    /// Create an executor over the given state with an empty queue.
    pub const fn new(world: WorldModel, ledger: ResourceLedger) -> Self {
        Self {
            queue: VecDeque::new(),
            world,
            ledger,
            history: Vec::new(),
        }
    }

    /// Append a task to the back of the queue.
    pub fn enqueue(&mut self, task: Task) -> TaskId {
        let id = TaskId::new();
        debug!(task_id = %id, task = %task, "task queued");
        self.queue.push_back((id, task));
        id
    }

    /// Append several tasks, preserving their order.
    pub fn enqueue_all(&mut self, tasks: impl IntoIterator<Item = Task>) -> Vec<TaskId> {
        tasks.into_iter().map(|task| self.enqueue(task)).collect()
    }

    /// Number of tasks waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Execute the oldest queued task, if any.
    pub fn step(&mut self) -> Option<&ExecutedTask> {
        let (id, task) = self.queue.pop_front()?;
        let outcome = match self.apply(&task) {
            Ok(effect) => {
                info!(task_id = %id, task_kind = %task.kind(), task = %task, "task applied");
                TaskOutcome::Applied(effect)
            }
            Err(violation) => {
                warn!(
                    task_id = %id,
                    task_kind = %task.kind(),
                    task = %task,
                    reason = %violation,
                    "task rejected"
                );
                TaskOutcome::Rejected(violation)
            }
        };
        self.history.push(ExecutedTask {
            id,
            task,
            outcome,
            executed_at: Utc::now(),
        });
        self.history.last()
    }

    /// Execute every queued task. Returns how many were processed.
    pub fn drain(&mut self) -> usize {
        let mut processed: usize = 0;
        while self.step().is_some() {
            processed = processed.saturating_add(1);
        }
        processed
    }

    /// The world as it stands.
    pub const fn world(&self) -> &WorldModel {
        &self.world
    }

    /// The ledger as it stands.
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Mutable ledger access for upkeep outside of task execution.
    pub const fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    /// Every processed task, oldest first.
    pub fn history(&self) -> &[ExecutedTask] {
        &self.history
    }

    fn apply(&mut self, task: &Task) -> Result<Effect, RuleViolation> {
        match task.action()? {
            TaskAction::Add { at, building } => {
                let at = Coord::from(at);
                let occupant = self.world.building_at(at);
                if occupant.is_building() {
                    return Err(RuleViolation::TileOccupied { at, occupant });
                }
                if !building.is_building() {
                    return Err(RuleViolation::MissingBuildingType { at });
                }
                self.world.upsert_tile(at, building);
                Ok(Effect::Placed { at, building })
            }
            TaskAction::Delete { at } => {
                let at = Coord::from(at);
                let building = self.occupied(at)?;
                self.world.remove_tile(at);
                Ok(Effect::Cleared { at, building })
            }
            TaskAction::Move { from, to } => {
                let (from, to) = (Coord::from(from), Coord::from(to));
                let building = self.occupied(from)?;
                self.world.relocate_building(from, to, building);
                Ok(Effect::Moved { from, to, building })
            }
            TaskAction::Buy(bundle) => Ok(Effect::Traded(self.ledger.buy(bundle)?)),
            TaskAction::Sell(bundle) => Ok(Effect::Traded(self.ledger.sell(bundle)?)),
        }
    }

    fn occupied(&self, at: Coord) -> Result<BuildingType, RuleViolation> {
        let building = self.world.building_at(at);
        if building.is_building() {
            Ok(building)
        } else {
            Err(RuleViolation::NoBuildingAt { at })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use citytalk_ledger::LedgerError;
    use citytalk_types::{GridPoint, MapTask, Resource, ResourceBundle, TaskKind, TaskShapeError};

    use super::*;

    fn outcomes(executor: &TaskExecutor) -> Vec<bool> {
        executor
            .history()
            .iter()
            .map(|t| t.outcome.is_applied())
            .collect()
    }

    #[test]
    fn add_on_free_tile_places_building() {
        let mut executor = TaskExecutor::default();
        executor.enqueue(Task::add(6, 2, BuildingType::House));
        assert_eq!(executor.drain(), 1);
        assert_eq!(
            executor.world().building_at(Coord::ground(6, 2)),
            BuildingType::House
        );
        assert_eq!(executor.ledger(), &ResourceLedger::starting());
    }

    #[test]
    fn add_on_occupied_tile_changes_nothing() {
        let mut executor = TaskExecutor::default();
        let world_before = executor.world().clone();
        executor.enqueue(Task::add(3, 3, BuildingType::Farm));
        executor.drain();

        assert_eq!(executor.world(), &world_before);
        assert_eq!(executor.pending(), 0);
        assert_eq!(
            executor.history().first().map(|t| t.outcome),
            Some(TaskOutcome::Rejected(RuleViolation::TileOccupied {
                at: Coord::ground(3, 3),
                occupant: BuildingType::House
            }))
        );
    }

    #[test]
    fn add_without_building_type_is_rejected() {
        let mut executor = TaskExecutor::default();
        executor.enqueue(Task::add(7, 1, BuildingType::NoBuilding));
        executor.drain();
        assert_eq!(outcomes(&executor), vec![false]);
        assert_eq!(
            executor.world().kind_at(Coord::ground(7, 1)).label(),
            "Grass"
        );
    }

    #[test]
    fn delete_clears_building_and_ignores_empty_tiles() {
        let mut executor = TaskExecutor::default();
        executor.enqueue(Task::delete(3, 3));
        executor.enqueue(Task::delete(3, 3));
        executor.drain();

        assert_eq!(outcomes(&executor), vec![true, false]);
        assert_eq!(
            executor.world().building_at(Coord::ground(3, 3)),
            BuildingType::NoBuilding
        );
    }

    #[test]
    fn move_overwrites_occupied_destination() {
        let mut executor = TaskExecutor::default();
        executor.enqueue(Task::relocate(GridPoint::new(3, 3), GridPoint::new(4, 3)));
        executor.drain();

        let world = executor.world();
        assert_eq!(world.building_at(Coord::ground(3, 3)), BuildingType::NoBuilding);
        assert_eq!(world.building_at(Coord::ground(4, 3)), BuildingType::House);
    }

    #[test]
    fn move_from_empty_tile_is_noop() {
        let mut executor = TaskExecutor::default();
        let before = executor.world().clone();
        executor.enqueue(Task::relocate(GridPoint::new(0, 0), GridPoint::new(1, 0)));
        executor.drain();
        assert_eq!(executor.world(), &before);
        assert_eq!(outcomes(&executor), vec![false]);
    }

    #[test]
    fn tasks_run_in_queue_order() {
        let mut executor = TaskExecutor::default();
        // Delete before Add frees the tile; the reverse order would not.
        let ids = executor.enqueue_all([
            Task::delete(3, 3),
            Task::add(3, 3, BuildingType::Store),
            Task::add(3, 3, BuildingType::Farm),
        ]);
        executor.drain();

        let history_ids: Vec<TaskId> = executor.history().iter().map(|t| t.id).collect();
        assert_eq!(history_ids, ids);
        assert_eq!(outcomes(&executor), vec![true, true, false]);
        assert_eq!(
            executor.world().building_at(Coord::ground(3, 3)),
            BuildingType::Store
        );
    }

    #[test]
    fn step_processes_one_task_at_a_time() {
        let mut executor = TaskExecutor::default();
        executor.enqueue_all([Task::delete(3, 3), Task::delete(4, 3)]);
        assert!(executor.step().is_some());
        assert_eq!(executor.pending(), 1);
        assert_eq!(executor.history().len(), 1);
        assert!(executor.step().is_some());
        assert!(executor.step().is_none());
    }

    #[test]
    fn buy_and_sell_go_through_the_ledger() {
        let mut executor = TaskExecutor::default();
        executor.enqueue(Task::buy(ResourceBundle::default().with(Resource::Salt, 10)));
        executor.enqueue(Task::sell(ResourceBundle::default().with(Resource::Iron, 26)));
        executor.drain();

        assert_eq!(executor.ledger().get(Resource::Salt), 60);
        assert_eq!(executor.ledger().get(Resource::Money), 99_980);
        assert_eq!(executor.ledger().get(Resource::Iron), 25);
        assert!(matches!(
            executor.history().get(1).map(|t| t.outcome),
            Some(TaskOutcome::Rejected(RuleViolation::Ledger(
                LedgerError::InsufficientStock { .. }
            )))
        ));
    }

    #[test]
    fn malformed_record_is_recorded_as_rejected() {
        let mut executor = TaskExecutor::default();
        executor.enqueue(Task::Map(MapTask {
            kind: TaskKind::Add,
            location: None,
            new_location: None,
            building: BuildingType::House,
        }));
        executor.drain();
        assert_eq!(
            executor.history().first().map(|t| t.outcome),
            Some(TaskOutcome::Rejected(RuleViolation::Malformed(
                TaskShapeError::MissingLocation { kind: TaskKind::Add }
            )))
        );
    }
}
