//! Task execution queue and game loop for the `CityTalk` command pipeline.
//!
//! Extracted tasks are queued on a [`TaskExecutor`] and applied one at a time
//! against the [`WorldModel`](citytalk_world::WorldModel) and the
//! [`ResourceLedger`](citytalk_ledger::ResourceLedger). The [`GameLoop`]
//! drives the executor once per tick and applies population upkeep.
//!
//! # Modules
//!
//! - [`executor`] -- [`TaskExecutor`]: FIFO queue, game rules, history.
//! - [`game_loop`] -- [`GameLoop`]: tick counter, population, food decay.
//! - [`violation`] -- [`RuleViolation`]: why a task was refused.

pub mod executor;
pub mod game_loop;
pub mod violation;

pub use executor::{Effect, ExecutedTask, TaskExecutor, TaskOutcome};
pub use game_loop::{GameLoop, INHABITANTS_PER_HOUSE, TickReport};
pub use violation::RuleViolation;
