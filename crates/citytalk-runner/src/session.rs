//! One player's game: the orchestrator plus the state it converts against.
//!
//! Conversions read the current world and ledger; the resulting tasks are
//! queued on the executor and applied one per tick. A session processes one
//! command at a time: `submit` takes `&mut self`, so a second command cannot
//! race the first on the same state.

use citytalk_core::{GameLoop, TickReport};
use citytalk_types::TaskId;
use tracing::info;

use crate::error::RunnerError;
use crate::llm::ChatTransport;
use crate::orchestrator::ConversationOrchestrator;

/// Glue between command conversion and task execution.
pub struct GameSession<T> {
    orchestrator: ConversationOrchestrator<T>,
    game: GameLoop,
}

impl<T: ChatTransport> GameSession<T> {
    /// Start a session on the given game.
    pub const fn new(orchestrator: ConversationOrchestrator<T>, game: GameLoop) -> Self {
        Self { orchestrator, game }
    }

    /// Convert a command and queue the resulting tasks.
    ///
    /// Returns the ids of the queued tasks, oldest first. Nothing is applied
    /// until the game ticks.
    pub async fn submit(&mut self, command: &str) -> Result<Vec<TaskId>, RunnerError> {
        let executor = self.game.executor();
        let tasks = self
            .orchestrator
            .convert(command, executor.world(), executor.ledger())
            .await?;
        let ids = self.game.executor_mut().enqueue_all(tasks);
        info!(queued = ids.len(), pending = self.game.executor().pending(), "command submitted");
        Ok(ids)
    }

    /// Advance the game by one tick.
    pub fn tick(&mut self) -> TickReport {
        self.game.tick()
    }

    /// Tick until every queued task has been processed.
    pub fn run_until_idle(&mut self) -> Vec<TickReport> {
        self.game.run_until_idle()
    }

    /// The game state.
    pub const fn game(&self) -> &GameLoop {
        &self.game
    }

    /// The orchestrator.
    pub const fn orchestrator(&self) -> &ConversationOrchestrator<T> {
        &self.orchestrator
    }
}
