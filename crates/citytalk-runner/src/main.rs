//! Command-line driver for the `CityTalk` pipeline.
//!
//! Reads one command per line from stdin, converts it through the configured
//! LLM backend, applies the resulting tasks tick by tick and prints the
//! ledger and the minimap after each command.
//!
//! ```text
//! stdin --> GameSession::submit --> GameLoop::run_until_idle --> stdout
//! ```

use anyhow::Context as _;
use citytalk_core::GameLoop;
use citytalk_runner::{
    ConversationOrchestrator, GameSession, GameVocabulary, PromptAssembler, PromptCatalog,
    RunnerConfig, create_backend,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// sets up the LLM backend and prompt templates, then processes commands
/// until stdin closes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("citytalk-runner starting");

    let config = RunnerConfig::from_env().context("loading configuration")?;
    info!(
        model = config.options.model,
        context_format = ?config.options.context_format,
        self_correction = ?config.options.self_correction,
        few_shot = config.options.few_shot,
        "configuration loaded"
    );

    let catalog = match &config.templates_dir {
        Some(dir) => PromptCatalog::from_dir(dir).context("loading prompt templates")?,
        None => PromptCatalog::builtin(),
    };

    let backend = create_backend(&config.backend);
    info!(backend = backend.name(), api_url = config.backend.api_url, "LLM backend configured");

    let orchestrator = ConversationOrchestrator::new(
        backend,
        PromptAssembler::new(catalog, GameVocabulary::default()),
        config.options,
    );
    let mut session = GameSession::new(orchestrator, GameLoop::default());
    print_state(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        let queued = match session.submit(command).await {
            Ok(ids) => ids.len(),
            Err(e) => {
                warn!(error = %e, "command rejected");
                continue;
            }
        };

        let reports = session.run_until_idle();
        let applied = reports
            .iter()
            .filter_map(|r| r.executed.as_ref())
            .filter(|t| t.outcome.is_applied())
            .count();
        println!("{queued} task(s) queued, {applied} applied");
        print_state(&session);
    }

    info!("stdin closed, shutting down");
    Ok(())
}

fn print_state<T: citytalk_runner::ChatTransport>(session: &GameSession<T>) {
    let executor = session.game().executor();
    println!("{}", executor.ledger());
    println!(
        "population: {}, tick: {}",
        session.game().population(),
        session.game().tick_count()
    );
    print!("{}", executor.world().snapshot_as_compact_grid());
}
