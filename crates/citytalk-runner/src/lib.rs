//! Natural-language command pipeline for `CityTalk`.
//!
//! A command such as "build a house at 6,2" travels through:
//!
//! ```text
//! command --> ContextFormatter --> PromptAssembler --> ChatTransport (LLM)
//!         --> self-correction --> extract_tasks --> TaskExecutor queue
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Environment configuration and per-conversion options.
//! - [`error`] -- [`RunnerError`].
//! - [`llm`] -- [`ChatTransport`] seam and the HTTP backends.
//! - [`conversation`] -- Append-only chat history.
//! - [`vocabulary`] -- Game vocabulary bound into prompts.
//! - [`prompt`] -- Template catalog and [`PromptAssembler`].
//! - [`context`] -- [`ContextFormatter`]: the map as SQL schema, JSON or grid.
//! - [`extract`] -- Task and SQL statement extraction from replies.
//! - [`few_shot`] -- Worked store examples.
//! - [`orchestrator`] -- [`ConversationOrchestrator`]: the conversion state machine.
//! - [`session`] -- [`GameSession`]: conversion plus execution.

pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod extract;
pub mod few_shot;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod vocabulary;

pub use config::{BackendType, ContextFormat, ConversionOptions, RunnerConfig, SelfCorrection};
pub use context::ContextFormatter;
pub use conversation::Conversation;
pub use error::RunnerError;
pub use extract::{extract_sql_statements, extract_tasks};
pub use llm::{ChatMessage, ChatRequest, ChatTransport, LlmBackend, Role, create_backend};
pub use orchestrator::{ConversationOrchestrator, TaskCategory};
pub use prompt::{PromptAssembler, PromptCatalog, TemplateId};
pub use session::GameSession;
pub use vocabulary::GameVocabulary;
