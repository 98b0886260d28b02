//! Conversation orchestration: natural-language command in, tasks out.
//!
//! Each conversion is a short, linear chat with the model:
//!
//! **Map flow**
//! 1. *Context acquisition* -- framing prompt with the map context. In `Sql`
//!    mode the framing prompt is sent alone, the statements in the reply run
//!    on a snapshot, and the conversation restarts with the query result as
//!    the map context.
//! 2. *Elaboration* -- analysis prompt appended, reply R1.
//! 3. *Formation* -- R1 and the formation prompt appended, reply R2 is the
//!    candidate.
//!
//! **Store flow**
//! 1. Framing prompt, optionally split at `Now,` around the worked examples.
//!    The reply is the candidate.
//!
//! Both flows then run the configured self-correction strategy and hand the
//! final text to the extractor.
//!
//! Failures inside a conversion (transport, snapshot query) abort that
//! conversion only: they are logged and yield no tasks. Invalid options are
//! returned to the caller.

use citytalk_ledger::ResourceLedger;
use citytalk_types::{ConversionId, Task};
use citytalk_world::WorldModel;
use tracing::{debug, info, warn};

use crate::config::{ConversionOptions, SelfCorrection};
use crate::context::ContextFormatter;
use crate::conversation::Conversation;
use crate::error::RunnerError;
use crate::extract::{extract_sql_statements, extract_tasks};
use crate::few_shot::{FEW_SHOT_EXAMPLES, FEW_SHOT_INTRO, FEW_SHOT_MARKER};
use crate::llm::{ChatRequest, ChatTransport};
use crate::prompt::{MapPrompt, PromptAssembler, StorePrompt};

/// Inputs shorter than this (in characters, after trimming) are ignored.
pub const MIN_INPUT_CHARS: usize = 3;

/// Substring of a review reply that confirms the candidate.
const NO_ERRORS: &str = "no errors";

/// Words that route a command to the store flow.
const STORE_WORDS: [&str; 3] = ["buy", "sell", "purchase"];

/// Which flow a command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
    /// Place, remove or move buildings.
    Map,
    /// Trade with the store.
    Store,
}

impl TaskCategory {
    /// Lexical routing: any of `buy`, `sell`, `purchase` as a
    /// case-insensitive substring selects the store flow.
    pub fn detect(input: &str) -> Self {
        let lower = input.to_lowercase();
        if STORE_WORDS.iter().any(|word| lower.contains(word)) {
            Self::Store
        } else {
            Self::Map
        }
    }
}

/// Converts commands into tasks by talking to a model.
pub struct ConversationOrchestrator<T> {
    transport: T,
    assembler: PromptAssembler,
    options: ConversionOptions,
}

impl<T: ChatTransport> ConversationOrchestrator<T> {
    /// Create an orchestrator.
    pub const fn new(transport: T, assembler: PromptAssembler, options: ConversionOptions) -> Self {
        Self {
            transport,
            assembler,
            options,
        }
    }

    /// Options applied to every conversion.
    pub const fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Convert one command into tasks against the given state.
    ///
    /// # Errors
    ///
    /// Only [`RunnerError::Config`] for invalid options. Every failure inside
    /// the conversion yields `Ok` with no tasks.
    pub async fn convert(
        &self,
        input: &str,
        world: &WorldModel,
        ledger: &ResourceLedger,
    ) -> Result<Vec<Task>, RunnerError> {
        self.options.validate()?;

        let task = input.trim();
        if task.chars().count() < MIN_INPUT_CHARS {
            debug!(input = task, "input too short, skipping conversion");
            return Ok(Vec::new());
        }

        let id = ConversionId::new();
        let category = TaskCategory::detect(task);
        info!(
            conversion_id = %id,
            category = ?category,
            context_format = ?self.options.context_format,
            self_correction = ?self.options.self_correction,
            "conversion started"
        );

        let reply = match category {
            TaskCategory::Map => self.convert_map(id, task, world, ledger).await,
            TaskCategory::Store => self.convert_store(id, task, ledger).await,
        };

        match reply {
            Ok(text) => {
                let tasks = extract_tasks(&text);
                if tasks.is_empty() {
                    warn!(conversion_id = %id, "conversion produced no tasks");
                } else {
                    info!(conversion_id = %id, tasks = tasks.len(), "conversion complete");
                }
                Ok(tasks)
            }
            Err(e @ RunnerError::Config(_)) => Err(e),
            Err(e) => {
                warn!(conversion_id = %id, error = %e, "conversion aborted, no tasks");
                Ok(Vec::new())
            }
        }
    }

    async fn convert_map(
        &self,
        id: ConversionId,
        task: &str,
        world: &WorldModel,
        ledger: &ResourceLedger,
    ) -> Result<String, RunnerError> {
        let formatter = ContextFormatter::new(self.options.context_format);
        let context = formatter.describe(world, self.assembler.vocabulary())?;
        let mut opening = Conversation::new().user(self.assembler.map(MapPrompt::Framing {
            task,
            map_context: &context,
        }));

        if formatter.needs_query_round() {
            let reply = self.send(id, "query", &opening).await?;
            let statements = extract_sql_statements(&reply);
            let result = ContextFormatter::run_queries(world, &statements)?;
            let follow_up = ContextFormatter::query_result(&statements, &result);
            opening = Conversation::new().user(self.assembler.map(MapPrompt::Framing {
                task,
                map_context: &follow_up,
            }));
        }

        let resources = ledger.to_string();
        let elaboration = opening.user(self.assembler.map(MapPrompt::Analysis {
            task,
            resources: &resources,
        }));
        let analysis = self.send(id, "analysis", &elaboration).await?;

        let formation = elaboration
            .assistant(analysis)
            .user(self.assembler.map(MapPrompt::Formation));
        let candidate = self.send(id, "formation", &formation).await?;

        self.self_correct(id, TaskCategory::Map, task, &formation, candidate)
            .await
    }

    async fn convert_store(
        &self,
        id: ConversionId,
        task: &str,
        ledger: &ResourceLedger,
    ) -> Result<String, RunnerError> {
        let resources = ledger.to_string();
        let framing = self.assembler.store(StorePrompt::Framing {
            task,
            current_resources: &resources,
        });
        let opening = if self.options.few_shot {
            splice_examples(&framing)
        } else {
            Conversation::new().user(framing)
        };

        let candidate = self.send(id, "store", &opening).await?;
        self.self_correct(id, TaskCategory::Store, task, &opening, candidate)
            .await
    }

    async fn self_correct(
        &self,
        id: ConversionId,
        category: TaskCategory,
        task: &str,
        conversation: &Conversation,
        candidate: String,
    ) -> Result<String, RunnerError> {
        match self.options.self_correction {
            SelfCorrection::None => Ok(candidate),
            SelfCorrection::SingleStep => {
                let prompt = match category {
                    TaskCategory::Map => self.assembler.map(MapPrompt::FindAndFix {
                        task,
                        response: &candidate,
                    }),
                    TaskCategory::Store => self.assembler.store(StorePrompt::Check {
                        task,
                        response: &candidate,
                    }),
                };
                let review = conversation.assistant(candidate.as_str()).user(prompt);
                let reply = self.send(id, "find-and-fix", &review).await?;
                if reports_no_errors(&reply) {
                    info!(conversion_id = %id, "candidate confirmed");
                    Ok(candidate)
                } else {
                    info!(conversion_id = %id, "candidate replaced by correction");
                    Ok(reply)
                }
            }
            SelfCorrection::MultiStep => {
                let prompt = match category {
                    TaskCategory::Map => self.assembler.map(MapPrompt::FindErrors {
                        task,
                        response: &candidate,
                    }),
                    TaskCategory::Store => self.assembler.store(StorePrompt::FindErrors {
                        task,
                        response: &candidate,
                    }),
                };
                let review = conversation.assistant(candidate.as_str()).user(prompt);
                let errors = self.send(id, "find-errors", &review).await?;
                if reports_no_errors(&errors) {
                    info!(conversion_id = %id, "candidate confirmed");
                    return Ok(candidate);
                }

                let prompt = match category {
                    TaskCategory::Map => self.assembler.map(MapPrompt::FixErrors {
                        task,
                        errors: &errors,
                    }),
                    TaskCategory::Store => self.assembler.store(StorePrompt::FixErrors {
                        task,
                        errors: &errors,
                    }),
                };
                let fix = review.assistant(errors.as_str()).user(prompt);
                self.send(id, "fix-errors", &fix).await
            }
        }
    }

    async fn send(
        &self,
        id: ConversionId,
        stage: &'static str,
        conversation: &Conversation,
    ) -> Result<String, RunnerError> {
        debug!(
            conversion_id = %id,
            stage,
            messages = conversation.len(),
            prompt = conversation.messages().last().map_or("", |m| m.content.as_str()),
            "sending prompt"
        );
        let reply = self
            .transport
            .send(ChatRequest {
                model: &self.options.model,
                messages: conversation.messages(),
                temperature: self.options.temperature(),
            })
            .await?;
        debug!(conversion_id = %id, stage, reply = %reply, "reply received");
        Ok(reply)
    }
}

/// Whether a review reply confirms the candidate.
fn reports_no_errors(reply: &str) -> bool {
    reply.to_lowercase().contains(NO_ERRORS)
}

/// Build the store opening with the worked examples between the
/// instructions and the task. Without the marker the prompt is sent whole.
fn splice_examples(framing: &str) -> Conversation {
    let Some((instructions, rest)) = framing.split_once(FEW_SHOT_MARKER) else {
        warn!("store prompt has no few-shot marker, sending it without examples");
        return Conversation::new().user(framing);
    };
    let with_examples = FEW_SHOT_EXAMPLES.iter().fold(
        Conversation::new().user(instructions).user(FEW_SHOT_INTRO),
        |conversation, (example, reply)| conversation.user(*example).assistant(*reply),
    );
    with_examples.user(format!("{FEW_SHOT_MARKER}{rest}"))
}
