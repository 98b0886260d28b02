//! Configuration types for the command pipeline.
//!
//! All configuration is loaded from environment variables. The runner needs
//! to know which LLM backend to call (URL, key, model) and how to run each
//! conversion: which context format to show the model, which self-correction
//! strategy to apply, and whether to splice in few-shot examples.

use core::str::FromStr;

use crate::error::RunnerError;

/// Model whose default sampling temperature is lowered.
const LOW_TEMPERATURE_MODEL: &str = "gpt-4o-mini";

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Which LLM backend to call.
    pub backend: LlmBackendConfig,
    /// Per-conversion behavior.
    pub options: ConversionOptions,
    /// Directory overriding the built-in prompt templates, if any.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type (openai, anthropic).
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible API (works with `OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API (different request format).
    Anthropic,
}

impl BackendType {
    /// Base URL used when `LLM_API_URL` is not set.
    pub const fn default_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

impl FromStr for BackendType {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(RunnerError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

/// How the world is shown to the model in the first prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextFormat {
    /// Describe the `tiles` table and let the model query it first.
    Sql,
    /// Embed every tile as a JSON record array.
    #[default]
    Json,
    /// Embed the compact abbreviation grid.
    Minimap,
}

impl FromStr for ContextFormat {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" => Ok(Self::Sql),
            "json" => Ok(Self::Json),
            "minimap" | "minimaptext" => Ok(Self::Minimap),
            other => Err(RunnerError::Config(format!("unknown context format: {other}"))),
        }
    }
}

/// How many extra round-trips are spent checking the candidate answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelfCorrection {
    /// Accept the first candidate.
    #[default]
    None,
    /// One combined find-and-fix round.
    SingleStep,
    /// A find round, then a fix round if errors were reported.
    MultiStep,
}

impl FromStr for SelfCorrection {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "single" | "singlestep" | "single-step" => Ok(Self::SingleStep),
            "multi" | "multistep" | "multi-step" => Ok(Self::MultiStep),
            other => Err(RunnerError::Config(format!(
                "unknown self-correction strategy: {other}"
            ))),
        }
    }
}

/// Settings that shape one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature; `None` picks the per-model default.
    pub temperature: Option<f64>,
    /// Map context representation.
    pub context_format: ContextFormat,
    /// Self-correction strategy.
    pub self_correction: SelfCorrection,
    /// Splice worked examples into store conversations.
    pub few_shot: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            model: LOW_TEMPERATURE_MODEL.to_owned(),
            temperature: None,
            context_format: ContextFormat::default(),
            self_correction: SelfCorrection::default(),
            few_shot: false,
        }
    }
}

impl ConversionOptions {
    /// Effective sampling temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(if self.model == LOW_TEMPERATURE_MODEL {
            0.2
        } else {
            1.0
        })
    }

    /// Reject settings no backend can serve.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.model.trim().is_empty() {
            return Err(RunnerError::Config("model identifier is empty".to_owned()));
        }
        let temperature = self.temperature();
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(RunnerError::Config(format!(
                "temperature {temperature} is outside 0.0..=2.0"
            )));
        }
        Ok(())
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `LLM_API_KEY` -- API key for the backend
    ///
    /// Optional variables:
    /// - `LLM_BACKEND` -- `openai` (default), `deepseek`, `ollama`, `anthropic`
    /// - `LLM_API_URL` -- base URL (default depends on the backend)
    /// - `LLM_MODEL` -- model identifier (default `gpt-4o-mini`)
    /// - `LLM_TEMPERATURE` -- sampling temperature (default 0.2 for
    ///   `gpt-4o-mini`, otherwise 1.0)
    /// - `CONTEXT_FORMAT` -- `sql`, `json` (default) or `minimap`
    /// - `SELF_CORRECTION` -- `none` (default), `single` or `multi`
    /// - `FEW_SHOT` -- splice store examples (default `false`)
    /// - `TEMPLATES_DIR` -- directory overriding the built-in templates
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let backend_type: BackendType = lookup("LLM_BACKEND")
            .unwrap_or_else(|| "openai".to_owned())
            .parse()?;
        let api_url = lookup("LLM_API_URL")
            .unwrap_or_else(|| backend_type.default_url().to_owned());
        let api_key = lookup("LLM_API_KEY")
            .ok_or_else(|| RunnerError::Config("missing required env var LLM_API_KEY".to_owned()))?;

        let defaults = ConversionOptions::default();
        let model = lookup("LLM_MODEL").unwrap_or(defaults.model);

        let temperature = lookup("LLM_TEMPERATURE")
            .map(|raw| {
                raw.parse::<f64>()
                    .map_err(|e| RunnerError::Config(format!("invalid LLM_TEMPERATURE: {e}")))
            })
            .transpose()?;

        let context_format = lookup("CONTEXT_FORMAT")
            .map(|raw| raw.parse::<ContextFormat>())
            .transpose()?
            .unwrap_or_default();

        let self_correction = lookup("SELF_CORRECTION")
            .map(|raw| raw.parse::<SelfCorrection>())
            .transpose()?
            .unwrap_or_default();

        let few_shot: bool = lookup("FEW_SHOT")
            .unwrap_or_else(|| "false".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid FEW_SHOT: {e}")))?;

        let options = ConversionOptions {
            model,
            temperature,
            context_format,
            self_correction,
            few_shot,
        };
        options.validate()?;

        Ok(Self {
            backend: LlmBackendConfig {
                backend_type,
                api_url,
                api_key,
            },
            options,
            templates_dir: lookup("TEMPLATES_DIR"),
        })
    }
}
