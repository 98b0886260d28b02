//! Prompt template catalog and placeholder rendering.
//!
//! Templates are plain text with `{key}` placeholders. They ship inside the
//! binary (`templates/` is embedded with `include_str!`) and can be replaced
//! wholesale from a directory so operators can tune the wording without
//! recompiling.
//!
//! Rendering is a single left-to-right pass: a `{key}` whose key is bound is
//! replaced, anything else (unbound keys, JSON braces in the template text)
//! is copied verbatim. Substituted values are never rescanned, so a task text
//! containing `{task}` cannot expand twice.
//!
//! Callers normally go through [`PromptAssembler::map`] and
//! [`PromptAssembler::store`], whose typed [`MapPrompt`] / [`StorePrompt`]
//! arguments carry exactly the keys each template needs and fill the
//! vocabulary keys from [`GameVocabulary`].

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::RunnerError;
use crate::vocabulary::GameVocabulary;

// ---------------------------------------------------------------------------
// Template identifiers
// ---------------------------------------------------------------------------

/// Templates of the map-interaction flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapTemplate {
    /// Task framing with the map context.
    Framing,
    /// Map analysis continuation.
    Analysis,
    /// JSON output formation.
    Formation,
    /// Error finding only.
    FindErrors,
    /// Error fixing after a find round.
    FixErrors,
    /// Combined find-and-fix.
    FindAndFix,
}

/// Templates of the store-interaction flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreTemplate {
    /// Task framing, splittable at the `Now,` marker.
    Framing,
    /// Single-step check.
    Check,
    /// Error finding only.
    FindErrors,
    /// Error fixing after a find round.
    FixErrors,
}

/// Any template in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateId {
    /// Map-interaction family.
    Map(MapTemplate),
    /// Store-interaction family.
    Store(StoreTemplate),
}

impl TemplateId {
    /// Every template, map family first.
    pub const ALL: [Self; 10] = [
        Self::Map(MapTemplate::Framing),
        Self::Map(MapTemplate::Analysis),
        Self::Map(MapTemplate::Formation),
        Self::Map(MapTemplate::FindErrors),
        Self::Map(MapTemplate::FixErrors),
        Self::Map(MapTemplate::FindAndFix),
        Self::Store(StoreTemplate::Framing),
        Self::Store(StoreTemplate::Check),
        Self::Store(StoreTemplate::FindErrors),
        Self::Store(StoreTemplate::FixErrors),
    ];

    /// File name inside a templates directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Map(MapTemplate::Framing) => "map_framing.txt",
            Self::Map(MapTemplate::Analysis) => "map_analysis.txt",
            Self::Map(MapTemplate::Formation) => "map_formation.txt",
            Self::Map(MapTemplate::FindErrors) => "map_find_errors.txt",
            Self::Map(MapTemplate::FixErrors) => "map_fix_errors.txt",
            Self::Map(MapTemplate::FindAndFix) => "map_find_and_fix.txt",
            Self::Store(StoreTemplate::Framing) => "store_framing.txt",
            Self::Store(StoreTemplate::Check) => "store_check.txt",
            Self::Store(StoreTemplate::FindErrors) => "store_find_errors.txt",
            Self::Store(StoreTemplate::FixErrors) => "store_fix_errors.txt",
        }
    }

    /// Template text compiled into the binary.
    pub const fn builtin(self) -> &'static str {
        match self {
            Self::Map(MapTemplate::Framing) => include_str!("../templates/map_framing.txt"),
            Self::Map(MapTemplate::Analysis) => include_str!("../templates/map_analysis.txt"),
            Self::Map(MapTemplate::Formation) => include_str!("../templates/map_formation.txt"),
            Self::Map(MapTemplate::FindErrors) => include_str!("../templates/map_find_errors.txt"),
            Self::Map(MapTemplate::FixErrors) => include_str!("../templates/map_fix_errors.txt"),
            Self::Map(MapTemplate::FindAndFix) => {
                include_str!("../templates/map_find_and_fix.txt")
            }
            Self::Store(StoreTemplate::Framing) => include_str!("../templates/store_framing.txt"),
            Self::Store(StoreTemplate::Check) => include_str!("../templates/store_check.txt"),
            Self::Store(StoreTemplate::FindErrors) => {
                include_str!("../templates/store_find_errors.txt")
            }
            Self::Store(StoreTemplate::FixErrors) => {
                include_str!("../templates/store_fix_errors.txt")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable set of template texts, one per [`TemplateId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCatalog {
    templates: BTreeMap<TemplateId, String>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptCatalog {
    /// The templates compiled into the binary.
    pub fn builtin() -> Self {
        let templates = TemplateId::ALL
            .into_iter()
            .map(|id| (id, id.builtin().to_owned()))
            .collect();
        Self { templates }
    }

    /// Load every template from a directory.
    ///
    /// The directory must contain one file per [`TemplateId::file_name`].
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let dir = dir.as_ref();
        let mut templates = BTreeMap::new();
        for id in TemplateId::ALL {
            let path = dir.join(id.file_name());
            let text = std::fs::read_to_string(&path).map_err(|e| {
                RunnerError::Template(format!("failed to read {}: {e}", path.display()))
            })?;
            templates.insert(id, text);
        }
        tracing::info!(dir = %dir.display(), "prompt templates loaded");
        Ok(Self { templates })
    }

    /// Raw text of one template.
    pub fn text(&self, id: TemplateId) -> &str {
        self.templates
            .get(&id)
            .map_or_else(|| id.builtin(), String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Substitute `{key}` placeholders in a single pass.
///
/// Keys are ASCII letters, digits and underscores. Placeholders without a
/// binding, and braces that do not form a placeholder, are left untouched.
pub fn render_raw(template: &str, bindings: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((before, after)) = rest.split_once('{') {
        out.push_str(before);
        let substitution = after.split_once('}').and_then(|(key, tail)| {
            if !is_placeholder_key(key) {
                return None;
            }
            bindings
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, tail))
        });
        match substitution {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Bindings for the map-interaction templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPrompt<'a> {
    /// First prompt: the task plus the formatted map context.
    Framing {
        /// User command.
        task: &'a str,
        /// Output of the context formatter.
        map_context: &'a str,
    },
    /// Analysis continuation.
    Analysis {
        /// User command.
        task: &'a str,
        /// Ledger summary.
        resources: &'a str,
    },
    /// JSON formation instructions.
    Formation,
    /// Error-finding round.
    FindErrors {
        /// User command.
        task: &'a str,
        /// Candidate reply under review.
        response: &'a str,
    },
    /// Error-fixing round.
    FixErrors {
        /// User command.
        task: &'a str,
        /// Error report from the find round.
        errors: &'a str,
    },
    /// Combined find-and-fix round.
    FindAndFix {
        /// User command.
        task: &'a str,
        /// Candidate reply under review.
        response: &'a str,
    },
}

impl MapPrompt<'_> {
    /// Template this prompt renders.
    pub const fn template(&self) -> MapTemplate {
        match self {
            Self::Framing { .. } => MapTemplate::Framing,
            Self::Analysis { .. } => MapTemplate::Analysis,
            Self::Formation => MapTemplate::Formation,
            Self::FindErrors { .. } => MapTemplate::FindErrors,
            Self::FixErrors { .. } => MapTemplate::FixErrors,
            Self::FindAndFix { .. } => MapTemplate::FindAndFix,
        }
    }

    fn bindings(&self, vocabulary: &GameVocabulary) -> Vec<(&'static str, String)> {
        match *self {
            Self::Framing { task, map_context } => vec![
                ("type", vocabulary.task_types.clone()),
                ("building", vocabulary.buildings.clone()),
                ("mapContext", map_context.to_owned()),
                ("task", task.to_owned()),
            ],
            Self::Analysis { task, resources } => vec![
                ("height", vocabulary.grid_height.to_string()),
                ("width", vocabulary.grid_width.to_string()),
                ("resources", resources.to_owned()),
                ("prices", vocabulary.building_costs.clone()),
                ("task", task.to_owned()),
            ],
            Self::Formation => Vec::new(),
            Self::FindErrors { task, response } | Self::FindAndFix { task, response } => vec![
                ("task", task.to_owned()),
                ("response", response.to_owned()),
            ],
            Self::FixErrors { task, errors } => {
                vec![("task", task.to_owned()), ("errors", errors.to_owned())]
            }
        }
    }
}

/// Bindings for the store-interaction templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePrompt<'a> {
    /// First prompt: the task plus prices and holdings.
    Framing {
        /// User command.
        task: &'a str,
        /// Ledger summary.
        current_resources: &'a str,
    },
    /// Single-step check.
    Check {
        /// User command.
        task: &'a str,
        /// Candidate reply under review.
        response: &'a str,
    },
    /// Error-finding round.
    FindErrors {
        /// User command.
        task: &'a str,
        /// Candidate reply under review.
        response: &'a str,
    },
    /// Error-fixing round.
    FixErrors {
        /// User command.
        task: &'a str,
        /// Error report from the find round.
        errors: &'a str,
    },
}

impl StorePrompt<'_> {
    /// Template this prompt renders.
    pub const fn template(&self) -> StoreTemplate {
        match self {
            Self::Framing { .. } => StoreTemplate::Framing,
            Self::Check { .. } => StoreTemplate::Check,
            Self::FindErrors { .. } => StoreTemplate::FindErrors,
            Self::FixErrors { .. } => StoreTemplate::FixErrors,
        }
    }

    fn bindings(&self, vocabulary: &GameVocabulary) -> Vec<(&'static str, String)> {
        match *self {
            Self::Framing {
                task,
                current_resources,
            } => vec![
                ("type", vocabulary.store_task_types.clone()),
                ("resourcePrices", vocabulary.resource_prices.clone()),
                ("buildingCosts", vocabulary.building_costs.clone()),
                ("currentResources", current_resources.to_owned()),
                ("task", task.to_owned()),
            ],
            Self::Check { task, response } | Self::FindErrors { task, response } => vec![
                ("task", task.to_owned()),
                ("response", response.to_owned()),
            ],
            Self::FixErrors { task, errors } => {
                vec![("task", task.to_owned()), ("errors", errors.to_owned())]
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Renders catalog templates with typed bindings.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    catalog: PromptCatalog,
    vocabulary: GameVocabulary,
}

impl PromptAssembler {
    /// Combine a catalog with the vocabulary its prompts enumerate.
    pub const fn new(catalog: PromptCatalog, vocabulary: GameVocabulary) -> Self {
        Self {
            catalog,
            vocabulary,
        }
    }

    /// Vocabulary bound into every prompt.
    pub const fn vocabulary(&self) -> &GameVocabulary {
        &self.vocabulary
    }

    /// Render any template with explicit bindings.
    pub fn render(&self, id: TemplateId, bindings: &[(&str, &str)]) -> String {
        render_raw(self.catalog.text(id), bindings)
    }

    /// Render a map-interaction prompt.
    pub fn map(&self, prompt: MapPrompt<'_>) -> String {
        let owned = prompt.bindings(&self.vocabulary);
        self.render_owned(TemplateId::Map(prompt.template()), &owned)
    }

    /// Render a store-interaction prompt.
    pub fn store(&self, prompt: StorePrompt<'_>) -> String {
        let owned = prompt.bindings(&self.vocabulary);
        self.render_owned(TemplateId::Store(prompt.template()), &owned)
    }

    fn render_owned(&self, id: TemplateId, owned: &[(&'static str, String)]) -> String {
        let bindings: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.render(id, &bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_occurrence() {
        let out = render_raw("{a} and {a}, then {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x, then y");
    }

    #[test]
    fn unbound_and_non_key_braces_are_verbatim() {
        let out = render_raw("{missing} [{\"type\": \"Add\"}] {", &[("type", "no")]);
        assert_eq!(out, "{missing} [{\"type\": \"Add\"}] {");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = render_raw("<<<{task}>>>", &[("task", "{task} twice")]);
        assert_eq!(out, "<<<{task} twice>>>");
    }

    #[test]
    fn builtin_templates_are_complete() {
        let catalog = PromptCatalog::builtin();
        for id in TemplateId::ALL {
            assert!(!catalog.text(id).is_empty(), "{id:?} is empty");
        }
        assert!(
            catalog
                .text(TemplateId::Store(StoreTemplate::Framing))
                .contains("Now,")
        );
    }

    #[test]
    fn framing_binds_vocabulary_and_context() {
        let assembler = PromptAssembler::default();
        let prompt = assembler.map(MapPrompt::Framing {
            task: "build a house at 6,2",
            map_context: "MAP CONTEXT",
        });
        assert!(prompt.contains("Add, Delete, Move, Buy, Sell"));
        assert!(prompt.contains("FishingHut, House, Store"));
        assert!(prompt.contains("MAP CONTEXT"));
        assert!(prompt.contains("<<<\nbuild a house at 6,2\n>>>"));
        assert!(!prompt.contains("{mapContext}"));
    }

    #[test]
    fn analysis_binds_grid_size_and_costs() {
        let assembler = PromptAssembler::default();
        let prompt = assembler.map(MapPrompt::Analysis {
            task: "t",
            resources: "Wood: 1",
        });
        assert!(prompt.contains("height of the map is 5 and the width is 10"));
        assert!(prompt.contains("House: Wood: 50, Stone: 30"));
        assert!(!prompt.contains("{prices}"));
    }

    #[test]
    fn formation_keeps_json_examples_intact() {
        let prompt = PromptAssembler::default().map(MapPrompt::Formation);
        assert!(prompt.contains("\"type\": \"Add\""));
        assert!(prompt.contains("\"newLocation\": {"));
    }

    #[test]
    fn store_framing_binds_prices_and_holdings() {
        let prompt = PromptAssembler::default().store(StorePrompt::Framing {
            task: "buy 10 wood",
            current_resources: "Wood: 100, Money: 5",
        });
        assert!(prompt.contains("Task types you can use include: Buy, Sell."));
        assert!(prompt.contains("Iron: 4 money"));
        assert!(prompt.contains("Wood: 100, Money: 5"));
        assert!(prompt.contains("<<<\nbuy 10 wood\n>>>"));
    }

    #[test]
    fn missing_directory_is_a_template_error() {
        let dir = std::env::temp_dir().join(format!(
            "citytalk_missing_templates_{}",
            std::process::id()
        ));
        assert!(matches!(
            PromptCatalog::from_dir(&dir),
            Err(RunnerError::Template(_))
        ));
    }

    #[test]
    fn directory_overrides_builtin_text() {
        let dir = std::env::temp_dir().join(format!(
            "citytalk_test_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).ok();
        for id in TemplateId::ALL {
            std::fs::write(dir.join(id.file_name()), format!("custom {{task}} {id:?}")).ok();
        }

        let catalog = PromptCatalog::from_dir(&dir);
        std::fs::remove_dir_all(&dir).ok();

        assert!(catalog.is_ok(), "catalog should load");
        let Ok(catalog) = catalog else {
            return;
        };
        let assembler = PromptAssembler::new(catalog, GameVocabulary::default());
        let prompt = assembler.map(MapPrompt::FixErrors {
            task: "go",
            errors: "none",
        });
        assert_eq!(prompt, "custom go Map(FixErrors)");
    }
}
