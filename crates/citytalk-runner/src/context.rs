//! Textual map context for the first map prompt.
//!
//! Three presentations, selected by [`ContextFormat`]:
//!
//! | Format | Context text | Extra round-trip |
//! |--------|--------------|------------------|
//! | `Sql` | `tiles` schema plus the legal type labels, no tile data | yes: the model's query runs on a snapshot |
//! | `Json` | every tile as `{x, y, type}`, y descending then x ascending | no |
//! | `Minimap` | compact abbreviation grid, top row = highest y | no |
//!
//! The minimap abbreviates terrain to one letter and buildings to two, so
//! `Stone` and `Store` style collisions are possible. The grid is a lossy
//! overview and is documented as such in the context text.

use citytalk_world::WorldModel;
use citytalk_world::tile_table::TILES_SCHEMA;

use crate::config::ContextFormat;
use crate::error::RunnerError;
use crate::vocabulary::GameVocabulary;

/// Renders the world for the model in one of the three formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextFormatter {
    format: ContextFormat,
}

impl ContextFormatter {
    /// A formatter for the given format.
    pub const fn new(format: ContextFormat) -> Self {
        Self { format }
    }

    /// Selected format.
    pub const fn format(self) -> ContextFormat {
        self.format
    }

    /// Whether the model must query the world before it sees any tile.
    pub const fn needs_query_round(self) -> bool {
        matches!(self.format, ContextFormat::Sql)
    }

    /// Context text bound to `{mapContext}` in the framing prompt.
    pub fn describe(
        self,
        world: &WorldModel,
        vocabulary: &GameVocabulary,
    ) -> Result<String, RunnerError> {
        match self.format {
            ContextFormat::Sql => Ok(schema_description(vocabulary)),
            ContextFormat::Json => Ok(format!(
                "You are given the map as a JSON array with detailed information. \
                 Use this data to accurately interpret and convert the task.\n\n{}",
                world.snapshot_as_json()?
            )),
            ContextFormat::Minimap => Ok(format!(
                "You are given the map as a Minimap. Each line is one row of the map, \
                 the first line is the highest Y and every row starts at the lowest X. \
                 Each cell holds the first letter of a terrain or the first two letters \
                 of a building (e.g. River = R, House = Ho); an empty cell is a space. \
                 Use this data to accurately interpret and convert the task.\n\n{}",
                world.snapshot_as_compact_grid()
            )),
        }
    }

    /// Run the model's statements against a fresh relational snapshot.
    ///
    /// The snapshot is a copy: statements that write never reach `world`.
    pub fn run_queries(world: &WorldModel, statements: &[String]) -> Result<String, RunnerError> {
        let table = world.snapshot_as_table()?;
        let result = table.execute_all(statements);
        if result.starts_with("Error:") {
            tracing::warn!(statements = statements.len(), result = %result, "map query failed");
        } else {
            tracing::debug!(statements = statements.len(), "map query executed");
        }
        Ok(result)
    }

    /// Context text for the second round of a `Sql` conversion.
    pub fn query_result(statements: &[String], result: &str) -> String {
        format!(
            "You executed a SQL command to get the map data you need. \
             This is the result of the query: Query: {} \n Result: {result}",
            statements.join(", ")
        )
    }
}

fn schema_description(vocabulary: &GameVocabulary) -> String {
    format!(
        "- You can get information about the tiles of the map by querying a SQLite table \
         with the following schema:\n\n\
         ```sql\n{TILES_SCHEMA}\n```\n\
         The type column holds the tile type. The following types are available: {}, {}.\n\
         Always request more data than you consider necessary, because missing data will \
         lead to wrong tasks.\n\
         This table is the full content of the database. Using any other table or column \
         will fail.\n\
         First provide me with the SQL statement that retrieves all the data you need \
         to perform the task.",
        vocabulary.buildings, vocabulary.terrains
    )
}
