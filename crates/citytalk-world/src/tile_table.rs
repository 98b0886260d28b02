//! Relational snapshot of the tile registry.
//!
//! In structured-query mode the LLM asks for the map data it needs by writing
//! SQL against a `tiles` table. [`TileTable`] is that table: a private
//! in-memory `SQLite` database filled from the [`WorldModel`](crate::WorldModel)
//! at snapshot time. Statements that write only touch the snapshot.

use citytalk_types::{Coord, TileKind};
use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::error::WorldError;

/// DDL for the snapshot table. Also quoted to the LLM as the schema.
pub const TILES_SCHEMA: &str =
    "CREATE TABLE tiles (x REAL, y REAL, z REAL, type TEXT, PRIMARY KEY (x, y, z))";

/// Reported when a reply contained no statement at all.
pub const NO_STATEMENT: &str = "Error: No valid SQL statement found.";

const INSERT_TILE: &str = "INSERT OR REPLACE INTO tiles (x, y, z, type) VALUES (?1, ?2, ?3, ?4)";

/// An in-memory `tiles` table holding one row per registry entry.
pub struct TileTable {
    conn: Connection,
}

impl core::fmt::Debug for TileTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileTable").finish_non_exhaustive()
    }
}

impl TileTable {
    /// Build a table from registry entries.
    pub fn from_tiles<'a>(
        tiles: impl IntoIterator<Item = (&'a Coord, &'a TileKind)>,
    ) -> Result<Self, WorldError> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute(TILES_SCHEMA, [])?;

        let tx = conn.transaction()?;
        {
            let mut insert = tx.prepare(INSERT_TILE)?;
            for (coord, kind) in tiles {
                insert.execute(rusqlite::params![
                    f64::from(coord.x),
                    f64::from(coord.y),
                    f64::from(coord.z),
                    kind.label(),
                ])?;
            }
        }
        tx.commit()?;

        Ok(Self { conn })
    }

    /// Number of rows currently in the table.
    pub fn row_count(&self) -> Result<usize, WorldError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Run one statement and render its outcome as text.
    ///
    /// Statements that produce columns are rendered one row per line as
    /// `column: value, ` pairs. Anything else reports the statement and the
    /// number of affected rows.
    pub fn execute(&self, sql: &str) -> Result<String, WorldError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();

        if columns.is_empty() {
            let affected = stmt.execute([])?;
            return Ok(format!(
                "Executed statement: {sql}\nAffected rows: {affected}\n"
            ));
        }

        let mut out = String::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (i, name) in columns.iter().enumerate() {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(&render_value(row.get_ref(i)?));
                out.push_str(", ");
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// Run every statement in order and concatenate the rendered outcomes.
    ///
    /// A failing statement contributes `Error: <message>` and does not stop
    /// the ones after it. An empty list yields [`NO_STATEMENT`].
    pub fn execute_all(&self, statements: &[String]) -> String {
        if statements.is_empty() {
            tracing::warn!("no SQL statement to execute");
            return NO_STATEMENT.to_owned();
        }

        let mut out = String::new();
        for sql in statements {
            match self.execute(sql) {
                Ok(text) => out.push_str(&text),
                Err(e) => {
                    tracing::warn!(sql = %sql, error = %e, "SQL statement failed");
                    out.push_str("Error: ");
                    out.push_str(&inner_message(&e));
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// The database message without the crate's own prefix.
fn inner_message(error: &WorldError) -> String {
    match error {
        WorldError::Sqlite(e) => e.to_string(),
        WorldError::Serde(e) => e.to_string(),
    }
}
