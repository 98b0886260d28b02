//! Task extraction from LLM reply text.
//!
//! Replies mix prose, markdown fences and JSON. Extraction looks only at the
//! first bracketed span (`[` up to the next `]`), parses it as an array of
//! objects and converts each object on its own, so one malformed element
//! never costs the rest of the batch.
//!
//! Field handling is lenient:
//! - keys match case-insensitively (`X`, `x`, `newLocation`, `newlocation`)
//! - unknown `type` / `building` labels become the sentinel variants
//! - coordinates and quantities may be integers, whole floats or numeric
//!   strings
//! - missing resource counters are 0
//!
//! The same module extracts SQL statements from the first reply of a
//! structured-query conversion.

use citytalk_types::{
    BuildingType, GridPoint, MapTask, Resource, ResourceBundle, StoreTask, Task, TaskKind,
    parse_or_default,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::RunnerError;

/// Statement keywords recognized outside a fenced `sql` block.
const SQL_KEYWORDS: [&str; 4] = ["select", "insert", "update", "delete"];

/// Words that open a continuation line of a statement.
const SQL_CLAUSES: [&str; 26] = [
    "from", "where", "and", "or", "not", "order", "group", "having", "limit", "offset", "join",
    "inner", "left", "right", "cross", "on", "union", "set", "values", "into", "as", "case",
    "when", "then", "else", "end",
];

/// Extract every recognizable task from a reply.
///
/// Never fails: an unparseable reply is logged and yields no tasks.
pub fn extract_tasks(text: &str) -> Vec<Task> {
    match try_extract(text) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, raw_response = text, "failed to extract tasks, returning none");
            Vec::new()
        }
    }
}

/// Extract tasks, reporting a reply whose bracketed span is not JSON.
///
/// A reply without any bracketed span is not an error and yields no tasks.
pub fn try_extract(text: &str) -> Result<Vec<Task>, RunnerError> {
    let Some(inner) = bracketed_span(text) else {
        debug!("reply contains no bracketed span");
        return Ok(Vec::new());
    };
    let span = format!("[{inner}]");

    let elements: Vec<Value> = match serde_json::from_str(&span) {
        Ok(elements) => elements,
        Err(_) => serde_json::from_str(&strip_trailing_commas(&span))
            .map_err(|e| RunnerError::Parse(format!("task array is not valid JSON: {e}")))?,
    };

    let tasks: Vec<Task> = elements.iter().filter_map(task_from_value).collect();
    debug!(elements = elements.len(), tasks = tasks.len(), "tasks extracted");
    Ok(tasks)
}

/// The text between the first `[` and the first `]` after it.
fn bracketed_span(text: &str) -> Option<&str> {
    let (_, after) = text.split_once('[')?;
    let (inner, _) = after.split_once(']')?;
    Some(inner)
}

fn task_from_value(value: &Value) -> Option<Task> {
    let Some(object) = value.as_object() else {
        warn!(element = %value, "skipping non-object task element");
        return None;
    };

    let kind: TaskKind = parse_or_default(field(object, "type").and_then(Value::as_str));

    if let Some(resources) = field(object, "resources") {
        return Some(Task::Store(StoreTask {
            kind,
            resources: bundle_from_value(resources),
        }));
    }

    let building = field(object, "building");
    let location = field(object, "location");
    if building.is_none() && location.is_none() {
        warn!(element = %value, "skipping task element without resources, building or location");
        return None;
    }

    Some(Task::Map(MapTask {
        kind,
        location: location.and_then(grid_point),
        new_location: field(object, "newLocation").and_then(grid_point),
        building: parse_or_default::<BuildingType>(building.and_then(Value::as_str)),
    }))
}

/// Case-insensitive object lookup.
fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
        .filter(|value| !value.is_null())
}

fn grid_point(value: &Value) -> Option<GridPoint> {
    let object = value.as_object()?;
    let x = field(object, "x").and_then(integer)?;
    let y = field(object, "y").and_then(integer)?;
    Some(GridPoint::new(
        i32::try_from(x).ok()?,
        i32::try_from(y).ok()?,
    ))
}

fn bundle_from_value(value: &Value) -> ResourceBundle {
    let Some(object) = value.as_object() else {
        warn!(resources = %value, "resources is not an object, using an empty bundle");
        return ResourceBundle::default();
    };
    Resource::ALL.into_iter().fold(ResourceBundle::default(), |bundle, resource| {
        let quantity = field(object, resource.label()).and_then(integer).unwrap_or(0);
        bundle.with(resource, quantity)
    })
}

/// An integer from a JSON number or numeric string. Fractional values are
/// rejected.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_float))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_float(f: f64) -> Option<i64> {
    // |f| <= 2^53, so the cast is exact.
    let in_range =
        f.is_finite() && f.fract().abs() < f64::EPSILON && f.abs() <= 9_007_199_254_740_992.0;
    in_range.then_some(f as i64)
}

/// Strip trailing commas before closing braces and brackets (common LLM error).
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ',' {
            let rest = chars.clone().find(|next| !next.is_whitespace());
            if matches!(rest, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}

// ---------------------------------------------------------------------------
// SQL statements
// ---------------------------------------------------------------------------

/// Extract the SQL statements a structured-query reply asks for.
///
/// Fenced blocks tagged exactly `sql` win: each is split on `;`. Without any
/// such block, the reply is split on `;` and each piece is scanned line by
/// line. A statement starts at a line opening with a statement keyword and
/// runs over the lines that continue it; the first prose line ends it.
pub fn extract_sql_statements(text: &str) -> Vec<String> {
    let fenced: Vec<&str> = text
        .split("```")
        .skip(1)
        .step_by(2)
        .filter_map(sql_fence_body)
        .collect();

    let statements: Vec<String> = if fenced.is_empty() {
        text.split(';').flat_map(statements_in_prose).collect()
    } else {
        fenced
            .iter()
            .flat_map(|block| block.split(';'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    };

    debug!(count = statements.len(), fenced = !fenced.is_empty(), "SQL statements extracted");
    statements
}

/// Body of a fenced block whose language tag is `sql`, or `None`.
fn sql_fence_body(block: &str) -> Option<&str> {
    let tag_end = block.find(char::is_whitespace).unwrap_or(block.len());
    let (tag, body) = block.split_at(tag_end);
    tag.eq_ignore_ascii_case("sql").then_some(body)
}

fn statements_in_prose(piece: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in piece.lines().map(str::trim) {
        if starts_with_keyword(line) {
            flush(&mut current, &mut statements);
            current.push(line);
        } else if current.last().is_some_and(|prev| continues_statement(prev, line)) {
            current.push(line);
        } else {
            flush(&mut current, &mut statements);
        }
    }
    flush(&mut current, &mut statements);
    statements
}

fn flush(lines: &mut Vec<&str>, statements: &mut Vec<String>) {
    if !lines.is_empty() {
        statements.push(lines.join(" "));
        lines.clear();
    }
}

fn starts_with_keyword(line: &str) -> bool {
    first_word_in(line, &SQL_KEYWORDS)
}

/// Whether `line` reads as the next line of the statement ending in `prev`.
fn continues_statement(prev: &str, line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    prev.ends_with([',', '(', '='])
        || line.starts_with(|c: char| c.is_ascii_digit() || "(),'\"*=<>".contains(c))
        || first_word_in(line, &SQL_CLAUSES)
}

fn first_word_in(line: &str, words: &[&str]) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| words.iter().any(|k| word.eq_ignore_ascii_case(k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_task_inside_prose_and_fence() {
        let reply = "Here you go:\n```json\n[{\"type\":\"Add\",\"location\":{\"X\":1,\"Y\":1},\"building\":\"House\"}]\n```\nThanks.";
        assert_eq!(extract_tasks(reply), vec![Task::add(1, 1, BuildingType::House)]);
    }

    #[test]
    fn no_brackets_is_no_tasks() {
        assert_eq!(try_extract("I could not find a free tile.").ok(), Some(Vec::new()));
    }

    #[test]
    fn broken_json_is_a_parse_error() {
        assert!(matches!(try_extract("[{type: Add}]"), Err(RunnerError::Parse(_))));
        assert!(extract_tasks("[{type: Add}]").is_empty());
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        let reply = r#"[{"type": "Delete", "location": {"X": 3, "Y": 3,},},]"#;
        assert_eq!(extract_tasks(reply), vec![Task::delete(3, 3)]);
    }

    #[test]
    fn variant_is_decided_by_fields() {
        let reply = r#"[
            {"type": "Buy", "resources": {"Wood": 10}},
            {"type": "Move", "location": {"X": 3, "Y": 3}, "newLocation": {"X": 6, "Y": 2}},
            {"type": "Add", "comment": "no location, no building"},
            "not an object"
        ]"#;
        let tasks = extract_tasks(reply);
        assert_eq!(
            tasks,
            vec![
                Task::buy(ResourceBundle::default().with(Resource::Wood, 10)),
                Task::relocate(GridPoint::new(3, 3), GridPoint::new(6, 2)),
            ]
        );
    }

    #[test]
    fn labels_and_keys_are_lenient() {
        let reply = r#"[{"Type": "add", "Location": {"x": "6", "y": 2.0}, "Building": "castle"}]"#;
        let tasks = extract_tasks(reply);
        assert_eq!(
            tasks,
            vec![Task::Map(MapTask {
                kind: TaskKind::Add,
                location: Some(GridPoint::new(6, 2)),
                new_location: None,
                building: BuildingType::NoBuilding,
            })]
        );
    }

    #[test]
    fn unknown_kind_becomes_sentinel() {
        let tasks = extract_tasks(r#"[{"type": "Demolish", "location": {"X": 1, "Y": 1}}]"#);
        assert_eq!(tasks.first().map(Task::kind), Some(TaskKind::None));
    }

    #[test]
    fn fractional_coordinates_drop_the_location() {
        let tasks = extract_tasks(r#"[{"type": "Delete", "location": {"X": 1.5, "Y": 1}}]"#);
        assert!(matches!(
            tasks.first(),
            Some(Task::Map(MapTask { location: None, .. }))
        ));
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let tasks = extract_tasks(r#"[{"type": "Sell", "resources": {"iron": 5, "Money": 0}}]"#);
        assert_eq!(
            tasks,
            vec![Task::sell(ResourceBundle::default().with(Resource::Iron, 5))]
        );
    }

    #[test]
    fn only_the_first_span_is_read() {
        let reply = "[] and later [{\"type\": \"Delete\", \"location\": {\"X\": 1, \"Y\": 1}}]";
        assert!(extract_tasks(reply).is_empty());
    }

    #[test]
    fn fenced_sql_blocks_are_split() {
        let reply = "Let me check.\n```SQL\nSELECT * FROM tiles WHERE type = 'Grass';\nSELECT COUNT(*) FROM tiles;\n```\nDone.";
        assert_eq!(
            extract_sql_statements(reply),
            vec![
                "SELECT * FROM tiles WHERE type = 'Grass'".to_owned(),
                "SELECT COUNT(*) FROM tiles".to_owned(),
            ]
        );
    }

    #[test]
    fn unfenced_statements_are_found_in_prose() {
        let reply = "I need the grass tiles.\nSELECT x, y\nFROM tiles WHERE type = 'Grass';\nThat is all.";
        assert_eq!(
            extract_sql_statements(reply),
            vec!["SELECT x, y FROM tiles WHERE type = 'Grass'".to_owned()]
        );
    }

    #[test]
    fn prose_after_an_unterminated_statement_is_dropped() {
        let reply = "Here is the query:\nSELECT x, y FROM tiles WHERE type = 'Grass'\nThis returns every free tile.";
        assert_eq!(
            extract_sql_statements(reply),
            vec!["SELECT x, y FROM tiles WHERE type = 'Grass'".to_owned()]
        );
    }

    #[test]
    fn unterminated_statements_on_separate_lines_stay_separate() {
        let reply = "SELECT type FROM tiles WHERE x = 3\nAND y = 3\nSELECT COUNT(*) FROM tiles\n\nBoth are needed.";
        assert_eq!(
            extract_sql_statements(reply),
            vec![
                "SELECT type FROM tiles WHERE x = 3 AND y = 3".to_owned(),
                "SELECT COUNT(*) FROM tiles".to_owned(),
            ]
        );
    }

    #[test]
    fn fence_tag_must_be_exactly_sql() {
        assert_eq!(
            extract_sql_statements("```sqlite\nSELECT * FROM tiles;\n```"),
            vec!["SELECT * FROM tiles".to_owned()]
        );
        assert_eq!(
            extract_sql_statements("```sqlite\nSELECT * FROM tiles\n```\n- every tile"),
            vec!["SELECT * FROM tiles".to_owned()]
        );
        assert_eq!(
            extract_sql_statements("```sql SELECT x FROM tiles```"),
            vec!["SELECT x FROM tiles".to_owned()]
        );
    }

    #[test]
    fn no_statement_at_all() {
        assert!(extract_sql_statements("The map looks fine to me.").is_empty());
    }
}
