//! Worked store examples spliced into the store conversation.
//!
//! When few-shot mode is on, the store framing prompt is cut at
//! [`FEW_SHOT_MARKER`]: the instructions go first, then [`FEW_SHOT_INTRO`],
//! then each example as a user/assistant pair, then the marker and the rest
//! of the prompt (the actual task).

/// Literal that separates the store instructions from the task.
pub const FEW_SHOT_MARKER: &str = "Now,";

/// Message introducing the examples.
pub const FEW_SHOT_INTRO: &str = "Here are some examples on how to fulfill the tasks:";

/// `(command, reply)` pairs, assuming the starting holdings.
pub const FEW_SHOT_EXAMPLES: [(&str, &str); 5] = [
    (
        "Buy 150 salt",
        r#"[{"type": "Buy", "resources": {"Wood": 0, "Salt": 150, "Food": 0, "Iron": 0, "Stone": 0, "Money": 0}}]"#,
    ),
    (
        "Sell all my stone",
        r#"[{"type": "Sell", "resources": {"Wood": 0, "Salt": 0, "Food": 0, "Iron": 0, "Stone": 75, "Money": 0}}]"#,
    ),
    (
        "Purchase 10 iron and sell 5 wood",
        r#"[{"type": "Buy", "resources": {"Wood": 0, "Salt": 0, "Food": 0, "Iron": 10, "Stone": 0, "Money": 0}},
 {"type": "Sell", "resources": {"Wood": 5, "Salt": 0, "Food": 0, "Iron": 0, "Stone": 0, "Money": 0}}]"#,
    ),
    (
        "Buy enough resources for two houses",
        r#"[{"type": "Buy", "resources": {"Wood": 100, "Salt": 0, "Food": 0, "Iron": 0, "Stone": 60, "Money": 0}}]"#,
    ),
    (
        "Sell 20 food and spend the money on wood",
        r#"[{"type": "Sell", "resources": {"Wood": 0, "Salt": 0, "Food": 20, "Iron": 0, "Stone": 0, "Money": 0}},
 {"type": "Buy", "resources": {"Wood": 40, "Salt": 0, "Food": 0, "Iron": 0, "Stone": 0, "Money": 0}}]"#,
    ),
];
