//! Schema migration for habit data.
//!
//! Every ingestion boundary (load, import, pre-save) funnels raw node data
//! through [`normalize_habit`]. It accepts anything an older version of the
//! app may have written and produces a record satisfying the current
//! invariants:
//!
//! - `habitName` falls back to the legacy `label` field
//! - `completedDays` is a set of strings; non-array shapes become empty
//! - `unlockedColors` is recomputed from the completed-day count and merged
//!   with whatever was stored
//! - `color` is a member of `unlockedColors`

use std::collections::BTreeSet;

use serde_json::Value;

use super::milestone;
use super::record::HabitRecord;

/// Build a valid [`HabitRecord`] from raw node `data`.
///
/// Total: never fails, whatever `data` contains.
pub fn normalize_habit(data: &Value) -> HabitRecord {
    let habit_name = non_empty_str(data.get("habitName"))
        .or_else(|| non_empty_str(data.get("label")))
        .unwrap_or_default();

    let completed_days: BTreeSet<String> = match data.get("completedDays") {
        Some(Value::Array(days)) => days
            .iter()
            .filter_map(|d| d.as_str().map(str::to_string))
            .collect(),
        _ => BTreeSet::new(),
    };

    let stored_unlocked: Vec<String> = match data.get("unlockedColors") {
        Some(Value::Array(colors)) => colors
            .iter()
            .filter_map(|c| c.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    let unlocked_colors = milestone::merge_unlocked(&stored_unlocked, completed_days.len());

    let color = data
        .get("color")
        .and_then(Value::as_str)
        .and_then(|c| {
            unlocked_colors
                .iter()
                .find(|u| u.eq_ignore_ascii_case(c))
                .cloned()
        })
        .or_else(|| unlocked_colors.last().cloned())
        .unwrap_or_else(|| milestone::BASE_COLOR.to_string());

    HabitRecord {
        habit_name,
        is_done: data.get("isDone").and_then(Value::as_bool).unwrap_or(false),
        completed_days,
        unlocked_colors,
        color,
        notes: string_or_empty(data.get("notes")),
        optimization_record: string_or_empty(data.get("optimizationRecord")),
        target_count: target_count(data.get("targetCount")),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn target_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::milestone::BASE_COLOR;
    use serde_json::json;

    #[test]
    fn empty_object_gets_defaults() {
        let habit = normalize_habit(&json!({}));
        assert_eq!(habit, HabitRecord::new(""));
    }

    #[test]
    fn non_object_data_is_tolerated() {
        let habit = normalize_habit(&json!("garbage"));
        assert_eq!(habit.color, BASE_COLOR);
        assert!(habit.completed_days.is_empty());
    }

    #[test]
    fn legacy_label_becomes_habit_name() {
        let habit = normalize_habit(&json!({ "label": "NODE_01", "color": "#ff007f" }));
        assert_eq!(habit.habit_name, "NODE_01");
        // A pre-reward color that was never earned falls back to the active reward.
        assert_eq!(habit.color, BASE_COLOR);
    }

    #[test]
    fn empty_habit_name_falls_back_to_label() {
        let habit = normalize_habit(&json!({ "habitName": "", "label": "Stretch" }));
        assert_eq!(habit.habit_name, "Stretch");
    }

    #[test]
    fn completed_days_are_coerced() {
        let habit = normalize_habit(&json!({
            "completedDays": ["2024-01-01", 7, "2024-01-02", "2024-01-01", null]
        }));
        assert_eq!(habit.completed_count(), 2);

        let habit = normalize_habit(&json!({ "completedDays": { "2024-01-01": true } }));
        assert!(habit.completed_days.is_empty());
    }

    #[test]
    fn missing_unlocks_are_recomputed() {
        let habit = normalize_habit(&json!({
            "completedDays": ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"],
            "unlockedColors": "oops",
        }));
        assert_eq!(habit.unlocked_colors, vec!["#1a1a1a", "#ff007f", "#00f3ff"]);
        assert_eq!(habit.color, "#00f3ff");
    }

    #[test]
    fn stored_unlocks_survive_lower_counts() {
        let habit = normalize_habit(&json!({
            "completedDays": [],
            "unlockedColors": ["#1a1a1a", "#ff007f"],
            "color": "#ff007f",
        }));
        assert_eq!(habit.unlocked_colors, vec!["#1a1a1a", "#ff007f"]);
        assert_eq!(habit.color, "#ff007f");
    }

    #[test]
    fn target_count_accepts_loose_numbers() {
        assert_eq!(normalize_habit(&json!({ "targetCount": 12 })).target_count, 12);
        assert_eq!(normalize_habit(&json!({ "targetCount": 3.9 })).target_count, 3);
        assert_eq!(normalize_habit(&json!({ "targetCount": -4 })).target_count, 0);
        assert_eq!(normalize_habit(&json!({ "targetCount": "21" })).target_count, 21);
        assert_eq!(normalize_habit(&json!({ "targetCount": "lots" })).target_count, 0);
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = json!({
            "label": "Walk",
            "isDone": true,
            "completedDays": ["2024-05-01", "2024-05-02", 3],
            "color": "#FF007F",
            "notes": 5,
        });
        let once = normalize_habit(&raw);
        let twice = normalize_habit(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }
}
