//! The canonical shape of one habit node's data.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::milestone::{self, BASE_COLOR};
use crate::clock::day_key;

/// Per-habit tracking state.
///
/// Serialized in camelCase to stay compatible with snapshots written by
/// earlier versions of the app. Deserialization always goes through
/// [`normalize_habit`](super::normalize_habit) so legacy shapes are
/// migrated in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub habit_name: String,
    /// Derived flag: true iff today's key is in `completed_days`.
    pub is_done: bool,
    /// `YYYY-MM-DD` keys, one per completed calendar day.
    pub completed_days: BTreeSet<String>,
    /// Reward colors in milestone order. Only ever grows.
    pub unlocked_colors: Vec<String>,
    /// Selected color. Always a member of `unlocked_colors`.
    pub color: String,
    pub notes: String,
    pub optimization_record: String,
    pub target_count: u64,
}

impl HabitRecord {
    /// A fresh habit with no history and only the base color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            habit_name: name.into(),
            is_done: false,
            completed_days: BTreeSet::new(),
            unlocked_colors: milestone::unlocked_colors(0),
            color: BASE_COLOR.to_string(),
            notes: String::new(),
            optimization_record: String::new(),
            target_count: 0,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed_days.len()
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_days.contains(&day_key(date))
    }

    pub fn is_unlocked(&self, color: &str) -> bool {
        self.unlocked_colors
            .iter()
            .any(|c| c.eq_ignore_ascii_case(color))
    }

    /// Highest unlocked milestone color.
    pub fn reward_color(&self) -> &str {
        self.unlocked_colors
            .last()
            .map(String::as_str)
            .unwrap_or(BASE_COLOR)
    }
}

impl Default for HabitRecord {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_habit_starts_at_base_color() {
        let habit = HabitRecord::new("Read");
        assert_eq!(habit.habit_name, "Read");
        assert!(habit.completed_days.is_empty());
        assert_eq!(habit.unlocked_colors, vec![BASE_COLOR.to_string()]);
        assert_eq!(habit.color, BASE_COLOR);
        assert_eq!(habit.reward_color(), BASE_COLOR);
        assert!(!habit.is_done);
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(HabitRecord::new("Run")).unwrap();
        assert_eq!(json["habitName"], "Run");
        assert_eq!(json["isDone"], false);
        assert_eq!(json["completedDays"], serde_json::json!([]));
        assert_eq!(json["unlockedColors"], serde_json::json!(["#1a1a1a"]));
        assert_eq!(json["optimizationRecord"], "");
        assert_eq!(json["targetCount"], 0);
    }
}
