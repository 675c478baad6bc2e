//! Completion engine.
//!
//! Marking and un-marking days, editing a habit's detail form, and switching
//! between unlocked reward colors. Unlocks are monotonic: removing days
//! never revokes a color and never changes the selected one.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::milestone;
use super::record::HabitRecord;
use crate::clock::day_key;

/// What a completion change did to a habit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletionChange {
    /// Whether `completed_days` was modified.
    pub days_changed: bool,
    /// Colors that became available with this change.
    pub newly_unlocked: Vec<String>,
    /// Set when the selected color was auto-promoted.
    pub promoted_to: Option<String>,
}

/// Editable fields of the habit detail form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDetails {
    pub habit_name: String,
    pub notes: String,
    pub optimization_record: String,
    pub target_count: u64,
    pub completed_days: BTreeSet<String>,
}

impl From<&HabitRecord> for HabitDetails {
    fn from(habit: &HabitRecord) -> Self {
        Self {
            habit_name: habit.habit_name.clone(),
            notes: habit.notes.clone(),
            optimization_record: habit.optimization_record.clone(),
            target_count: habit.target_count,
            completed_days: habit.completed_days.clone(),
        }
    }
}

impl HabitRecord {
    /// Mark or un-mark `today`.
    ///
    /// Idempotent: repeating the same `checked` value changes nothing. The
    /// selected color is promoted to the newest reward only when marking
    /// crosses a milestone.
    pub fn set_completed(&mut self, today: NaiveDate, checked: bool) -> CompletionChange {
        let key = day_key(today);
        let old_count = self.completed_count();

        let days_changed = if checked {
            self.completed_days.insert(key)
        } else {
            self.completed_days.remove(&key)
        };
        self.is_done = checked;

        let mut change = self.refresh_unlocks(old_count, checked);
        change.days_changed = days_changed;
        change
    }

    /// Apply a saved detail form. `today` re-derives `is_done`.
    pub fn apply_details(&mut self, details: HabitDetails, today: NaiveDate) -> CompletionChange {
        let old_count = self.completed_count();
        let days_changed = details.completed_days != self.completed_days;

        self.habit_name = details.habit_name;
        self.notes = details.notes;
        self.optimization_record = details.optimization_record;
        self.target_count = details.target_count;
        self.completed_days = details.completed_days;
        self.is_done = self.is_completed_on(today);

        let mut change = self.refresh_unlocks(old_count, true);
        change.days_changed = days_changed;
        change
    }

    /// Select a different reward color.
    ///
    /// Returns `false` and leaves the habit untouched if `requested` has
    /// not been unlocked.
    pub fn switch_color(&mut self, requested: &str) -> bool {
        match self
            .unlocked_colors
            .iter()
            .find(|c| c.eq_ignore_ascii_case(requested))
        {
            Some(color) => {
                self.color = color.clone();
                true
            }
            None => false,
        }
    }

    fn refresh_unlocks(&mut self, old_count: usize, allow_promotion: bool) -> CompletionChange {
        let new_count = self.completed_count();
        let old_earned = milestone::unlocked_colors(old_count);
        let new_earned = milestone::unlocked_colors(new_count);

        let before = self.unlocked_colors.clone();
        self.unlocked_colors = milestone::merge_unlocked(&before, new_count);
        let newly_unlocked = self
            .unlocked_colors
            .iter()
            .filter(|c| !before.contains(c))
            .cloned()
            .collect();

        let mut promoted_to = None;
        if allow_promotion && new_earned.len() > old_earned.len() {
            if let Some(reward) = new_earned.last() {
                self.color = reward.clone();
                promoted_to = Some(reward.clone());
            }
        }

        CompletionChange {
            days_changed: false,
            newly_unlocked,
            promoted_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::milestone::BASE_COLOR;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn first_mark_keeps_base_color() {
        let mut habit = HabitRecord::new("Read");
        let change = habit.set_completed(day(1), true);
        assert!(change.days_changed);
        assert!(change.promoted_to.is_none());
        assert_eq!(habit.completed_count(), 1);
        assert_eq!(habit.color, BASE_COLOR);
        assert!(habit.is_done);
    }

    #[test]
    fn second_day_promotes_color() {
        let mut habit = HabitRecord::new("Read");
        habit.set_completed(day(1), true);
        let change = habit.set_completed(day(2), true);
        assert_eq!(change.promoted_to.as_deref(), Some("#ff007f"));
        assert_eq!(change.newly_unlocked, vec!["#ff007f".to_string()]);
        assert_eq!(habit.unlocked_colors, vec!["#1a1a1a", "#ff007f"]);
        assert_eq!(habit.color, "#ff007f");
    }

    #[test]
    fn marking_twice_is_idempotent() {
        let mut habit = HabitRecord::new("Read");
        habit.set_completed(day(1), true);
        let snapshot = habit.clone();
        let change = habit.set_completed(day(1), true);
        assert!(!change.days_changed);
        assert_eq!(habit, snapshot);
    }

    #[test]
    fn unmarking_keeps_unlocks_and_color() {
        let mut habit = HabitRecord::new("Read");
        habit.set_completed(day(1), true);
        habit.set_completed(day(2), true);
        let change = habit.set_completed(day(2), false);
        assert!(change.days_changed);
        assert!(change.promoted_to.is_none());
        assert_eq!(habit.completed_count(), 1);
        assert_eq!(habit.unlocked_colors, vec!["#1a1a1a", "#ff007f"]);
        assert_eq!(habit.color, "#ff007f");
        assert!(!habit.is_done);
    }

    #[test]
    fn switch_color_requires_unlock() {
        let mut habit = HabitRecord::new("Read");
        assert!(!habit.switch_color("#ff007f"));
        assert_eq!(habit.color, BASE_COLOR);

        habit.set_completed(day(1), true);
        habit.set_completed(day(2), true);
        assert!(habit.switch_color(BASE_COLOR));
        assert_eq!(habit.color, BASE_COLOR);
        assert!(habit.switch_color("#FF007F"));
        assert_eq!(habit.color, "#ff007f");
    }

    #[test]
    fn detail_save_replaces_days_and_promotes() {
        let mut habit = HabitRecord::new("Read");
        let mut details = HabitDetails::from(&habit);
        details.habit_name = "Read 20 pages".into();
        details.target_count = 30;
        details.completed_days = (1..=4).map(|d| day_key(day(d))).collect();

        let change = habit.apply_details(details, day(4));
        assert!(change.days_changed);
        assert_eq!(habit.habit_name, "Read 20 pages");
        assert_eq!(habit.target_count, 30);
        assert_eq!(habit.color, "#00f3ff");
        assert!(habit.is_done);

        let mut details = HabitDetails::from(&habit);
        details.completed_days.clear();
        habit.apply_details(details, day(4));
        assert_eq!(habit.unlocked_colors.len(), 3);
        assert_eq!(habit.color, "#00f3ff");
        assert!(!habit.is_done);
    }
}
