//! Day-count aggregation for the habit detail view.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::record::HabitRecord;
use crate::clock::{day_key, parse_day_key};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub total_completed_days: usize,
    pub this_month_completed: usize,
    pub target_count: u64,
    /// Every day of the month containing `today`.
    pub month: Vec<CalendarDay>,
}

impl HabitStats {
    pub fn compute(habit: &HabitRecord, today: NaiveDate) -> Self {
        let this_month_completed = habit
            .completed_days
            .iter()
            .filter_map(|key| parse_day_key(key))
            .filter(|d| d.year() == today.year() && d.month() == today.month())
            .count();

        let month = month_days(today)
            .map(|date| CalendarDay {
                day: date.day(),
                completed: habit.is_completed_on(date),
                date: day_key(date),
            })
            .collect();

        Self {
            total_completed_days: habit.completed_count(),
            this_month_completed,
            target_count: habit.target_count,
            month,
        }
    }
}

fn month_days(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = today.with_day(1).unwrap_or(today);
    first
        .iter_days()
        .take_while(move |d| d.month() == first.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_current_month() {
        let mut habit = HabitRecord::new("Run");
        for key in ["2024-01-31", "2024-02-01", "2024-02-14", "2023-02-14", "junk"] {
            habit.completed_days.insert(key.to_string());
        }
        let today = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        let stats = HabitStats::compute(&habit, today);
        assert_eq!(stats.total_completed_days, 5);
        assert_eq!(stats.this_month_completed, 2);
        // 2024 is a leap year.
        assert_eq!(stats.month.len(), 29);
        assert!(stats.month[13].completed);
        assert_eq!(stats.month[13].date, "2024-02-14");
        assert!(stats.month[0].completed);
        assert!(!stats.month[1].completed);
    }
}
