//! Streak reward milestones.
//!
//! Entry `i` of [`MILESTONES`] unlocks once a habit has `2^i` completed
//! days. Entry 0 is the base color and is unlocked unconditionally, so a
//! fresh habit always has exactly one color available.

/// Base color every habit starts with.
pub const BASE_COLOR: &str = "#1a1a1a";

/// A completed-day threshold and the color it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub threshold: usize,
    pub color: &'static str,
}

/// Ordered by ascending threshold.
pub const MILESTONES: [Milestone; 8] = [
    Milestone { threshold: 1, color: BASE_COLOR },
    Milestone { threshold: 2, color: "#ff007f" },
    Milestone { threshold: 4, color: "#00f3ff" },
    Milestone { threshold: 8, color: "#bc13fe" },
    Milestone { threshold: 16, color: "#39ff14" },
    Milestone { threshold: 32, color: "#ffe600" },
    Milestone { threshold: 64, color: "#ff6a00" },
    Milestone { threshold: 128, color: "#ffffff" },
];

/// Colors unlocked by `completed` days, in table order.
///
/// Never empty: the base color is included even when `completed == 0`.
pub fn unlocked_colors(completed: usize) -> Vec<String> {
    MILESTONES
        .iter()
        .enumerate()
        .filter(|(i, m)| *i == 0 || completed >= m.threshold)
        .map(|(_, m)| m.color.to_string())
        .collect()
}

/// Merge previously unlocked colors with those earned by `completed` days.
///
/// The result is in table order and never loses a color present in
/// `previous`, which keeps unlocking monotonic when days are un-marked.
/// Colors that are not part of the table are discarded.
pub fn merge_unlocked(previous: &[String], completed: usize) -> Vec<String> {
    let earned = unlocked_colors(completed).len();
    MILESTONES
        .iter()
        .enumerate()
        .filter(|(i, m)| {
            *i < earned || previous.iter().any(|c| c.eq_ignore_ascii_case(m.color))
        })
        .map(|(_, m)| m.color.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_powers_of_two() {
        for (i, m) in MILESTONES.iter().enumerate() {
            assert_eq!(m.threshold, 1 << i);
        }
    }

    #[test]
    fn zero_days_unlocks_only_base() {
        assert_eq!(unlocked_colors(0), vec![BASE_COLOR.to_string()]);
        assert_eq!(unlocked_colors(1), vec![BASE_COLOR.to_string()]);
    }

    #[test]
    fn second_day_unlocks_pink() {
        assert_eq!(unlocked_colors(2), vec!["#1a1a1a", "#ff007f"]);
        assert_eq!(unlocked_colors(3).len(), 2);
        assert_eq!(unlocked_colors(4).last().map(String::as_str), Some("#00f3ff"));
    }

    #[test]
    fn all_colors_past_last_threshold() {
        assert_eq!(unlocked_colors(10_000).len(), MILESTONES.len());
        assert_eq!(unlocked_colors(10_000).last().map(String::as_str), Some("#ffffff"));
    }

    #[test]
    fn merge_keeps_history_and_drops_unknown() {
        let previous = vec!["#1a1a1a".to_string(), "#FF007F".to_string(), "#123456".to_string()];
        assert_eq!(merge_unlocked(&previous, 0), vec!["#1a1a1a", "#ff007f"]);
        assert_eq!(merge_unlocked(&[], 4), vec!["#1a1a1a", "#ff007f", "#00f3ff"]);
    }
}
