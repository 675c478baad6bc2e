mod completion;
pub mod milestone;
mod normalize;
mod record;
mod stats;

pub use completion::{CompletionChange, HabitDetails};
pub use milestone::{unlocked_colors, Milestone, BASE_COLOR, MILESTONES};
pub use normalize::normalize_habit;
pub use record::HabitRecord;
pub use stats::{CalendarDay, HabitStats};
