//! # Habitgraph Core Library
//!
//! The habit-state engine behind Habitgraph, a habit tracker drawn as a
//! graph of nodes on an infinite canvas. The canvas itself is an external
//! collaborator; this crate owns the data and the rules.
//!
//! ## Architecture
//!
//! - **Milestones**: completed-day thresholds (powers of two) that unlock
//!   reward colors
//! - **Habit records**: per-habit tracking state and the normalization that
//!   migrates older snapshots
//! - **Completion engine**: marking days, detail edits and color switches
//! - **Daily reset**: polled calendar rollover that clears "done today"
//! - **Graph store**: nodes and edges with cascade deletes
//! - **Persistence**: SQLite key-value snapshot, JSON export and import
//!
//! ## Key Components
//!
//! - [`Session`]: graph + persistence + clock, with action dispatch
//! - [`GraphState`]: in-memory nodes and edges
//! - [`HabitRecord`]: one habit's state
//! - [`Persistence`]: load/save/export/import over a [`KvStore`]
//! - [`DailyReset`] / [`ResetTicker`]: rollover detection

pub mod clock;
pub mod error;
pub mod graph;
pub mod habit;
pub mod reset;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, SnapshotError, StorageError};
pub use graph::{Edge, GraphState, Node, NodeData, Position};
pub use habit::{CompletionChange, HabitDetails, HabitRecord, HabitStats};
pub use reset::{DailyReset, ResetTicker};
pub use session::{HabitAction, Session};
pub use storage::{Config, Database, KvStore, MemoryStore, Persistence};
