//! Daily reset scheduler.
//!
//! `is_done` is a per-day flag. When the calendar date changes, every
//! habit's flag is re-derived for the new day; completion history, unlocks
//! and colors are left alone.
//!
//! Rollover detection is polled: [`DailyReset::check`] runs once at startup
//! and then on every [`ResetTicker`] tick, so a midnight crossing is picked
//! up within one interval.
//!
//! ```ignore
//! let ticker = ResetTicker::new(config.reset.interval());
//! ticker.run(|| session.run_daily_reset()).await;
//! ```

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::StorageError;
use crate::graph::GraphState;
use crate::storage::{KvStore, Persistence};

/// Tracks the last date a reset was processed.
#[derive(Debug, Clone, Default)]
pub struct DailyReset {
    last_processed: Option<NaiveDate>,
}

impl DailyReset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_processed(&self) -> Option<NaiveDate> {
        self.last_processed
    }

    /// Process a rollover if `today` differs from the last processed date.
    ///
    /// Before the first check the stored last-opened date is used. Returns
    /// whether a rollover was processed.
    ///
    /// # Errors
    /// Returns an error if the new date cannot be persisted. The flags are
    /// already reset at that point.
    pub fn check<S: KvStore>(
        &mut self,
        graph: &mut GraphState,
        persistence: &mut Persistence<S>,
        today: NaiveDate,
    ) -> Result<bool, StorageError> {
        let last = self.last_processed.or_else(|| persistence.last_opened());
        if last == Some(today) {
            self.last_processed = Some(today);
            return Ok(false);
        }

        let cleared = graph.refresh_done_flags(today);
        tracing::info!(from = ?last, to = %today, cleared, "day rollover");
        self.last_processed = Some(today);
        persistence.set_last_opened(today)?;
        Ok(true)
    }
}

/// Periodic driver for [`DailyReset::check`].
///
/// Owns its cancellation token. Dropping the ticker cancels it.
#[derive(Debug)]
pub struct ResetTicker {
    period: Duration,
    token: CancellationToken,
}

impl ResetTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            token: CancellationToken::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// A handle that can stop the ticker from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Call `on_tick` every period until cancelled.
    ///
    /// The immediate first tick of the interval is skipped: the startup
    /// check is expected to have run synchronously already.
    pub async fn run<F>(&self, mut on_tick: F)
    where
        F: FnMut(),
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = interval.tick() => on_tick(),
            }
        }
        tracing::debug!("reset ticker stopped");
    }
}

impl Drop for ResetTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn first_check_without_history_processes() {
        let mut graph = GraphState::default_graph();
        let mut persistence = Persistence::new(MemoryStore::new());
        let mut reset = DailyReset::new();

        assert!(reset.check(&mut graph, &mut persistence, day(1)).unwrap());
        assert_eq!(persistence.last_opened(), Some(day(1)));
        assert!(!reset.check(&mut graph, &mut persistence, day(1)).unwrap());
    }

    #[test]
    fn rollover_clears_done_but_keeps_history() {
        let mut graph = GraphState::default_graph();
        let mut persistence = Persistence::new(MemoryStore::new());
        let mut reset = DailyReset::new();
        reset.check(&mut graph, &mut persistence, day(1)).unwrap();

        graph.toggle_completion("1", true, day(1)).unwrap();
        graph.toggle_completion("1", true, day(1)).unwrap();
        assert!(graph.habit("1").unwrap().is_done);

        assert!(reset.check(&mut graph, &mut persistence, day(2)).unwrap());
        let habit = graph.habit("1").unwrap();
        assert!(!habit.is_done);
        assert!(habit.is_completed_on(day(1)));
        assert_eq!(habit.completed_count(), 1);
    }

    #[test]
    fn stored_date_from_today_skips_reset() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.set_last_opened(day(5)).unwrap();
        let mut graph = GraphState::default_graph();
        graph.habit_mut("1").unwrap().is_done = true;

        let mut reset = DailyReset::new();
        assert!(!reset.check(&mut graph, &mut persistence, day(5)).unwrap());
        assert!(graph.habit("1").unwrap().is_done);
    }

    #[test]
    fn in_memory_date_wins_over_stored_after_start() {
        let mut graph = GraphState::default_graph();
        let mut persistence = Persistence::new(MemoryStore::new());
        let mut reset = DailyReset::new();
        reset.check(&mut graph, &mut persistence, day(1)).unwrap();

        // A save just after midnight records the new date before the tick.
        persistence.set_last_opened(day(2)).unwrap();
        assert!(reset.check(&mut graph, &mut persistence, day(2)).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_runs_until_cancelled() {
        let ticker = ResetTicker::new(Duration::from_secs(60));
        let token = ticker.cancellation_token();
        let started = tokio::time::Instant::now();
        let mut ticks = 0;

        ticker
            .run(|| {
                ticks += 1;
                if ticks == 3 {
                    token.cancel();
                }
            })
            .await;

        assert_eq!(ticks, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(180));
        assert!(ticker.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_never_ticks() {
        let ticker = ResetTicker::new(Duration::from_secs(60));
        ticker.cancel();
        let mut ticks = 0;
        ticker.run(|| ticks += 1).await;
        assert_eq!(ticks, 0);
    }

    #[test]
    fn drop_cancels_token() {
        let ticker = ResetTicker::new(Duration::from_secs(60));
        let token = ticker.cancellation_token();
        drop(ticker);
        assert!(token.is_cancelled());
    }
}
