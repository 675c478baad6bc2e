//! Time source abstraction.
//!
//! Completion tracking is keyed by the user's local calendar date, so the
//! engine never reads the system clock directly. Production code uses
//! [`SystemClock`]; tests drive a [`ManualClock`] across day boundaries.

use std::cell::Cell;

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Canonical `YYYY-MM-DD` format for completed-day keys.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub trait Clock {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;

    /// Current instant, used for export timestamps and id generation.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock whose date only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    today: Cell<NaiveDate>,
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self {
            today: Cell::new(today),
            now: Cell::new(now),
        }
    }

    pub fn set_today(&self, date: NaiveDate) {
        let shift = date - self.today.get();
        self.today.set(date);
        self.now.set(self.now.get() + shift);
    }

    pub fn advance_days(&self, days: i64) {
        self.set_today(self.today.get() + chrono::Duration::days(days));
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Format a date as a completed-day key.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Parse a completed-day key. Returns `None` for anything that is not a
/// valid `YYYY-MM-DD` date.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day_key(date), "2024-03-07");
        assert_eq!(parse_day_key("2024-03-07"), Some(date));
        assert_eq!(parse_day_key("not-a-date"), None);
    }

    #[test]
    fn manual_clock_advances_across_month_end() {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(clock.now().date_naive(), clock.today());
    }
}
