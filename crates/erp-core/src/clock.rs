//! Time source for document numbering and record timestamps

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

/// Source of the current date and time
pub trait Clock {
    /// Current calendar date in the local time zone
    fn today(&self) -> NaiveDate;

    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as an RFC 3339 timestamp with millisecond precision
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Wall-clock time
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

/// A clock pinned to one instant. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Pin the clock to midday UTC on the given date
    pub fn on(date: NaiveDate) -> Self {
        let instant = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_default();
        Self { date, instant }
    }

    /// Pin the clock to an explicit local date and instant
    pub fn at(date: NaiveDate, instant: DateTime<Utc>) -> Self {
        Self { date, instant }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }

    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_timestamp() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 6).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.timestamp(), "2024-10-06T12:00:00.000Z");
    }
}
