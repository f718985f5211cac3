//! Time utilities for Bug Smasher
//!
//! All time-sensitive engine logic reads the time through a [`Clock`], so
//! tests can drive due dates and undo windows deterministically with a
//! [`ManualClock`].
//!
//! # Mock Time for Development
//!
//! In debug builds, the `SMASH_MOCK_TIME` environment variable can be set
//! to override the system time seen by [`SystemClock`].
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "SMASH_MOCK_TIME";

/// Format used for mock time and for human-readable timestamps
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached mock time offset from the real time when the process started.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, DATETIME_FORMAT) {
                    Ok(naive_dt) => {
                        if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                            let offset = mock_dt.signed_duration_since(chrono::Local::now());
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset.num_seconds(),
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = DATETIME_FORMAT,
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Source of the current time for the engine
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Calendar date of `now()`, time-of-day stripped
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock (honours `SMASH_MOCK_TIME` in debug builds)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Start at noon on the given date
    pub fn at_date(date: NaiveDate) -> Self {
        let start = date
            .and_hms_opt(12, 0, 0)
            .and_then(|noon| Local.from_local_datetime(&noon).earliest())
            .unwrap_or_else(now);
        Self::new(start)
    }

    pub fn set(&self, to: DateTime<Local>) {
        *self.lock() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.lock();
        *current += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
    }

    pub fn advance_days(&self, days: u64) {
        let mut current = self.lock();
        *current += chrono::Duration::days(days as i64);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Local>> {
        // A poisoned clock still holds a valid time.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.lock()
    }
}

/// `YYYY-MM` key used to bucket monthly statistics
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parse a `YYYY-MM` key back to the first day of that month
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let (year, month) = key.split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Same day-of-month `months` later, clamped to the last day of the
/// target month (Jan 31 + 1 month = Feb 28/29).
pub fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Date `days` later, saturating at the calendar limit
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(chrono::Days::new(days)).unwrap_or(date)
}

/// Format a DateTime with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
