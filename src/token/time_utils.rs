//! Time utilities for clock-derived token inputs.
//!
//! Both token schemes read "now" through a [`TimeProviderFn`] so that the
//! clock can be pinned in tests and replaced in deployments that use a
//! synchronised time source.

use crate::TokenError;
use chrono::{DateTime, NaiveDate};
use std::time::{SystemTime, UNIX_EPOCH};

/// A function that provides the current Unix timestamp in seconds.
pub type TimeProviderFn = Box<dyn Fn() -> Result<u64, TokenError> + Send + Sync>;

/// Get current timestamp in seconds since Unix epoch.
///
/// In the extremely rare case where system time is before Unix epoch,
/// it returns an error instead of panicking.
pub fn current_timestamp() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::CryptoError("System time is before Unix epoch".to_string()))
}

/// The time provider used when none is configured.
pub(crate) fn system_time_provider() -> TimeProviderFn {
    Box::new(current_timestamp)
}

/// The UTC calendar date containing `timestamp`.
pub fn utc_date(timestamp: u64) -> Result<NaiveDate, TokenError> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|datetime| datetime.date_naive())
        .ok_or_else(|| {
            TokenError::CryptoError(format!("Timestamp {timestamp} is outside the calendar range"))
        })
}

/// Index of the `step_seconds`-long bucket containing `timestamp`.
///
/// `step_seconds` is validated as non-zero when a factory is configured.
pub(crate) fn time_counter(timestamp: u64, step_seconds: u64) -> u64 {
    timestamp / step_seconds.max(1)
}
