//! Time keeping module for PineTime

use chrono::NaiveDateTime;
use embassy_time::{Duration, Instant};
use pinetime_watchface::clock;

/// A known UTC time and the uptime at which it was valid
pub struct TimeReference {
    /// Clock time, seconds since the Unix epoch
    utc_secs: i64,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Reference taken right now
    pub fn from_utc_secs(utc_secs: i64) -> Self {
        Self {
            utc_secs,
            instant: Instant::now(),
        }
    }
}

pub struct TimeManager {
    reference: TimeReference,
    /// Local time offset in seconds
    utc_offset_secs: i32,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub fn init(utc_secs: i64, utc_offset_secs: i32) -> Self {
        Self {
            reference: TimeReference::from_utc_secs(utc_secs),
            utc_offset_secs,
        }
    }

    /// Current UTC time in seconds since the Unix epoch
    pub fn utc_secs(&self) -> i64 {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference.utc_secs + elapsed.as_secs() as i64
    }

    /// Current local time
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        clock::local_from_timestamp(self.utc_secs(), self.utc_offset_secs)
    }

    /// Time left until the next full minute
    pub fn until_next_minute(&self) -> Duration {
        let local = self.utc_secs() + i64::from(self.utc_offset_secs);
        Duration::from_secs(60 - local.rem_euclid(60) as u64)
    }

    /// Replace the reference with a local time received from the phone
    pub fn set_local_time(&mut self, local: NaiveDateTime) {
        let utc_secs = local.and_utc().timestamp() - i64::from(self.utc_offset_secs);
        self.reference = TimeReference::from_utc_secs(utc_secs);
    }
}
