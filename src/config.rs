//! Watchface configuration

/// Daily step goal shown next to the step count
pub const STEP_GOAL: u32 = 10_000;

/// Minutes between weather requests to the companion
pub const WEATHER_REFRESH_MINUTES: u32 = 30;

/// Offset of local time from UTC
pub const UTC_OFFSET_SECS: i32 = 3_600;

/// Compile-time tunables of the watchface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchfaceConfig {
    /// Step goal, never zero
    step_goal: u32,
    /// Weather refresh period in minutes, zero disables requests
    weather_refresh_minutes: u32,
    /// Local time offset in seconds
    utc_offset_secs: i32,
}

impl Default for WatchfaceConfig {
    fn default() -> Self {
        Self {
            step_goal: STEP_GOAL,
            weather_refresh_minutes: WEATHER_REFRESH_MINUTES,
            utc_offset_secs: UTC_OFFSET_SECS,
        }
    }
}

impl WatchfaceConfig {
    /// Set the daily step goal. A goal of zero is bumped to one.
    pub const fn with_step_goal(mut self, goal: u32) -> Self {
        self.step_goal = if goal == 0 { 1 } else { goal };
        self
    }

    pub const fn with_weather_refresh_minutes(mut self, minutes: u32) -> Self {
        self.weather_refresh_minutes = minutes;
        self
    }

    pub const fn with_utc_offset_secs(mut self, offset: i32) -> Self {
        self.utc_offset_secs = offset;
        self
    }

    pub fn step_goal(&self) -> u32 {
        self.step_goal
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs
    }

    /// Whether a tick at `minute` past the hour should request new weather.
    pub fn weather_due(&self, minute: u32) -> bool {
        self.weather_refresh_minutes != 0 && minute % self.weather_refresh_minutes == 0
    }
}
