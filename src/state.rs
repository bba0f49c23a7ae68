//! Latest known values shown on the watchface

use chrono::NaiveDateTime;
use heapless::String;

use crate::{
    clock,
    event::BatteryChargeState,
    message::{Field, InboxMessage},
    weather::IconCode,
};

pub const TIME_LEN: usize = 8;
pub const DATE_LEN: usize = 32;

/// Clock and date label texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockState {
    pub time: String<TIME_LEN>,
    pub date: String<DATE_LEN>,
}

impl ClockState {
    /// Reformat both texts for `now`.
    pub fn set(&mut self, now: &NaiveDateTime) {
        self.time.clear();
        self.date.clear();
        // Both buffers hold the longest possible text
        let written = clock::write_time(&mut self.time, now)
            .and_then(|()| clock::write_date(&mut self.date, now));
        debug_assert!(written.is_ok(), "clock label overflow");
        if written.is_err() {
            error!("Clock label overflow");
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryState {
    /// Charge in percent, 0 to 100
    pub percent: u8,
    /// Charging or plugged in
    pub charging: bool,
}

impl From<BatteryChargeState> for BatteryState {
    fn from(charge: BatteryChargeState) -> Self {
        Self {
            percent: charge.charge_percent.min(100),
            charging: charge.is_charging || charge.is_plugged,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectivityState {
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActivityState {
    /// Steps since midnight
    pub steps: u32,
    /// Daily goal, never zero
    pub goal: u32,
}

/// Last weather report from the companion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherState {
    pub city: Field,
    pub temperature: Field,
    /// Raw code as received, may be unknown
    pub icon_code: Field,
    /// Icon currently on screen
    pub icon: Option<IconCode>,
}

impl WeatherState {
    /// Store the report if it carries city, temperature and icon code.
    ///
    /// Returns whether the stored fields changed. A partial message leaves
    /// everything untouched.
    pub fn apply(&mut self, message: &InboxMessage) -> bool {
        let (Some(city), Some(temperature), Some(icon_code)) =
            (&message.city, &message.temperature, &message.icon)
        else {
            return false;
        };

        let changed = self.city != *city
            || self.temperature != *temperature
            || self.icon_code != *icon_code;
        self.city = city.clone();
        self.temperature = temperature.clone();
        self.icon_code = icon_code.clone();
        changed
    }

    /// Map the stored code onto an icon.
    ///
    /// Unknown codes keep the previous icon and return `false`.
    pub fn resolve_icon(&mut self) -> bool {
        match self.icon_code.parse::<IconCode>() {
            Ok(icon) => {
                self.icon = Some(icon);
                true
            }
            Err(_) => false,
        }
    }
}

/// Everything the render procedures read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub clock: ClockState,
    pub battery: BatteryState,
    pub connectivity: ConnectivityState,
    pub activity: ActivityState,
    pub weather: WeatherState,
}

impl DisplayState {
    pub fn new(step_goal: u32) -> Self {
        Self {
            clock: ClockState::default(),
            battery: BatteryState::default(),
            connectivity: ConnectivityState::default(),
            activity: ActivityState {
                steps: 0,
                goal: step_goal.max(1),
            },
            weather: WeatherState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::truncated;

    fn report(city: &str, temp: Option<&str>, icon: &str) -> InboxMessage {
        InboxMessage {
            city: Some(truncated(city)),
            temperature: temp.map(truncated),
            icon: Some(truncated(icon)),
        }
    }

    #[test]
    fn test_charging_includes_plugged_in() {
        let plugged = BatteryChargeState {
            charge_percent: 100,
            is_charging: false,
            is_plugged: true,
        };
        assert_eq!(
            BatteryState::from(plugged),
            BatteryState {
                percent: 100,
                charging: true
            }
        );
        assert!(!BatteryState::from(BatteryChargeState::default()).charging);
    }

    #[test]
    fn test_battery_percent_is_capped() {
        let reading = BatteryChargeState {
            charge_percent: 130,
            ..Default::default()
        };
        assert_eq!(BatteryState::from(reading).percent, 100);
    }

    #[test]
    fn test_weather_update_is_idempotent() {
        let mut weather = WeatherState::default();
        let message = report("Austin", Some("98°"), "clear-day");

        assert!(weather.apply(&message));
        weather.resolve_icon();
        let first = weather.clone();

        assert!(!weather.apply(&message));
        weather.resolve_icon();
        assert_eq!(weather, first);
    }

    #[test]
    fn test_partial_weather_update_changes_nothing() {
        let mut weather = WeatherState::default();
        weather.apply(&report("Austin", Some("98°"), "clear-day"));
        weather.resolve_icon();
        let before = weather.clone();

        assert!(!weather.apply(&report("Boston", None, "snow")));
        weather.resolve_icon();
        assert_eq!(weather, before);
        assert_eq!(weather.icon, Some(IconCode::ClearDay));
    }

    #[test]
    fn test_unknown_icon_keeps_previous_icon() {
        let mut weather = WeatherState::default();
        weather.apply(&report("Austin", Some("98°"), "rain"));
        assert!(weather.resolve_icon());

        weather.apply(&report("Austin", Some("97°"), "hail"));
        assert!(!weather.resolve_icon());
        assert_eq!(weather.icon, Some(IconCode::Rain));
        assert_eq!(weather.icon_code.as_str(), "hail");
    }

    #[test]
    fn test_clock_texts() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let mut clock = ClockState::default();
        clock.set(&now);
        assert_eq!(clock.time.as_str(), " 9:05");
        assert_eq!(clock.date.as_str(), "Tuesday, January 2");
    }

    #[test]
    fn test_longest_clock_texts_fit() {
        let now = chrono::NaiveDate::from_ymd_opt(2026, 9, 30)
            .unwrap()
            .and_hms_opt(22, 59, 0)
            .unwrap();
        let mut clock = ClockState::default();
        clock.set(&now);
        assert_eq!(clock.time.as_str(), "10:59");
        assert_eq!(clock.date.as_str(), "Wednesday, September 30");
    }
}
