//! Events delivered to the watchface
//!
//! Every platform callback is represented as data and fed to
//! [`Watchface::handle`](crate::watchface::Watchface::handle) one at a time.

use chrono::NaiveDateTime;

use crate::message::{InboxMessage, MessageError};

/// Battery reading as reported by the power sensing hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryChargeState {
    /// Charge in percent, 0 to 100
    pub charge_percent: u8,
    /// Battery is being charged
    pub is_charging: bool,
    /// External power is present
    pub is_plugged: bool,
}

impl BatteryChargeState {
    /// Estimate the charge from the battery voltage in millivolts.
    ///
    /// Linear between fixed points: 3.45 V empty, 3.70 V half, 4.20 V full.
    pub fn percent_from_millivolts(millivolts: u16) -> u8 {
        (match millivolts {
            0..=3449 => 0,
            3450..=3699 => (millivolts - 3450) / 5,
            3700..=4199 => 50 + (millivolts - 3700) / 10,
            _ => 100,
        }) as u8
    }
}

/// Kinds of health service notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthEventType {
    /// All metrics should be considered stale, e.g. after midnight
    SignificantUpdate,
    /// Step count changed
    MovementUpdate,
    /// Sleep data changed
    SleepUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Minute boundary, carries the new local time
    Tick(NaiveDateTime),
    BatteryChanged(BatteryChargeState),
    /// Companion link went up (`true`) or down (`false`)
    ConnectionChanged(bool),
    Health(HealthEventType),
    InboxReceived(InboxMessage),
    /// Inbound message could not be delivered or decoded
    InboxDropped(MessageError),
    OutboxSent,
    OutboxFailed(MessageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_from_millivolts() {
        assert_eq!(BatteryChargeState::percent_from_millivolts(0), 0);
        assert_eq!(BatteryChargeState::percent_from_millivolts(3449), 0);
        assert_eq!(BatteryChargeState::percent_from_millivolts(3450), 0);
        assert_eq!(BatteryChargeState::percent_from_millivolts(3575), 25);
        assert_eq!(BatteryChargeState::percent_from_millivolts(3700), 50);
        assert_eq!(BatteryChargeState::percent_from_millivolts(3950), 75);
        assert_eq!(BatteryChargeState::percent_from_millivolts(4199), 99);
        assert_eq!(BatteryChargeState::percent_from_millivolts(4200), 100);
        assert_eq!(BatteryChargeState::percent_from_millivolts(u16::MAX), 100);
    }

    #[test]
    fn test_percent_never_decreases_with_voltage() {
        let mut last = 0;
        for millivolts in (3000..4500).step_by(5) {
            let percent = BatteryChargeState::percent_from_millivolts(millivolts);
            assert!(percent >= last);
            last = percent;
        }
    }
}
