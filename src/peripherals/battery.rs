//! Battery status check
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use embassy_nrf::{
    gpio::Input,
    peripherals::{P0_12, P0_19},
    saadc::Saadc,
};
use pinetime_watchface::BatteryChargeState;

/// Battery API
pub struct Battery<'a> {
    /// ADC instance for battery voltage measurement (P0.31)
    adc: Saadc<'a, 1>,
    /// Charge indication pin:
    /// high = battery, low = charging
    pin_charge_indication: Input<'a, P0_12>,
    /// Power presence pin:
    /// high = battery, low = external power
    pin_power_presence: Input<'a, P0_19>,
}

impl<'a> Battery<'a> {
    /// Configure battery settings on boot
    pub fn init(
        adc: Saadc<'a, 1>,
        charge_pin: Input<'a, P0_12>,
        power_pin: Input<'a, P0_19>,
    ) -> Self {
        Self {
            adc,
            pin_charge_indication: charge_pin,
            pin_power_presence: power_pin,
        }
    }

    /// Charging state of the battery
    pub fn is_charging(&self) -> bool {
        self.pin_charge_indication.is_low()
    }

    /// Whether the watch sits on its charger
    pub fn is_plugged(&self) -> bool {
        self.pin_power_presence.is_low()
    }

    /// Sample voltage and pins
    pub async fn read(&mut self) -> BatteryChargeState {
        let millivolts = self.get_voltage().await;
        BatteryChargeState {
            charge_percent: BatteryChargeState::percent_from_millivolts(millivolts),
            is_charging: self.is_charging(),
            is_plugged: self.is_plugged(),
        }
    }

    /// Battery voltage in millivolts
    async fn get_voltage(&mut self) -> u16 {
        let mut buf = [0; 1];
        self.adc.sample(&mut buf).await;
        // For detailed explanation of formula check https://wiki.pine64.org/wiki/PineTime
        // Use u32 during calculation to prevent overflow
        (buf[0].max(0) as u32 * 2000 / 1241) as u16
    }
}
