//! Drivers for the PineTime hardware used by the watchface

pub mod accelerometer;
pub mod backlight;
pub mod battery;
pub mod display;
pub mod vibration;
