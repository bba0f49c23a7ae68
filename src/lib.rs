//! Weather watchface for the PineTime
//!
//! Shows time, date, battery gauge, companion connection, daily steps and
//! the weather reported by the phone. Everything in this crate is plain
//! `no_std` logic drawing onto any [`embedded_graphics`] target, so it runs
//! unchanged in host tests. The firmware binary wires it to the hardware.
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod clock;
pub mod config;
pub mod event;
pub mod message;
pub mod pedometer;
pub mod platform;
pub mod state;
pub mod ui;
pub mod watchface;
pub mod weather;

pub use config::WatchfaceConfig;
pub use event::{BatteryChargeState, Event, HealthEventType};
pub use platform::Platform;
pub use watchface::Watchface;
