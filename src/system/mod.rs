//! System services: chip configuration, BLE and time keeping

pub mod bluetooth;
pub mod config;
pub mod time;
