//! UI definitions module
//!
//! The watchface is laid out on a 144 x 168 window. The firmware places the
//! window in the middle of the 240 x 240 panel.

use embedded_graphics::{
    geometry::Size,
    pixelcolor::{Rgb565, RgbColor},
};

pub mod assets;
pub mod draw;
pub mod window;

#[cfg(test)]
pub(crate) mod canvas;

pub type ColorMode = Rgb565;

pub const BACKGROUND_COLOR: ColorMode = Rgb565::BLACK;
pub const FOREGROUND_COLOR: ColorMode = Rgb565::WHITE;

pub const WINDOW_W: u32 = 144;
pub const WINDOW_H: u32 = 168;
pub const WINDOW_SIZE: Size = Size::new(WINDOW_W, WINDOW_H);
