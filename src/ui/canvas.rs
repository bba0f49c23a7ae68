//! In-memory draw target for rendering tests

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    primitives::{PointsIter, Rectangle},
    Pixel,
};

use super::{ColorMode, FOREGROUND_COLOR, WINDOW_SIZE};

pub struct Canvas {
    size: Size,
    pixels: Vec<Option<ColorMode>>,
    /// Pixels written since the last `reset_writes`
    written: Vec<bool>,
}

impl Canvas {
    pub fn new() -> Self {
        let len = (WINDOW_SIZE.width * WINDOW_SIZE.height) as usize;
        Self {
            size: WINDOW_SIZE,
            pixels: vec![None; len],
            written: vec![false; len],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let inside =
            x >= 0 && y >= 0 && (x as u32) < self.size.width && (y as u32) < self.size.height;
        inside.then(|| y as usize * self.size.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<ColorMode> {
        self.index(x, y).and_then(|i| self.pixels[i])
    }

    pub fn lit(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(FOREGROUND_COLOR)
    }

    /// Foreground pixels inside `area`
    pub fn count_lit(&self, area: Rectangle) -> usize {
        area.points().filter(|p| self.lit(p.x, p.y)).count()
    }

    pub fn reset_writes(&mut self) {
        self.written.iter_mut().for_each(|w| *w = false);
    }

    /// Whether anything was written inside `area` since the last reset
    pub fn written_in(&self, area: Rectangle) -> bool {
        area.points()
            .filter_map(|p| self.index(p.x, p.y))
            .any(|i| self.written[i])
    }

    pub fn any_written(&self) -> bool {
        self.written.iter().any(|w| *w)
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = ColorMode;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if let Some(i) = self.index(x, y) {
                self.pixels[i] = Some(color);
                self.written[i] = true;
            }
        }
        Ok(())
    }
}
