//! Display control module for PineTime

use display_interface_spi::SPIInterface;
use embassy_nrf::{
    gpio::Output,
    peripherals::{P0_18, P0_25, P0_26},
    spim::{self, Spim},
};
use embassy_time::Delay;
use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::Point,
};
use mipidsi::{models::ST7789, Builder, Orientation};
use pinetime_watchface::{
    ui::{BACKGROUND_COLOR, WINDOW_H, WINDOW_W},
    Watchface,
};

const LCD_W: u16 = 240;
const LCD_H: u16 = 240;

/// Top left corner of the watchface window, centered on the panel
const WINDOW_ORIGIN: Point = Point::new(
    (LCD_W as i32 - WINDOW_W as i32) / 2,
    (LCD_H as i32 - WINDOW_H as i32) / 2,
);

type Lcd<'a, SPI> = mipidsi::Display<
    SPIInterface<Spim<'a, SPI>, Output<'a, P0_18>, Output<'a, P0_25>>,
    ST7789,
    Output<'a, P0_26>,
>;

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// Controller did not accept the init sequence
    Init,
    /// SPI transfer failed
    Bus,
}

pub struct Display<'a, SPI>
where
    SPI: spim::Instance,
{
    lcd: Lcd<'a, SPI>,
}

impl<'a, SPI> Display<'a, SPI>
where
    SPI: spim::Instance,
{
    /// Configure display settings on boot and blank the panel
    pub fn init(
        spim: Spim<'a, SPI>,
        cs_pin: Output<'a, P0_25>,
        dc_pin: Output<'a, P0_18>,
        rst_pin: Output<'a, P0_26>,
    ) -> Result<Self, Error> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Init)?;

        let mut display = Self { lcd };
        display.clear()?;
        Ok(display)
    }

    /// Clear the whole panel, including the border around the window
    pub fn clear(&mut self) -> Result<(), Error> {
        self.lcd.clear(BACKGROUND_COLOR).map_err(|_| Error::Bus)
    }

    /// Push every dirty surface of the watchface to the panel
    pub fn draw(&mut self, watchface: &mut Watchface) -> Result<usize, Error> {
        let mut window = self.lcd.translated(WINDOW_ORIGIN);
        watchface.render(&mut window).map_err(|_| Error::Bus)
    }
}
