//! Compiled-in monochrome icons
//!
//! Each row is a `u16` with the leftmost pixel in the most significant bit.
//! Set bits are drawn in the foreground color, clear bits are transparent.

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    Drawable, Pixel,
};

use super::ColorMode;

/// 1 bit per pixel image, at most 16 pixels wide
pub struct Bitmap {
    width: u32,
    rows: &'static [u16],
}

impl Bitmap {
    const fn new(width: u32, rows: &'static [u16]) -> Self {
        Self { width, rows }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.rows.len() as u32)
    }

    /// Offsets of all set pixels
    pub fn pixels(&self) -> impl Iterator<Item = Point> + '_ {
        self.rows.iter().enumerate().flat_map(move |(y, &row)| {
            (0..self.width)
                .filter(move |x| row & (0x8000 >> x) != 0)
                .map(move |x| Point::new(x as i32, y as i32))
        })
    }
}

/// A bitmap placed on screen
pub struct Icon {
    bitmap: &'static Bitmap,
    origin: Point,
    color: ColorMode,
}

impl Icon {
    pub fn new(asset: Asset, origin: Point, color: ColorMode) -> Self {
        Self {
            bitmap: asset.bitmap(),
            origin,
            color,
        }
    }
}

impl Drawable for Icon {
    type Color = ColorMode;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        target.draw_iter(
            self.bitmap
                .pixels()
                .map(|offset| Pixel(self.origin + offset, self.color)),
        )
    }
}

/// Identifiers of every bitmap in the asset store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Asset {
    ClearSkyDay,
    ClearSkyNight,
    Rain,
    Snow,
    Sleet,
    Wind,
    Fog,
    Cloudy,
    PartlyCloudyDay,
    PartlyCloudyNight,
    /// Charging bolt
    Lightning,
    BluetoothDisconnected,
    /// Step counter
    Shoe,
}

impl Asset {
    pub fn bitmap(self) -> &'static Bitmap {
        match self {
            Asset::ClearSkyDay => &CLEAR_SKY_DAY,
            Asset::ClearSkyNight => &CLEAR_SKY_NIGHT,
            Asset::Rain => &RAIN,
            Asset::Snow => &SNOW,
            Asset::Sleet => &SLEET,
            Asset::Wind => &WIND,
            Asset::Fog => &FOG,
            Asset::Cloudy => &CLOUDY,
            Asset::PartlyCloudyDay => &PARTLY_CLOUDY_DAY,
            Asset::PartlyCloudyNight => &PARTLY_CLOUDY_NIGHT,
            Asset::Lightning => &LIGHTNING,
            Asset::BluetoothDisconnected => &BLUETOOTH_DISCONNECTED,
            Asset::Shoe => &SHOE,
        }
    }
}

static CLEAR_SKY_DAY: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000100000000,
        0b0010000100000100,
        0b0001000000001000,
        0b0000001110000000,
        0b0000011111000000,
        0b0000111111100000,
        0b0000111111100000,
        0b1110111111101110,
        0b0000111111100000,
        0b0000111111100000,
        0b0000011111000000,
        0b0000001110000000,
        0b0001000000001000,
        0b0010000100000100,
        0b0000000100000000,
        0b0000000000000000,
    ],
);

static CLEAR_SKY_NIGHT: Bitmap = Bitmap::new(
    16,
    &[
        0b0000001111000000,
        0b0000111100000000,
        0b0001111000000000,
        0b0011110000000000,
        0b0011100000000000,
        0b0111100000000000,
        0b0111100000000000,
        0b0111100000000000,
        0b0111100000000000,
        0b0111110000000000,
        0b0011111000000100,
        0b0011111110011100,
        0b0001111111111000,
        0b0000111111110000,
        0b0000001111000000,
        0b0000000000000000,
    ],
);

static CLOUDY: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000000000000,
        0b0000000000000000,
        0b0000000000000000,
        0b0000011110000000,
        0b0000110011000000,
        0b0001100001111000,
        0b0011000000001100,
        0b0110000000000110,
        0b0100000000000010,
        0b0100000000000010,
        0b0110000000000110,
        0b0011111111111100,
        0b0000000000000000,
        0b0000000000000000,
        0b0000000000000000,
        0b0000000000000000,
    ],
);

static RAIN: Bitmap = Bitmap::new(
    16,
    &[
        0b0000011110000000,
        0b0000110011000000,
        0b0001100001111000,
        0b0011000000001100,
        0b0110000000000110,
        0b0100000000000010,
        0b0110000000000110,
        0b0011111111111100,
        0b0000000000000000,
        0b0001000100010000,
        0b0010001000100000,
        0b0000000000000000,
        0b0000100010001000,
        0b0001000100010000,
        0b0000000000000000,
        0b0000000000000000,
    ],
);

static SNOW: Bitmap = Bitmap::new(
    16,
    &[
        0b0000011110000000,
        0b0000110011000000,
        0b0001100001111000,
        0b0011000000001100,
        0b0110000000000110,
        0b0100000000000010,
        0b0110000000000110,
        0b0011111111111100,
        0b0000000000000000,
        0b0010000100001000,
        0b0111001110011100,
        0b0010000100001000,
        0b0000000000000000,
        0b0000100001000000,
        0b0001110011100000,
        0b0000100001000000,
    ],
);

static SLEET: Bitmap = Bitmap::new(
    16,
    &[
        0b0000011110000000,
        0b0000110011000000,
        0b0001100001111000,
        0b0011000000001100,
        0b0110000000000110,
        0b0100000000000010,
        0b0110000000000110,
        0b0011111111111100,
        0b0000000000000000,
        0b0001000000010000,
        0b0010001000100000,
        0b0000011100000000,
        0b0000001000000000,
        0b0001000000010000,
        0b0010000000100000,
        0b0000000000000000,
    ],
);

static WIND: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000000000000,
        0b0000000001100000,
        0b0000000010010000,
        0b0000000000010000,
        0b1111111111100000,
        0b0000000000000000,
        0b1111111111111000,
        0b0000000000000100,
        0b0000000000000100,
        0b1111111111111000,
        0b0000000000000000,
        0b1111111110000000,
        0b0000000001000000,
        0b0000000101000000,
        0b0000000010000000,
        0b0000000000000000,
    ],
);

static FOG: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000000000000,
        0b0000000000000000,
        0b0011111111111100,
        0b0000000000000000,
        0b0111111111111110,
        0b0000000000000000,
        0b0001111111111000,
        0b0000000000000000,
        0b0111111111111110,
        0b0000000000000000,
        0b0011111111111100,
        0b0000000000000000,
        0b0000111111110000,
        0b0000000000000000,
        0b0000000000000000,
        0b0000000000000000,
    ],
);

static PARTLY_CLOUDY_DAY: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000010000000,
        0b0000100000001000,
        0b0000000111000000,
        0b0000001111100000,
        0b0010011111110010,
        0b0000011111110000,
        0b0000011110000000,
        0b0000110011000000,
        0b0001100001111000,
        0b0011000000001100,
        0b0110000000000110,
        0b0100000000000010,
        0b0110000000000110,
        0b0011111111111100,
        0b0000000000000000,
        0b0000000000000000,
    ],
);

static PARTLY_CLOUDY_NIGHT: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000011100000,
        0b0000000111000000,
        0b0000001110000000,
        0b0000001110000000,
        0b0000001111000110,
        0b0000000111111100,
        0b0000011110000000,
        0b0000110011000000,
        0b0001100001111000,
        0b0011000000001100,
        0b0110000000000110,
        0b0100000000000010,
        0b0110000000000110,
        0b0011111111111100,
        0b0000000000000000,
        0b0000000000000000,
    ],
);

static LIGHTNING: Bitmap = Bitmap::new(
    10,
    &[
        0b0000011000000000,
        0b0000110000000000,
        0b0001100000000000,
        0b0011000000000000,
        0b0111111000000000,
        0b0000110000000000,
        0b0001100000000000,
        0b0011000000000000,
        0b0110000000000000,
        0b0100000000000000,
    ],
);

static BLUETOOTH_DISCONNECTED: Bitmap = Bitmap::new(
    9,
    &[
        0b1000100000000000,
        0b0100110000000000,
        0b0010101000000000,
        0b0001110000000000,
        0b0000100000000000,
        0b0001110000000000,
        0b0010101000000000,
        0b0000110000000000,
        0b0000100100000000,
        0b0000000010000000,
    ],
);

static SHOE: Bitmap = Bitmap::new(
    16,
    &[
        0b0000000000000000,
        0b0000000000000000,
        0b0111000000000000,
        0b0101100000000000,
        0b0100110000000000,
        0b0100011000000000,
        0b0100001100000000,
        0b0100000111000000,
        0b0100000001110000,
        0b0100000000011100,
        0b0100000000000110,
        0b0111111111111110,
        0b0111111111111110,
        0b0000000000000000,
        0b0000000000000000,
        0b0000000000000000,
    ],
);
