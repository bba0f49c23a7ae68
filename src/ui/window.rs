//! The watchface window and its surfaces
//!
//! Surfaces are created once by [`Window::load`] in a fixed z-order and
//! repainted by [`Window::render`] only when marked dirty. Repainting a
//! surface clears its bounds and redraws every visible surface overlapping
//! them, bottom to top.

use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::{Point, Size},
    mono_font::iso_8859_1::FONT_6X10,
    primitives::Rectangle,
    Drawable,
};
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use profont::PROFONT_24_POINT;

use super::{
    assets::{Asset, Icon},
    draw::{self, LabelStyle},
    ColorMode, BACKGROUND_COLOR, FOREGROUND_COLOR, WINDOW_W,
};
use crate::state::DisplayState;

/// Surfaces in z-order, bottom first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SurfaceId {
    Clock,
    Date,
    BatteryGauge,
    ChargingIcon,
    BluetoothIcon,
    Dividers,
    Temperature,
    City,
    ShoeIcon,
    Steps,
    StepLine,
    WeatherIcon,
}

impl SurfaceId {
    pub const ALL: [SurfaceId; 12] = [
        SurfaceId::Clock,
        SurfaceId::Date,
        SurfaceId::BatteryGauge,
        SurfaceId::ChargingIcon,
        SurfaceId::BluetoothIcon,
        SurfaceId::Dividers,
        SurfaceId::Temperature,
        SurfaceId::City,
        SurfaceId::ShoeIcon,
        SurfaceId::Steps,
        SurfaceId::StepLine,
        SurfaceId::WeatherIcon,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// State backed text of a label
#[derive(Clone, Copy)]
enum TextField {
    Time,
    Date,
    Temperature,
    City,
    Steps,
}

#[derive(Clone, Copy)]
enum Content {
    Text(TextField, LabelStyle),
    Bitmap(Asset),
    WeatherIcon,
    BatteryGauge,
    StepLine,
    Dividers,
}

pub struct Surface {
    id: SurfaceId,
    bounds: Rectangle,
    content: Content,
    hidden: bool,
    dirty: bool,
}

impl Surface {
    fn new(id: SurfaceId, bounds: Rectangle, content: Content) -> Self {
        Self {
            id,
            bounds,
            content,
            hidden: false,
            dirty: true,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn overlaps(&self, area: &Rectangle) -> bool {
        let common = self.bounds.intersection(area);
        common.size.width > 0 && common.size.height > 0
    }

    fn draw<D>(&self, state: &DisplayState, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        match self.content {
            Content::Text(field, style) => {
                let mut buf = [0u8; 24];
                let text = match field {
                    TextField::Time => state.clock.time.as_str(),
                    TextField::Date => state.clock.date.as_str(),
                    TextField::Temperature => state.weather.temperature.as_str(),
                    TextField::City => state.weather.city.as_str(),
                    TextField::Steps => format_no_std::show(
                        &mut buf,
                        format_args!("{}/{}", state.activity.steps, state.activity.goal),
                    )
                    .unwrap_or_default(),
                };
                draw::draw_label(target, text, self.bounds, &style)
            }
            Content::Bitmap(asset) => {
                Icon::new(asset, self.bounds.top_left, FOREGROUND_COLOR).draw(target)
            }
            Content::WeatherIcon => match state.weather.icon {
                Some(icon) => {
                    Icon::new(icon.asset(), self.bounds.top_left, FOREGROUND_COLOR).draw(target)
                }
                None => Ok(()),
            },
            Content::BatteryGauge => draw::draw_battery_gauge(target, &state.battery),
            Content::StepLine => draw::draw_step_line(target, &state.activity, WINDOW_W),
            Content::Dividers => draw::draw_dividers(target, WINDOW_W),
        }
    }
}

const fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}

const CENTERED_SMALL: LabelStyle = LabelStyle {
    font: &FONT_6X10,
    alignment: HorizontalAlignment::Center,
    vertical_alignment: VerticalAlignment::Top,
};

const LEFT_SMALL: LabelStyle = LabelStyle {
    font: &FONT_6X10,
    alignment: HorizontalAlignment::Left,
    vertical_alignment: VerticalAlignment::Top,
};

const CLOCK: LabelStyle = LabelStyle {
    font: &PROFONT_24_POINT,
    alignment: HorizontalAlignment::Center,
    vertical_alignment: VerticalAlignment::Middle,
};

/// The single application window
pub struct Window {
    surfaces: [Surface; 12],
}

impl Window {
    /// Create every surface. All of them start dirty.
    pub fn load() -> Self {
        use SurfaceId::*;

        let surfaces = [
            Surface::new(Clock, rect(0, 0, WINDOW_W, 70), Content::Text(TextField::Time, CLOCK)),
            Surface::new(
                Date,
                rect(0, 70, WINDOW_W, 16),
                Content::Text(TextField::Date, CENTERED_SMALL),
            ),
            Surface::new(BatteryGauge, rect(128, 1, 15, 9), Content::BatteryGauge),
            Surface::new(ChargingIcon, rect(118, 0, 10, 10), Content::Bitmap(Asset::Lightning)),
            Surface::new(
                BluetoothIcon,
                rect(111, 1, 9, 10),
                Content::Bitmap(Asset::BluetoothDisconnected),
            ),
            Surface::new(Dividers, rect(0, 94, WINDOW_W, 38), Content::Dividers),
            Surface::new(
                Temperature,
                rect(30, 104, 28, 16),
                Content::Text(TextField::Temperature, CENTERED_SMALL),
            ),
            Surface::new(City, rect(58, 104, 86, 16), Content::Text(TextField::City, LEFT_SMALL)),
            Surface::new(ShoeIcon, rect(10, 141, 16, 16), Content::Bitmap(Asset::Shoe)),
            Surface::new(
                Steps,
                rect(30, 141, 114, 16),
                Content::Text(TextField::Steps, LEFT_SMALL),
            ),
            Surface::new(StepLine, rect(0, 164, WINDOW_W, 4), Content::StepLine),
            Surface::new(WeatherIcon, rect(10, 104, 16, 16), Content::WeatherIcon),
        ];

        Self { surfaces }
    }

    pub fn surface(&self, id: SurfaceId) -> &Surface {
        &self.surfaces[id.index()]
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    /// Repaint `id` on the next render.
    pub fn mark_dirty(&mut self, id: SurfaceId) {
        self.surfaces[id.index()].dirty = true;
    }

    /// Show or hide a surface. Changing visibility marks it dirty.
    pub fn set_hidden(&mut self, id: SurfaceId, hidden: bool) {
        let surface = &mut self.surfaces[id.index()];
        if surface.hidden != hidden {
            surface.hidden = hidden;
            surface.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.surfaces.iter().any(|surface| surface.dirty)
    }

    /// Repaint dirty surfaces and return how many were repainted.
    pub fn render<D>(&mut self, state: &DisplayState, target: &mut D) -> Result<usize, D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        let mut repainted = 0;

        for index in 0..self.surfaces.len() {
            if !self.surfaces[index].dirty {
                continue;
            }
            let area = self.surfaces[index].bounds;

            target.fill_solid(&area, BACKGROUND_COLOR)?;
            let mut clipped = target.clipped(&area);
            for surface in self
                .surfaces
                .iter()
                .filter(|surface| !surface.hidden && surface.overlaps(&area))
            {
                surface.draw(state, &mut clipped)?;
            }

            self.surfaces[index].dirty = false;
            repainted += 1;
        }

        Ok(repainted)
    }
}
