//! Render procedures for the custom drawn surfaces

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    mono_font::{MonoFont, MonoTextStyle},
    primitives::{Line, Primitive, PrimitiveStyle, Rectangle, RoundedRectangle},
    Drawable,
};
use embedded_text::{
    alignment::{HorizontalAlignment, VerticalAlignment},
    style::{HeightMode, TextBoxStyleBuilder, VerticalOverdraw},
    TextBox,
};

use super::{ColorMode, FOREGROUND_COLOR};
use crate::state::{ActivityState, BatteryState};

/// Empty battery outline
pub const GAUGE_OUTLINE: Rectangle = Rectangle::new(Point::new(128, 1), Size::new(14, 9));
const GAUGE_FILL_ORIGIN: Point = Point::new(130, 3);
const GAUGE_FILL_HEIGHT: u32 = 5;
/// Battery terminal
pub const GAUGE_CAP: Rectangle = Rectangle::new(Point::new(142, 3), Size::new(1, 5));

pub const STEP_LINE_Y: i32 = 166;
const STEP_LINE_STROKE: u32 = 2;

pub const DIVIDER_Y: [i32; 2] = [94, 131];

/// Filled gauge columns, one pixel per 10 %.
pub fn gauge_fill_width(percent: u8) -> u32 {
    u32::from(percent.min(100)) / 10
}

pub fn draw_battery_gauge<D>(target: &mut D, battery: &BatteryState) -> Result<(), D::Error>
where
    D: DrawTarget<Color = ColorMode>,
{
    RoundedRectangle::with_equal_corners(GAUGE_OUTLINE, Size::new(1, 1))
        .into_styled(PrimitiveStyle::with_stroke(FOREGROUND_COLOR, 1))
        .draw(target)?;

    let fill = PrimitiveStyle::with_fill(FOREGROUND_COLOR);
    Rectangle::new(
        GAUGE_FILL_ORIGIN,
        Size::new(gauge_fill_width(battery.percent), GAUGE_FILL_HEIGHT),
    )
    .into_styled(fill)
    .draw(target)?;

    GAUGE_CAP.into_styled(fill).draw(target)
}

/// End of the step progress line for a surface `width` pixels wide.
///
/// Proportional to `steps / goal`, never past the surface edge.
pub fn progress_end_x(steps: u32, goal: u32, width: u32) -> u32 {
    let end = u64::from(steps) * u64::from(width) / u64::from(goal.max(1));
    end.min(u64::from(width)) as u32
}

pub fn draw_step_line<D>(
    target: &mut D,
    activity: &ActivityState,
    width: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = ColorMode>,
{
    let end = progress_end_x(activity.steps, activity.goal, width);
    if end == 0 {
        return Ok(());
    }

    Line::new(
        Point::new(0, STEP_LINE_Y),
        Point::new(end as i32, STEP_LINE_Y),
    )
    .into_styled(PrimitiveStyle::with_stroke(FOREGROUND_COLOR, STEP_LINE_STROKE))
    .draw(target)
}

pub fn draw_dividers<D>(target: &mut D, width: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = ColorMode>,
{
    let style = PrimitiveStyle::with_stroke(FOREGROUND_COLOR, 1);
    for y in DIVIDER_Y {
        Line::new(Point::new(0, y), Point::new(width as i32, y))
            .into_styled(style)
            .draw(target)?;
    }
    Ok(())
}

/// Text placement inside a label
#[derive(Clone, Copy)]
pub struct LabelStyle {
    pub font: &'static MonoFont<'static>,
    pub alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
}

pub fn draw_label<D>(
    target: &mut D,
    text: &str,
    bounds: Rectangle,
    style: &LabelStyle,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = ColorMode>,
{
    let character_style = MonoTextStyle::new(style.font, FOREGROUND_COLOR);
    let textbox_style = TextBoxStyleBuilder::new()
        .height_mode(HeightMode::Exact(VerticalOverdraw::FullRowsOnly))
        .alignment(style.alignment)
        .vertical_alignment(style.vertical_alignment)
        .build();

    TextBox::with_textbox_style(text, bounds, character_style, textbox_style).draw(target)?;
    Ok(())
}
