//! Animated regional map segment.

use image::RgbImage;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rusttype::Font;

use retrocast_forecast_model::ForecastRecord;

use crate::chrome::{draw_background, draw_bottom_bar};
use crate::icons::draw_icon;
use crate::text::{draw_text, draw_text_centered};
use crate::theme::{TEXT_GRAY, TEXT_WHITE, TEXT_YELLOW};

pub const MAP_BOTTOM_TEXT: &str = "REGIONAL CONDITIONS";

/// Region outline in layout pixels: left, top, right, bottom (inclusive).
pub const MAP_OUTLINE: (i32, i32, i32, i32) = (50, 100, 590, 380);

/// City highlighted in map frame `frame` of a map with `cities` entries.
///
/// The highlight walks through the cities and then skips one frame, so with
/// four cities frames 0 and 5 show no highlight and frame 1 highlights the
/// first city.
pub fn highlighted_city(frame: usize, cities: usize) -> Option<usize> {
    match frame % (cities + 1) {
        0 => None,
        slot => Some(slot - 1),
    }
}

/// Draw map still `frame` onto a layout-sized canvas.
pub fn draw_map_frame(
    img: &mut RgbImage,
    font: Option<&Font<'_>>,
    record: &ForecastRecord,
    frame: usize,
) {
    draw_background(img);

    let (left, top, right, bottom) = MAP_OUTLINE;
    for inset in 0..2 {
        let rect = Rect::at(left + inset, top + inset).of_size(
            (right - left + 1 - 2 * inset) as u32,
            (bottom - top + 1 - 2 * inset) as u32,
        );
        draw_hollow_rect_mut(img, rect, TEXT_GRAY);
    }
    draw_text_centered(
        img,
        font,
        TEXT_YELLOW,
        (left + right) / 2,
        top - 10,
        20.0,
        &record.map_title,
    );

    let highlight = highlighted_city(frame, record.map.len());
    for (i, reading) in record.map.iter().enumerate() {
        if let Some(condition) = &reading.condition {
            draw_icon(img, condition.icon(), reading.x, reading.y);
        }
        let color = if highlight == Some(i) {
            TEXT_YELLOW
        } else {
            TEXT_WHITE
        };
        draw_text(img, font, color, reading.x - 20, reading.y + 45, 12.0, &reading.name);
        draw_text(img, font, color, reading.x - 10, reading.y + 60, 16.0, &reading.temp_label());
    }

    draw_bottom_bar(img, font, MAP_BOTTOM_TEXT);
}
