//! Forecast-card segment: three day cards between the header and the
//! pressure bar.

use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use rusttype::Font;

use retrocast_forecast_model::{ForecastRecord, Icon};

use crate::chrome::{draw_background, draw_bottom_bar, draw_header};
use crate::icons::draw_icon;
use crate::text::{draw_text, draw_text_centered};
use crate::theme::{CARD_BORDER, CARD_FILL, TEXT_GRAY, TEXT_WHITE, TEXT_YELLOW};

pub const CARD_WIDTH: u32 = 181;
pub const CARD_HEIGHT: u32 = 281;
pub const CARD_BORDER_WIDTH: u32 = 3;
pub const CARD_START_X: i32 = 30;
pub const CARD_Y: i32 = 70;
pub const CARD_SPACING: i32 = 200;

/// What one card shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub day_name: String,
    pub icon: Icon,
    pub description: String,
    pub low: i32,
    pub high: i32,
}

/// Cards in forecast order, one per shown day.
pub fn card_layout(record: &ForecastRecord) -> Vec<CardContent> {
    record
        .card_days()
        .iter()
        .map(|day| CardContent {
            day_name: day.day_name(),
            icon: day.condition.icon(),
            description: day.condition.description().to_string(),
            low: day.low,
            high: day.high,
        })
        .collect()
}

/// Text of the bottom bar, e.g. "BAROMETRIC PRESSURE: 30.03 IN."
pub fn pressure_label(record: &ForecastRecord) -> String {
    format!(
        "BAROMETRIC PRESSURE: {}",
        record.units.format_pressure(record.headline_pressure())
    )
}

/// Draw the full forecast-card still onto a layout-sized canvas.
pub fn draw_cards_frame(img: &mut RgbImage, font: Option<&Font<'_>>, record: &ForecastRecord) {
    draw_background(img);
    draw_header(img, font, record);

    for (i, card) in card_layout(record).iter().enumerate() {
        let x = CARD_START_X + i as i32 * CARD_SPACING;
        draw_card(img, font, x, CARD_Y, card);
    }

    draw_bottom_bar(img, font, &pressure_label(record));
}

fn draw_card(img: &mut RgbImage, font: Option<&Font<'_>>, x: i32, y: i32, card: &CardContent) {
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(CARD_WIDTH, CARD_HEIGHT), CARD_FILL);
    for inset in 0..CARD_BORDER_WIDTH {
        let rect = Rect::at(x + inset as i32, y + inset as i32)
            .of_size(CARD_WIDTH - 2 * inset, CARD_HEIGHT - 2 * inset);
        draw_hollow_rect_mut(img, rect, CARD_BORDER);
    }

    let center_x = x + CARD_WIDTH as i32 / 2;
    draw_text_centered(img, font, TEXT_YELLOW, center_x, y + 10, 28.0, &card.day_name);
    draw_icon(img, card.icon, center_x, y + 90);
    draw_text_centered(img, font, TEXT_WHITE, center_x, y + 150, 16.0, &card.description);

    draw_text(img, font, TEXT_GRAY, x + 30, y + 190, 14.0, "Lo");
    draw_text(img, font, TEXT_GRAY, x + 110, y + 190, 14.0, "Hi");
    draw_text(img, font, TEXT_WHITE, x + 20, y + 210, 36.0, &card.low.to_string());
    draw_text(img, font, TEXT_WHITE, x + 100, y + 210, 36.0, &card.high.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;
    use crate::theme::{CANVAS_HEIGHT, CANVAS_WIDTH};
    use retrocast_forecast_model::Units;

    #[test]
    fn test_card_layout_lists_days_in_order() {
        let cards = card_layout(&sample_record());
        let summary: Vec<_> = cards
            .iter()
            .map(|c| (c.day_name.as_str(), c.high, c.low, c.description.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("THU", 72, 51, "Sunny"),
                ("FRI", 75, 55, "Cloudy"),
                ("SAT", 68, 48, "Rainy"),
            ]
        );
        assert_eq!(cards[2].icon, Icon::Rain);
    }

    #[test]
    fn test_pressure_label_per_units() {
        let mut record = sample_record();
        assert_eq!(pressure_label(&record), "BAROMETRIC PRESSURE: 30.03 IN.");

        record.units = Units::Metric;
        assert_eq!(pressure_label(&record), "BAROMETRIC PRESSURE: 1017 HPA");

        record.days[0].pressure_hpa = None;
        assert_eq!(pressure_label(&record), "BAROMETRIC PRESSURE: --");
    }

    #[test]
    fn test_cards_are_drawn_side_by_side() {
        let record = sample_record();
        let mut img = RgbImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        draw_cards_frame(&mut img, None, &record);

        for i in 0..3 {
            let x = (CARD_START_X + i * CARD_SPACING) as u32;
            assert_eq!(*img.get_pixel(x, CARD_Y as u32), CARD_BORDER);
            assert_eq!(*img.get_pixel(x + 2, CARD_Y as u32 + 120), CARD_BORDER);
            assert_eq!(*img.get_pixel(x + 10, CARD_Y as u32 + 180), CARD_FILL);
        }
    }
}
