//! Parts shared by every frame: background, header and bottom bar.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use rusttype::Font;

use retrocast_forecast_model::ForecastRecord;

use crate::text::{draw_text, draw_text_centered};
use crate::theme::{BAR_BLUE, BG_DARK, BG_LIGHT, HEADER_ORANGE, TEXT_WHITE, TEXT_YELLOW};

pub const HEADER_HEIGHT: u32 = 51;
pub const BOTTOM_BAR_HEIGHT: u32 = 35;

/// Vertical gradient from dark to light blue.
pub fn draw_background(img: &mut RgbImage) {
    let height = img.height();
    for y in 0..height {
        let ratio = y as f64 / height as f64;
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * ratio) as u8;
        let color = Rgb([
            mix(BG_DARK[0], BG_LIGHT[0]),
            mix(BG_DARK[1], BG_LIGHT[1]),
            mix(BG_DARK[2], BG_LIGHT[2]),
        ]);
        for x in 0..img.width() {
            img.put_pixel(x, y, color);
        }
    }
}

/// Orange header with the logo box, location title and issue time.
pub fn draw_header(img: &mut RgbImage, font: Option<&Font<'_>>, record: &ForecastRecord) {
    draw_filled_rect_mut(
        img,
        Rect::at(0, 0).of_size(img.width(), HEADER_HEIGHT),
        HEADER_ORANGE,
    );

    draw_filled_rect_mut(img, Rect::at(10, 8).of_size(111, 35), BG_DARK);
    draw_hollow_rect_mut(img, Rect::at(10, 8).of_size(111, 35), TEXT_WHITE);
    draw_hollow_rect_mut(img, Rect::at(11, 9).of_size(109, 33), TEXT_WHITE);
    draw_text(img, font, TEXT_WHITE, 18, 10, 8.0, "THE");
    draw_text(img, font, TEXT_WHITE, 18, 18, 8.0, "WEATHER");
    draw_text(img, font, TEXT_WHITE, 18, 28, 8.0, "CHANNEL");

    let title = format!("{} {}", record.city, record.region);
    draw_text(img, font, TEXT_WHITE, 140, 8, 24.0, &title);
    draw_text(img, font, TEXT_YELLOW, 140, 32, 12.0, "Extended Forecast");

    draw_text(img, font, TEXT_WHITE, 520, 10, 14.0, &time_label(record));
    draw_text(img, font, TEXT_WHITE, 520, 28, 14.0, &date_label(record));
}

/// Blue strip along the bottom edge with centered text.
pub fn draw_bottom_bar(img: &mut RgbImage, font: Option<&Font<'_>>, text: &str) {
    let (width, height) = img.dimensions();
    let top = height.saturating_sub(BOTTOM_BAR_HEIGHT);
    draw_filled_rect_mut(
        img,
        Rect::at(0, top as i32).of_size(width, BOTTOM_BAR_HEIGHT),
        BAR_BLUE,
    );
    draw_text_centered(
        img,
        font,
        TEXT_WHITE,
        (width / 2) as i32,
        height as i32 - 28,
        16.0,
        text,
    );
}

/// Issue time, e.g. "06:00:00 AM".
fn time_label(record: &ForecastRecord) -> String {
    record.issued_at.format("%I:%M:%S %p").to_string()
}

/// Issue date, e.g. "THU MAY 02".
fn date_label(record: &ForecastRecord) -> String {
    record.issued_at.format("%a %b %d").to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    #[test]
    fn test_clock_labels_use_issue_time() {
        let record = sample_record();
        assert_eq!(time_label(&record), "06:00:00 AM");
        assert_eq!(date_label(&record), "THU MAY 02");
    }

    #[test]
    fn test_background_gradient_runs_dark_to_light() {
        let mut img = RgbImage::new(4, 480);
        draw_background(&mut img);
        assert_eq!(*img.get_pixel(0, 0), BG_DARK);
        let bottom = img.get_pixel(3, 479);
        assert!(bottom[2] > BG_DARK[2] && bottom[2] <= BG_LIGHT[2]);
    }

    #[test]
    fn test_header_and_bar_geometry() {
        let record = sample_record();
        let mut img = RgbImage::new(640, 480);
        draw_background(&mut img);
        draw_header(&mut img, None, &record);
        draw_bottom_bar(&mut img, None, "REGIONAL CONDITIONS");

        assert_eq!(*img.get_pixel(300, 50), HEADER_ORANGE);
        assert_eq!(*img.get_pixel(10, 8), TEXT_WHITE);
        assert_eq!(*img.get_pixel(60, 25), BG_DARK);
        assert_eq!(*img.get_pixel(320, 445), BAR_BLUE);
        assert_eq!(*img.get_pixel(320, 479), BAR_BLUE);
        assert_ne!(*img.get_pixel(320, 444), BAR_BLUE);
    }
}
