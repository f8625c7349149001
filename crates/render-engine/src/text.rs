//! Text rasterization with rusttype.
//!
//! Positions are the top-left corner of the text box, with the baseline
//! one ascent below `y`. Without a font every call is a no-op and widths
//! are zero, so frames still render (shapes only).

use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};

/// Horizontal advance of `text` at `size` pixels.
pub fn text_width(font: Option<&Font<'_>>, size: f32, text: &str) -> f32 {
    let Some(font) = font else {
        return 0.0;
    };
    let scale = Scale::uniform(size);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw_text(
    img: &mut RgbImage,
    font: Option<&Font<'_>>,
    color: Rgb<u8>,
    x: i32,
    y: i32,
    size: f32,
    text: &str,
) {
    let Some(font) = font else {
        return;
    };
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent;
    let (width, height) = (img.width() as i32, img.height() as i32);

    for glyph in font.layout(text, scale, point(x as f32, y as f32 + ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bb.min.x + gx as i32;
            let py = bb.min.y + gy as i32;
            if px < 0 || py < 0 || px >= width || py >= height {
                return;
            }
            let pixel = img.get_pixel_mut(px as u32, py as u32);
            *pixel = blend(*pixel, color, coverage);
        });
    }
}

/// Draw `text` horizontally centered on `center_x`.
pub fn draw_text_centered(
    img: &mut RgbImage,
    font: Option<&Font<'_>>,
    color: Rgb<u8>,
    center_x: i32,
    y: i32,
    size: f32,
    text: &str,
) {
    let width = text_width(font, size, text);
    let x = center_x - (width / 2.0).floor() as i32;
    draw_text(img, font, color, x, y, size, text);
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8;
    Rgb([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_extremes() {
        let black = Rgb([0, 0, 0]);
        let white = Rgb([255, 255, 255]);
        assert_eq!(blend(black, white, 0.0), black);
        assert_eq!(blend(black, white, 1.0), white);
        assert_eq!(blend(black, white, 0.5), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_no_font_draws_nothing() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([1, 2, 3]));
        draw_text(&mut img, None, Rgb([255, 255, 255]), 0, 0, 12.0, "HELLO");
        assert!(img.pixels().all(|p| *p == Rgb([1, 2, 3])));
        assert_eq!(text_width(None, 12.0, "HELLO"), 0.0);
    }
}
