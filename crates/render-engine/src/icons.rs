//! Condition pictograms built from ellipses and line strokes.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_line_segment_mut};

use retrocast_forecast_model::Icon;

const SUN: Rgb<u8> = Rgb([0xff, 0xd5, 0x4f]);
const CLOUD_DARK: Rgb<u8> = Rgb([0x9e, 0x9e, 0x9e]);
const CLOUD_LIGHT: Rgb<u8> = Rgb([0xbd, 0xbd, 0xbd]);
const STORM_DARK: Rgb<u8> = Rgb([0x61, 0x61, 0x61]);
const STORM_LIGHT: Rgb<u8> = Rgb([0x75, 0x75, 0x75]);
const SNOW_CLOUD: Rgb<u8> = Rgb([0xe0, 0xe0, 0xe0]);
const RAIN: Rgb<u8> = Rgb([0x64, 0xb5, 0xf6]);
const BOLT: Rgb<u8> = Rgb([0xff, 0xeb, 0x3b]);
const FLAKE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Draw `icon` centered at `(cx, cy)`.
pub fn draw_icon(img: &mut RgbImage, icon: Icon, cx: i32, cy: i32) {
    match icon {
        Icon::Sun => draw_sun(img, cx, cy),
        Icon::Clouds => {
            fill_ellipse(img, (cx - 35, cy - 10, cx - 5, cy + 20), CLOUD_DARK);
            fill_ellipse(img, (cx - 20, cy - 20, cx + 20, cy + 15), CLOUD_LIGHT);
            fill_ellipse(img, (cx, cy - 10, cx + 35, cy + 20), CLOUD_DARK);
        }
        Icon::Rain => {
            draw_small_cloud(img, cx, cy, CLOUD_DARK, CLOUD_LIGHT);
            for dx in (-20..25).step_by(15) {
                stroke(img, (cx + dx, cy + 10), (cx + dx - 5, cy + 30), 2, RAIN);
            }
        }
        Icon::Thunderstorm => {
            draw_small_cloud(img, cx, cy, STORM_DARK, STORM_LIGHT);
            let bolt = [(cx, cy + 5), (cx - 8, cy + 20), (cx, cy + 18), (cx - 5, cy + 35)];
            for pair in bolt.windows(2) {
                stroke(img, pair[0], pair[1], 3, BOLT);
            }
            for dx in [-15, 15] {
                stroke(img, (cx + dx, cy + 10), (cx + dx - 3, cy + 25), 2, RAIN);
            }
        }
        Icon::Snow => {
            draw_small_cloud(img, cx, cy, CLOUD_LIGHT, SNOW_CLOUD);
            for dx in (-20..25).step_by(15) {
                fill_ellipse(img, (cx + dx - 3, cy + 15, cx + dx + 3, cy + 21), FLAKE);
                fill_ellipse(img, (cx + dx - 3, cy + 28, cx + dx + 3, cy + 34), FLAKE);
            }
        }
    }
}

fn draw_sun(img: &mut RgbImage, cx: i32, cy: i32) {
    fill_ellipse(img, (cx - 25, cy - 25, cx + 25, cy + 25), SUN);
    for step in 0..8 {
        let rad = (step as f64 * 45.0).to_radians();
        let (cos, sin) = (rad.cos(), rad.sin());
        let inner = (cx + (30.0 * cos) as i32, cy + (30.0 * sin) as i32);
        let outer = (cx + (40.0 * cos) as i32, cy + (40.0 * sin) as i32);
        stroke(img, inner, outer, 3, SUN);
    }
}

/// Three-lobe cloud sitting above the icon center, leaving room for precipitation.
fn draw_small_cloud(img: &mut RgbImage, cx: i32, cy: i32, outer: Rgb<u8>, middle: Rgb<u8>) {
    fill_ellipse(img, (cx - 30, cy - 25, cx, cy), outer);
    fill_ellipse(img, (cx - 15, cy - 30, cx + 20, cy - 5), middle);
    fill_ellipse(img, (cx + 5, cy - 25, cx + 35, cy), outer);
}

/// Filled ellipse inscribed in the box `(x0, y0, x1, y1)`.
fn fill_ellipse(img: &mut RgbImage, (x0, y0, x1, y1): (i32, i32, i32, i32), color: Rgb<u8>) {
    let center = ((x0 + x1) / 2, (y0 + y1) / 2);
    draw_filled_ellipse_mut(img, center, (x1 - x0) / 2, (y1 - y0) / 2, color);
}

/// Line segment `width` pixels thick.
pub(crate) fn stroke(
    img: &mut RgbImage,
    from: (i32, i32),
    to: (i32, i32),
    width: i32,
    color: Rgb<u8>,
) {
    let steep = (to.1 - from.1).abs() > (to.0 - from.0).abs();
    let first = -(width / 2);
    for offset in first..first + width.max(1) {
        let (ox, oy) = if steep { (offset, 0) } else { (0, offset) };
        draw_line_segment_mut(
            img,
            ((from.0 + ox) as f32, (from.1 + oy) as f32),
            ((to.0 + ox) as f32, (to.1 + oy) as f32),
            color,
        );
    }
}
