//! Fixed visual theme: palette, canvas geometry and font discovery.

use std::path::{Path, PathBuf};

use image::Rgb;
use rusttype::Font;

use retrocast_common::error::{RetrocastError, RetrocastResult};

/// Native layout size. Frames for other resolutions are scaled from it.
pub const CANVAS_WIDTH: u32 = 640;
pub const CANVAS_HEIGHT: u32 = 480;

pub const BG_DARK: Rgb<u8> = Rgb([0x1a, 0x23, 0x7e]);
pub const BG_LIGHT: Rgb<u8> = Rgb([0x39, 0x49, 0xab]);
pub const CARD_FILL: Rgb<u8> = Rgb([0x5c, 0x6b, 0xc0]);
pub const CARD_BORDER: Rgb<u8> = Rgb([0x1a, 0x23, 0x7e]);
pub const HEADER_ORANGE: Rgb<u8> = Rgb([0xff, 0x6f, 0x00]);
pub const TEXT_YELLOW: Rgb<u8> = Rgb([0xff, 0xd5, 0x4f]);
pub const TEXT_WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
pub const TEXT_GRAY: Rgb<u8> = Rgb([0xb0, 0xbe, 0xc5]);
pub const BAR_BLUE: Rgb<u8> = Rgb([0x28, 0x35, 0x93]);

/// Bold sans fonts commonly present on Linux and macOS hosts.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial Bold.ttf",
];

/// The configured font when it exists, otherwise the first known system font.
pub fn discover_font(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return path.exists().then(|| path.to_path_buf());
    }
    FONT_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Read and parse a TrueType font (collections use their first face).
pub fn load_font(path: &Path) -> RetrocastResult<Font<'static>> {
    if !path.exists() {
        return Err(RetrocastError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| RetrocastError::render(format!("{} is not a usable font", path.display())))
}

/// Discover and load a font; `None` when nothing usable is found.
pub fn find_font(configured: Option<&Path>) -> Option<Font<'static>> {
    let path = discover_font(configured)?;
    match load_font(&path) {
        Ok(font) => {
            tracing::debug!(font = %path.display(), "Loaded font");
            Some(font)
        }
        Err(e) => {
            tracing::warn!(font = %path.display(), error = %e, "Failed to load font");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_font_must_exist() {
        let missing = Path::new("/nonexistent/retrocast/font.ttf");
        assert_eq!(discover_font(Some(missing)), None);
        assert!(find_font(Some(missing)).is_none());
    }

    #[test]
    fn test_load_font_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            load_font(&path),
            Err(RetrocastError::Render { .. })
        ));
    }
}
