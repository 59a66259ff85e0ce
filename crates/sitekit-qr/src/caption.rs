//! Caption font loading and layout.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::encode::QrStyle;
use crate::generator::QrError;

/// DejaVu Sans Bold, used when neither the downloaded font nor any local
/// fallback can be loaded. License in `fonts/DejaVu-LICENSE`.
const BUILTIN_FONT: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");

/// Font used to draw the caption.
pub struct CaptionFont {
    font: FontArc,
    source: String,
}

impl CaptionFont {
    /// Parse a font from raw TrueType/OpenType bytes.
    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<String>) -> Option<Self> {
        FontArc::try_from_vec(bytes).ok().map(|font| Self {
            font,
            source: source.into(),
        })
    }

    /// The font compiled into the binary.
    pub fn builtin() -> Result<Self, QrError> {
        let font = FontArc::try_from_slice(BUILTIN_FONT)
            .map_err(|e| QrError::FontError(format!("bundled font: {}", e)))?;
        Ok(Self {
            font,
            source: "bundled DejaVu Sans Bold".to_string(),
        })
    }

    /// Pick the downloaded font if it parses, then the first usable fallback
    /// file, then the bundled font.
    pub fn load(downloaded: Option<Vec<u8>>, fallbacks: &[PathBuf]) -> Result<Self, QrError> {
        if let Some(bytes) = downloaded {
            match Self::from_bytes(bytes, "downloaded font") {
                Some(font) => return Ok(font),
                None => tracing::warn!("Downloaded font could not be parsed"),
            }
        }

        for path in fallbacks {
            if let Some(font) = Self::from_file(path) {
                tracing::info!("Using fallback font {}", path.display());
                return Ok(font);
            }
        }

        tracing::warn!("No local fallback font found, using the bundled font");
        Self::builtin()
    }

    fn from_file(path: &Path) -> Option<Self> {
        let bytes = fs::read(path).ok()?;
        Self::from_bytes(bytes, path.display().to_string())
    }

    /// Where the font came from, for logging.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Rendered size of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    /// Draw `text` onto `canvas` at the laid-out position.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, layout: &CaptionLayout, color: [u8; 3]) {
        let [r, g, b] = color;
        draw_text_mut(
            canvas,
            Rgba([r, g, b, 255]),
            layout.x,
            layout.y,
            PxScale::from(layout.font_size),
            &self.font,
            text,
        );
    }
}

/// Where and how large to draw a caption.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLayout {
    /// Font size in pixels
    pub font_size: f32,
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Measured text width
    pub width: u32,
    /// Measured text height
    pub height: u32,
}

/// Lay out a caption centred in the band below a `qr_size` code.
pub fn fit_caption(font: &CaptionFont, text: &str, qr_size: u32, style: &QrStyle) -> CaptionLayout {
    fit_caption_with(|size| font.measure(text, size), qr_size, style)
}

/// Layout with a caller-supplied text measurement.
///
/// Text wider than the allowed share of the code is shrunk proportionally,
/// once, then measured again.
pub fn fit_caption_with(
    measure: impl Fn(f32) -> (u32, u32),
    qr_size: u32,
    style: &QrStyle,
) -> CaptionLayout {
    let max_width = qr_size as f32 * style.caption_max_width_ratio;
    let mut font_size = (qr_size as f32 * style.caption_font_ratio).floor().max(1.0);
    let (mut width, mut height) = measure(font_size);

    if width as f32 > max_width {
        font_size = (font_size * (max_width / width as f32)).floor().max(1.0);
        (width, height) = measure(font_size);
    }

    let space = (qr_size as f32 * style.caption_space_ratio) as i32;
    let x = (qr_size as i32 - width as i32) / 2;
    let y = qr_size as i32 + (space - height as i32) / 2 - (height as f32 * 0.1) as i32;

    CaptionLayout {
        font_size,
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 20 glyphs at 0.6em each
    fn fake_measure(size: f32) -> (u32, u32) {
        ((size * 12.0) as u32, (size * 0.7) as u32)
    }

    #[test]
    fn keeps_initial_size_when_text_fits() {
        let layout = fit_caption_with(fake_measure, 615, &QrStyle::default());

        // 615 * 0.04 = 24.6 -> 24px, 288px wide
        assert_eq!(layout.font_size, 24.0);
        assert_eq!(layout.width, 288);
        assert_eq!(layout.x, (615 - 288) / 2);
        // band is 55px, text 16px tall
        assert_eq!(layout.y, 615 + (55 - 16) / 2 - 1);
    }

    #[test]
    fn shrinks_wide_text_once() {
        let style = QrStyle {
            caption_font_ratio: 0.2,
            ..Default::default()
        };

        let layout = fit_caption_with(fake_measure, 500, &style);

        // 100px font would be 1200px wide; max is 450
        assert!(layout.width as f32 <= 450.0);
        assert_eq!(layout.font_size, 37.0);
        assert!(layout.x >= 0);
    }

    #[test]
    fn caption_sits_below_code() {
        let layout = fit_caption_with(fake_measure, 615, &QrStyle::default());

        assert!(layout.y >= 615);
    }

    #[test]
    fn garbage_font_and_missing_fallbacks_use_bundled_font() {
        let font = CaptionFont::load(
            Some(b"not a font".to_vec()),
            &[PathBuf::from("/nonexistent/font.ttf")],
        )
        .unwrap();

        assert_eq!(font.source(), "bundled DejaVu Sans Bold");
    }

    #[test]
    fn downloaded_font_wins_when_it_parses() {
        let font = CaptionFont::load(Some(BUILTIN_FONT.to_vec()), &[]).unwrap();

        assert_eq!(font.source(), "downloaded font");
    }

    #[test]
    fn measures_scale_with_size() {
        let font = CaptionFont::builtin().unwrap();

        let (small_w, small_h) = font.measure("https://amit.is-a.dev", 12.0);
        let (large_w, large_h) = font.measure("https://amit.is-a.dev", 24.0);

        assert!(small_w > 0 && small_h > 0);
        assert!(large_w > small_w && large_h > small_h);
    }

    #[test]
    fn real_font_caption_fits_and_is_centred() {
        let font = CaptionFont::builtin().unwrap();
        let style = QrStyle::default();

        let layout = fit_caption(&font, "https://amit.is-a.dev", 615, &style);

        assert_eq!(layout.font_size, 24.0);
        assert!(layout.width as f32 <= 615.0 * 0.9);
        assert!(layout.y >= 615);
        assert!((layout.x * 2 + layout.width as i32 - 615).abs() <= 1);
    }

    #[test]
    fn real_font_long_caption_is_shrunk() {
        let font = CaptionFont::builtin().unwrap();
        let style = QrStyle::default();
        let text = "https://amit.is-a.dev/a/very/long/path/that/will/not/fit/anywhere";

        let initial = font.measure(text, 24.0).0;
        let layout = fit_caption(&font, text, 615, &style);

        assert!(initial as f32 > 615.0 * 0.9);
        assert!(layout.font_size < 24.0);
        // Glyph bounds round outward by up to a pixel per side
        assert!(layout.width as f32 <= 615.0 * 0.9 + 2.0);
    }

    #[test]
    fn draws_caption_pixels() {
        let font = CaptionFont::builtin().unwrap();
        let style = QrStyle::default();
        let mut canvas = RgbaImage::from_pixel(615, 670, Rgba([255, 255, 255, 255]));

        let layout = fit_caption(&font, "https://amit.is-a.dev", 615, &style);
        font.draw(&mut canvas, "https://amit.is-a.dev", &layout, style.caption_color);

        let inked = (615..670)
            .flat_map(|y| (0..615).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.get_pixel(x, y).0[0] < 128)
            .count();
        assert!(inked > 0);
    }
}
