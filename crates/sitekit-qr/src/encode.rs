//! QR encoding and rounded-module rendering.

use image::{Rgba, RgbaImage};
use qrcode::types::QrError as EncodeError;
use qrcode::{Color, EcLevel, QrCode, Version};

use crate::generator::QrError;

/// Visual parameters of a generated code.
#[derive(Debug, Clone, PartialEq)]
pub struct QrStyle {
    /// Smallest QR version to use; larger ones are picked if the data needs it
    pub min_version: i16,

    /// Side of one module in pixels
    pub module_size: u32,

    /// Quiet zone width in modules
    pub quiet_zone: u32,

    /// Module color
    pub foreground: [u8; 3],

    /// Background color
    pub background: [u8; 3],

    /// Logo diameter as a fraction of the code side
    pub logo_ratio: f32,

    /// White ring around the logo, in pixels
    pub logo_border: u32,

    /// Caption band height as a fraction of the code side
    pub caption_space_ratio: f32,

    /// Initial caption font size as a fraction of the code side
    pub caption_font_ratio: f32,

    /// Widest the caption may be, as a fraction of the code side
    pub caption_max_width_ratio: f32,

    /// Caption text color
    pub caption_color: [u8; 3],
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            min_version: 5,
            module_size: 15,
            quiet_zone: 2,
            foreground: [0, 100, 148],
            background: [255, 255, 255],
            logo_ratio: 0.22,
            logo_border: 12,
            caption_space_ratio: 0.09,
            caption_font_ratio: 0.04,
            caption_max_width_ratio: 0.90,
            caption_color: [0x00, 0x64, 0x94],
        }
    }
}

/// Largest accepted module side in pixels.
pub const MAX_MODULE_SIZE: u32 = 50;

/// Largest accepted quiet zone in modules.
pub const MAX_QUIET_ZONE: u32 = 16;

/// Largest accepted logo ring in pixels.
pub const MAX_LOGO_BORDER: u32 = 256;

impl QrStyle {
    /// Check that every parameter is in range, so image sizes cannot
    /// overflow and ratios stay meaningful.
    pub fn validate(&self) -> Result<(), QrError> {
        if !(1..=40).contains(&self.min_version) {
            return Err(QrError::InvalidStyle(format!(
                "min_version must be 1-40, got {}",
                self.min_version
            )));
        }
        if !(1..=MAX_MODULE_SIZE).contains(&self.module_size) {
            return Err(QrError::InvalidStyle(format!(
                "module_size must be 1-{}, got {}",
                MAX_MODULE_SIZE, self.module_size
            )));
        }
        if self.quiet_zone > MAX_QUIET_ZONE {
            return Err(QrError::InvalidStyle(format!(
                "quiet_zone must be at most {}, got {}",
                MAX_QUIET_ZONE, self.quiet_zone
            )));
        }
        if self.logo_border > MAX_LOGO_BORDER {
            return Err(QrError::InvalidStyle(format!(
                "logo_border must be at most {}, got {}",
                MAX_LOGO_BORDER, self.logo_border
            )));
        }

        let ratios = [
            ("logo_ratio", self.logo_ratio),
            ("caption_space_ratio", self.caption_space_ratio),
            ("caption_font_ratio", self.caption_font_ratio),
            ("caption_max_width_ratio", self.caption_max_width_ratio),
        ];
        for (name, value) in ratios {
            // NaN fails both comparisons
            if !(value > 0.0 && value <= 1.0) {
                return Err(QrError::InvalidStyle(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Square grid of dark/light modules, without quiet zone.
#[derive(Debug, Clone)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (x, y) is dark. Out-of-range coordinates are light.
    pub fn is_dark(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.width as i64 {
            return false;
        }
        self.dark[y as usize * self.width + x as usize]
    }
}

/// Encode data with high error correction at the smallest version that fits,
/// starting from the style's minimum version.
pub fn encode(data: &str, style: &QrStyle) -> Result<QrMatrix, QrError> {
    let first = style.min_version.clamp(1, 40);

    for v in first..=40 {
        match QrCode::with_version(data.as_bytes(), Version::Normal(v), EcLevel::H) {
            Ok(code) => {
                tracing::debug!("Encoded {} bytes at version {}", data.len(), v);
                let dark = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
                return Ok(QrMatrix {
                    width: code.width(),
                    dark,
                });
            }
            Err(EncodeError::DataTooLong) => continue,
            Err(e) => return Err(QrError::EncodeError(e.to_string())),
        }
    }

    Err(QrError::EncodeError(format!(
        "data too long for any QR version ({} bytes)",
        data.len()
    )))
}

/// Render a matrix with rounded modules.
///
/// A corner of a dark module is rounded when both neighbours sharing that
/// corner's edges are light, so isolated modules become dots and runs of
/// modules keep straight joins.
pub fn render_matrix(matrix: &QrMatrix, style: &QrStyle) -> Result<RgbaImage, QrError> {
    style.validate()?;

    let box_size = style.module_size;
    let side = u32::try_from(matrix.width())
        .ok()
        .and_then(|w| w.checked_add(style.quiet_zone.checked_mul(2)?))
        .and_then(|w| w.checked_mul(box_size))
        .ok_or_else(|| QrError::InvalidStyle("rendered code is too large".to_string()))?;

    let [br, bg, bb] = style.background;
    let [fr, fg, fb] = style.foreground;
    let background = Rgba([br, bg, bb, 255]);
    let foreground = Rgba([fr, fg, fb, 255]);

    let mut img = RgbaImage::from_pixel(side, side, background);
    let radius = box_size as f32 / 2.0;
    let quiet = style.quiet_zone as i64;

    for my in 0..matrix.width() as i64 {
        for mx in 0..matrix.width() as i64 {
            if !matrix.is_dark(mx, my) {
                continue;
            }

            let left = matrix.is_dark(mx - 1, my);
            let right = matrix.is_dark(mx + 1, my);
            let up = matrix.is_dark(mx, my - 1);
            let down = matrix.is_dark(mx, my + 1);

            let ox = (mx + quiet) as u32 * box_size;
            let oy = (my + quiet) as u32 * box_size;

            for ly in 0..box_size {
                for lx in 0..box_size {
                    let cx = lx as f32 + 0.5 - radius;
                    let cy = ly as f32 + 0.5 - radius;

                    let rounded = match (cx < 0.0, cy < 0.0) {
                        (true, true) => !left && !up,
                        (false, true) => !right && !up,
                        (true, false) => !left && !down,
                        (false, false) => !right && !down,
                    };

                    if rounded && cx * cx + cy * cy > radius * radius {
                        continue;
                    }

                    img.put_pixel(ox + lx, oy + ly, foreground);
                }
            }
        }
    }

    Ok(img)
}
