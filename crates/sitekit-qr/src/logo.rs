//! Circular logo compositing.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Crop a logo into a circle of `size` pixels sitting on a white disc with
/// a `border`-pixel ring.
///
/// The returned image is `size + 2 * border` square and transparent outside
/// the disc.
pub fn circular_logo(logo: &RgbaImage, size: u32, border: u32) -> RgbaImage {
    let size = size.max(1);
    let mut resized = imageops::resize(logo, size, size, FilterType::Lanczos3);
    mask_circle(&mut resized);

    let disc_size = size + 2 * border;
    let mut disc = RgbaImage::from_pixel(disc_size, disc_size, Rgba([255, 255, 255, 255]));
    mask_circle(&mut disc);

    imageops::overlay(&mut disc, &resized, border as i64, border as i64);
    disc
}

/// Clear every pixel outside the inscribed circle.
fn mask_circle(img: &mut RgbaImage) {
    let r = img.width().min(img.height()) as f32 / 2.0;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        if dx * dx + dy * dy > r * r {
            pixel.0[3] = 0;
        }
    }
}
