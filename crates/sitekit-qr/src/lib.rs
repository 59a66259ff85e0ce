//! Styled QR code generator.
//!
//! Encodes tracked redirect URLs into rounded-module QR codes with a circular
//! profile picture in the centre and a caption band underneath.

pub mod caption;
pub mod encode;
pub mod fetch;
pub mod generator;
pub mod logo;

pub use caption::{fit_caption, CaptionFont, CaptionLayout};
pub use encode::{encode, render_matrix, QrMatrix, QrStyle};
pub use fetch::fetch_bytes;
pub use generator::{tracking_url, validate_routes, GenerateResult, QrConfig, QrError, QrGenerator};
pub use logo::circular_logo;
