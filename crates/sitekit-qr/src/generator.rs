//! Batch QR asset generator.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use image::imageops;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::caption::{fit_caption, CaptionFont};
use crate::encode::{encode, render_matrix, QrStyle};
use crate::fetch::fetch_bytes;
use crate::logo::circular_logo;

/// Configuration for a QR generation run.
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// Directory the PNG files are written to
    pub output_dir: PathBuf,

    /// Profile picture placed in the centre of every code
    pub logo_url: String,

    /// Caption font (TrueType/OpenType)
    pub font_url: String,

    /// Redirect endpoint the route identifiers are appended to
    pub redirect_url: String,

    /// Text drawn under each code
    pub caption: String,

    /// Route identifiers, one output file each
    pub routes: Vec<String>,

    /// Local font files tried when the downloaded font is unusable
    pub fallback_fonts: Vec<PathBuf>,

    /// Rendering parameters
    pub style: QrStyle,
}

/// Route identifiers of the site's link page.
pub const DEFAULT_ROUTES: &[&str] = &[
    "link-discord-direct",
    "link-about",
    "link-orcid",
    "link-crunchbase",
    "link-gravatar",
    "link-github",
    "link-github-sponsor",
    "link-linkedin",
    "link-x",
    "link-facebook",
    "link-instagram",
    "link-reddit",
    "link-youtube",
    "link-npm",
    "link-hackernews",
    "link-producthunt",
    "link-pypi",
    "link-holopin",
    "link-email-gmail",
    "link-email-dev",
    "link-website",
    "profile-avatar",
];

/// Bold system fonts commonly present on Windows, Linux and macOS.
pub const DEFAULT_FALLBACK_FONTS: &[&str] = &[
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("assets"),
            logo_url: "https://amit.is-a.dev/mypic.png".to_string(),
            font_url: "https://github.com/google/fonts/raw/main/ofl/outfit/Outfit-Bold.ttf"
                .to_string(),
            redirect_url: "https://amit.is-a.dev/redirect".to_string(),
            caption: "https://amit.is-a.dev".to_string(),
            routes: DEFAULT_ROUTES.iter().map(|s| s.to_string()).collect(),
            fallback_fonts: DEFAULT_FALLBACK_FONTS.iter().map(PathBuf::from).collect(),
            style: QrStyle::default(),
        }
    }
}

/// Result of a generation run.
#[derive(Debug)]
pub struct GenerateResult {
    /// Written files, in route order
    pub files: Vec<PathBuf>,

    /// Total generation time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur while generating QR assets.
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("Failed to download {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("Failed to decode image: {0}")]
    ImageError(String),

    #[error("Invalid route identifier '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidRoute(String),

    #[error("No route identifiers configured")]
    NoRoutes,

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("No usable caption font: {0}")]
    FontError(String),

    #[error("Failed to encode QR code: {0}")]
    EncodeError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Build the tracked redirect URL for a route.
pub fn tracking_url(redirect_url: &str, route_id: &str) -> String {
    format!("{}?id={}&ref=qr", redirect_url, urlencoding::encode(route_id))
}

/// Check route identifiers and drop duplicates, keeping first occurrences.
pub fn validate_routes(routes: &[String]) -> Result<Vec<String>, QrError> {
    if routes.is_empty() {
        return Err(QrError::NoRoutes);
    }

    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(routes.len());

    for route in routes {
        let ok = !route.is_empty()
            && route
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !ok {
            return Err(QrError::InvalidRoute(route.clone()));
        }

        if seen.insert(route.as_str()) {
            valid.push(route.clone());
        } else {
            tracing::warn!("Duplicate route '{}' ignored", route);
        }
    }

    Ok(valid)
}

/// QR asset generator holding the downloaded logo and caption font.
pub struct QrGenerator {
    config: QrConfig,
    logo: RgbaImage,
    font: CaptionFont,
}

impl QrGenerator {
    /// Download the logo and font named in the config.
    ///
    /// A failed logo download aborts; a failed font download falls back to
    /// the configured local fonts and then the bundled one.
    pub async fn fetch_assets(config: QrConfig) -> Result<Self, QrError> {
        let client = reqwest::Client::new();

        tracing::info!("Downloading profile picture...");
        let logo_bytes = fetch_bytes(&client, &config.logo_url).await?;
        let logo = image::load_from_memory(&logo_bytes)
            .map_err(|e| QrError::ImageError(e.to_string()))?
            .to_rgba8();

        tracing::info!("Downloading caption font...");
        let font_bytes = match fetch_bytes(&client, &config.font_url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("Font download failed: {}", e);
                None
            }
        };
        let font = CaptionFont::load(font_bytes, &config.fallback_fonts)?;

        Ok(Self::from_assets(config, logo, font))
    }

    /// Create a generator from already loaded assets.
    pub fn from_assets(config: QrConfig, logo: RgbaImage, font: CaptionFont) -> Self {
        tracing::debug!("Caption font: {}", font.source());
        Self { config, logo, font }
    }

    /// Render and write one PNG per distinct route.
    pub async fn generate(&self) -> Result<GenerateResult, QrError> {
        let start = Instant::now();

        let routes = validate_routes(&self.config.routes)?;
        self.config.style.validate()?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| QrError::WriteError(e.to_string()))?;

        tracing::info!("Generating {} QR codes...", routes.len());

        let files = routes
            .par_iter()
            .map(|route| self.write_route(route))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GenerateResult {
            files,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    fn write_route(&self, route_id: &str) -> Result<PathBuf, QrError> {
        let image = self.render(route_id)?;
        let path = self.config.output_dir.join(format!("{}_qr.png", route_id));

        image
            .save(&path)
            .map_err(|e| QrError::WriteError(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Saved {}", path.display());
        Ok(path)
    }

    /// Render the final image for a route: code, centred logo and caption.
    pub fn render(&self, route_id: &str) -> Result<RgbaImage, QrError> {
        let style = &self.config.style;
        let url = tracking_url(&self.config.redirect_url, route_id);

        let matrix = encode(&url, style)?;
        let mut qr = render_matrix(&matrix, style)?;
        let qr_size = qr.width();

        let logo_size = (qr_size as f32 * style.logo_ratio) as u32;
        let logo = circular_logo(&self.logo, logo_size, style.logo_border);
        let offset = (qr_size as i64 - logo.width() as i64) / 2;
        imageops::overlay(&mut qr, &logo, offset, offset);

        let text_space = (qr_size as f32 * style.caption_space_ratio) as u32;
        let mut canvas =
            RgbaImage::from_pixel(qr_size, qr_size + text_space, Rgba([255, 255, 255, 255]));
        imageops::replace(&mut canvas, &qr, 0, 0);

        let layout = fit_caption(&self.font, &self.config.caption, qr_size, style);
        self.font
            .draw(&mut canvas, &self.config.caption, &layout, style.caption_color);

        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn generator(output_dir: PathBuf, routes: &[&str]) -> QrGenerator {
        let config = QrConfig {
            output_dir,
            routes: routes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let logo = RgbaImage::from_pixel(64, 64, Rgba([220, 40, 40, 255]));
        QrGenerator::from_assets(config, logo, CaptionFont::builtin().unwrap())
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn builds_tracking_url() {
        assert_eq!(
            tracking_url("https://example.dev/redirect", "link-github"),
            "https://example.dev/redirect?id=link-github&ref=qr"
        );
    }

    #[test]
    fn validates_and_dedupes_routes() {
        let routes = vec![
            "link-x".to_string(),
            "link_y".to_string(),
            "link-x".to_string(),
        ];

        assert_eq!(validate_routes(&routes).unwrap(), vec!["link-x", "link_y"]);
    }

    #[test]
    fn rejects_unsafe_routes() {
        for bad in ["", "../etc", "a b", "a/b"] {
            assert!(matches!(
                validate_routes(&[bad.to_string()]),
                Err(QrError::InvalidRoute(_))
            ));
        }
        assert!(matches!(validate_routes(&[]), Err(QrError::NoRoutes)));
    }

    #[test]
    fn default_config_has_all_routes() {
        assert_eq!(QrConfig::default().routes.len(), 22);
    }

    #[test]
    fn renders_logo_in_centre_and_caption_band() {
        let temp = tempdir().unwrap();
        let gen = generator(temp.path().to_path_buf(), &["link-x"]);

        let img = gen.render("link-x").unwrap();
        let qr_size = img.width();

        assert_eq!(img.height(), qr_size + (qr_size as f32 * 0.09) as u32);
        assert_eq!(
            img.get_pixel(qr_size / 2, qr_size / 2),
            &Rgba([220, 40, 40, 255])
        );

        let inked: Vec<u32> = (qr_size..img.height())
            .flat_map(|y| (0..qr_size).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] < 128)
            .map(|(x, _)| x)
            .collect();

        assert!(!inked.is_empty());
        let left = *inked.iter().min().unwrap();
        let right = *inked.iter().max().unwrap();
        assert!((right - left) as f32 <= qr_size as f32 * 0.9);
        assert!(left > 0 && right < qr_size - 1);
    }

    #[tokio::test]
    async fn fetches_logo_and_falls_back_when_font_is_missing() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/mypic.png");
                then.status(200).body(png_bytes());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/font.ttf");
                then.status(404);
            })
            .await;

        let temp = tempdir().unwrap();
        let config = QrConfig {
            output_dir: temp.path().to_path_buf(),
            logo_url: server.url("/mypic.png"),
            font_url: server.url("/font.ttf"),
            routes: vec!["link-x".to_string()],
            fallback_fonts: vec![],
            ..Default::default()
        };

        let gen = QrGenerator::fetch_assets(config).await.unwrap();
        let result = gen.generate().await.unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(temp.path().join("link-x_qr.png").exists());
    }

    #[tokio::test]
    async fn missing_logo_aborts() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/mypic.png");
                then.status(404);
            })
            .await;

        let config = QrConfig {
            logo_url: server.url("/mypic.png"),
            font_url: server.url("/font.ttf"),
            ..Default::default()
        };

        let result = QrGenerator::fetch_assets(config).await;

        assert!(matches!(result, Err(QrError::FetchError { .. })));
    }

    #[tokio::test]
    async fn invalid_style_fails_before_writing() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("assets");
        let mut gen = generator(out.clone(), &["link-x"]);
        gen.config.style.quiet_zone = u32::MAX;

        let result = gen.generate().await;

        assert!(matches!(result, Err(QrError::InvalidStyle(_))));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn writes_one_file_per_route() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("assets");
        let gen = generator(out.clone(), &["link-github", "link-x", "profile-avatar", "link-x"]);

        let result = gen.generate().await.unwrap();

        assert_eq!(result.files.len(), 3);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 3);
        assert!(out.join("link-github_qr.png").exists());
        assert!(out.join("profile-avatar_qr.png").exists());

        let saved = image::open(out.join("link-x_qr.png")).unwrap();
        assert!(saved.height() > saved.width());
    }
}
