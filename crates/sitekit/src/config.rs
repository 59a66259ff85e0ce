//! Configuration file structure (sitekit.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use sitekit_qr::{QrConfig, QrStyle};
use sitekit_sitemap::{IgnoreRules, SiteRoot, SitemapConfig};

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub qr: QrSection,
    #[serde(default)]
    pub sitemap: SitemapSection,
}

#[derive(Debug, Deserialize)]
pub struct QrSection {
    #[serde(default = "default_qr_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
    #[serde(default = "default_font_url")]
    pub font_url: String,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    #[serde(default = "default_caption")]
    pub caption: String,
    #[serde(default = "default_routes")]
    pub routes: Vec<String>,
    #[serde(default = "default_fallback_fonts")]
    pub fallback_fonts: Vec<PathBuf>,
    #[serde(default)]
    pub style: StyleSection,
}

impl Default for QrSection {
    fn default() -> Self {
        Self {
            output_dir: default_qr_output_dir(),
            logo_url: default_logo_url(),
            font_url: default_font_url(),
            redirect_url: default_redirect_url(),
            caption: default_caption(),
            routes: default_routes(),
            fallback_fonts: default_fallback_fonts(),
            style: StyleSection::default(),
        }
    }
}

fn default_qr_output_dir() -> PathBuf {
    QrConfig::default().output_dir
}
fn default_logo_url() -> String {
    QrConfig::default().logo_url
}
fn default_font_url() -> String {
    QrConfig::default().font_url
}
fn default_redirect_url() -> String {
    QrConfig::default().redirect_url
}
fn default_caption() -> String {
    QrConfig::default().caption
}
fn default_routes() -> Vec<String> {
    QrConfig::default().routes
}
fn default_fallback_fonts() -> Vec<PathBuf> {
    QrConfig::default().fallback_fonts
}

/// Overrides for the rendering style; unset keys keep the built-in look.
#[derive(Debug, Deserialize, Default)]
pub struct StyleSection {
    min_version: Option<i16>,
    module_size: Option<u32>,
    quiet_zone: Option<u32>,
    /// Hex color such as "#006494"
    foreground: Option<String>,
    background: Option<String>,
    caption_color: Option<String>,
    logo_ratio: Option<f32>,
    logo_border: Option<u32>,
    caption_space_ratio: Option<f32>,
    caption_font_ratio: Option<f32>,
    caption_max_width_ratio: Option<f32>,
}

impl StyleSection {
    fn to_style(&self) -> Result<QrStyle> {
        let d = QrStyle::default();
        let style = QrStyle {
            min_version: self.min_version.unwrap_or(d.min_version),
            module_size: self.module_size.unwrap_or(d.module_size),
            quiet_zone: self.quiet_zone.unwrap_or(d.quiet_zone),
            foreground: parse_color(self.foreground.as_deref())?.unwrap_or(d.foreground),
            background: parse_color(self.background.as_deref())?.unwrap_or(d.background),
            caption_color: parse_color(self.caption_color.as_deref())?.unwrap_or(d.caption_color),
            logo_ratio: self.logo_ratio.unwrap_or(d.logo_ratio),
            logo_border: self.logo_border.unwrap_or(d.logo_border),
            caption_space_ratio: self.caption_space_ratio.unwrap_or(d.caption_space_ratio),
            caption_font_ratio: self.caption_font_ratio.unwrap_or(d.caption_font_ratio),
            caption_max_width_ratio: self
                .caption_max_width_ratio
                .unwrap_or(d.caption_max_width_ratio),
        };
        style
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid [qr.style]: {}", e))?;
        Ok(style)
    }
}

#[derive(Debug, Deserialize)]
pub struct SitemapSection {
    #[serde(default = "default_sitemap_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub robots_txt: bool,
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteSection>,
}

impl Default for SitemapSection {
    fn default() -> Self {
        Self {
            output: default_sitemap_output(),
            robots_txt: false,
            ignore_files: default_ignore_files(),
            ignore_dirs: default_ignore_dirs(),
            ignore_case: false,
            sites: default_sites(),
        }
    }
}

fn default_sitemap_output() -> PathBuf {
    SitemapConfig::default().output
}
fn default_ignore_files() -> Vec<String> {
    IgnoreRules::default().files
}
fn default_ignore_dirs() -> Vec<String> {
    IgnoreRules::default().dirs
}
fn default_sites() -> Vec<SiteSection> {
    SitemapConfig::default()
        .sites
        .into_iter()
        .map(|s| SiteSection {
            local_path: s.local_path,
            base_url: s.base_url,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct SiteSection {
    pub local_path: PathBuf,
    pub base_url: String,
}

impl ConfigFile {
    /// QR generator settings with style overrides applied.
    pub fn qr_config(&self) -> Result<QrConfig> {
        let qr = &self.qr;
        Ok(QrConfig {
            output_dir: qr.output_dir.clone(),
            logo_url: qr.logo_url.clone(),
            font_url: qr.font_url.clone(),
            redirect_url: qr.redirect_url.clone(),
            caption: qr.caption.clone(),
            routes: qr.routes.clone(),
            fallback_fonts: qr.fallback_fonts.clone(),
            style: qr.style.to_style()?,
        })
    }

    /// Sitemap builder settings.
    pub fn sitemap_config(&self) -> SitemapConfig {
        let sm = &self.sitemap;
        SitemapConfig {
            sites: sm
                .sites
                .iter()
                .map(|s| SiteRoot::new(&s.local_path, s.base_url.as_str()))
                .collect(),
            output: sm.output.clone(),
            ignore: IgnoreRules {
                files: sm.ignore_files.clone(),
                dirs: sm.ignore_dirs.clone(),
                case_insensitive: sm.ignore_case,
            },
            robots_txt: sm.robots_txt,
        }
    }
}

/// Load configuration from the given file if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    tracing::debug!("No config at {}, using defaults", path.display());
    Ok(ConfigFile::default())
}

/// Parse "#rrggbb" (leading '#' optional).
fn parse_color(value: Option<&str>) -> Result<Option<[u8; 3]>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Invalid color '{}', expected #rrggbb", value);
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok(Some([channel(0)?, channel(2)?, channel(4)?]))
}
