//! Write a starter configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'sitekit qr' or 'sitekit sitemap' to generate assets.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r##"# sitekit configuration

[qr]
# Directory the <route>_qr.png files are written to
output_dir = "assets"

# Profile picture placed in the centre of each code
logo_url = "https://amit.is-a.dev/mypic.png"

# Caption font; local fallbacks are tried if it cannot be used
font_url = "https://github.com/google/fonts/raw/main/ofl/outfit/Outfit-Bold.ttf"

# Codes encode <redirect_url>?id=<route>&ref=qr
redirect_url = "https://amit.is-a.dev/redirect"

# Text drawn below each code
caption = "https://amit.is-a.dev"

routes = [
    "link-discord-direct", "link-about", "link-orcid", "link-crunchbase",
    "link-gravatar", "link-github", "link-github-sponsor", "link-linkedin",
    "link-x", "link-facebook", "link-instagram", "link-reddit", "link-youtube",
    "link-npm", "link-hackernews", "link-producthunt", "link-pypi", "link-holopin",
    "link-email-gmail", "link-email-dev", "link-website", "profile-avatar",
]

[qr.style]
foreground = "#006494"
background = "#ffffff"
caption_color = "#006494"

[sitemap]
# Sitemap file to write
output = "sitemap.xml"

# Also write robots.txt next to the sitemap
robots_txt = false

# Match ignore_files regardless of case (Windows-style)
ignore_case = false

ignore_files = [
    "google*.html", "404.html", "draft.html", "index1.html", "index2.html",
    "indexcopy.html", "index copy.html", "indexbackup*.html", "new.html",
    "template.html", "wpChat.html", "wpChat-backup.html",
]

ignore_dirs = [
    ".git", "node_modules", ".github", ".vscode", "screenshots", "dist",
    "build", "__pycache__", "backups", "assets",
]

[[sitemap.sites]]
local_path = "."
base_url = "https://amit.is-a.dev/"
"##;
