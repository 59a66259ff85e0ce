//! Sitemap build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use sitekit_sitemap::SitemapBuilder;

use crate::config::load_config;

/// Run the sitemap command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Starting multi-site sitemap generation...");

    let file_config = load_config(config_path)?;

    let mut config = file_config.sitemap_config();
    if let Some(output) = output {
        config.output = output;
    }

    let result = match SitemapBuilder::new(config).build().await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Sitemap generation failed: {}", e);
            return Err(e.into());
        }
    };

    if result.sites_skipped > 0 {
        tracing::warn!("{} site(s) skipped", result.sites_skipped);
    }

    tracing::info!(
        "Sitemap generated with {} URLs from {} site(s) in {}ms",
        result.urls,
        result.sites_scanned,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_path.display());

    Ok(())
}
