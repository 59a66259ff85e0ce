//! QR asset generation command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use sitekit_qr::QrGenerator;

use crate::config::load_config;

/// Run the qr command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, routes: Vec<String>) -> Result<()> {
    let file_config = load_config(config_path)?;

    let mut config = file_config.qr_config()?;
    if let Some(output) = output {
        config.output_dir = output;
    }
    if !routes.is_empty() {
        config.routes = routes;
    }

    let generator = QrGenerator::fetch_assets(config).await?;
    let result = generator.generate().await?;

    tracing::info!(
        "Generated {} QR codes in {}ms",
        result.files.len(),
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
