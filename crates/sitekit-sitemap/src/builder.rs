//! Multi-site sitemap builder.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::discover::{discover_site, SiteRoot};
use crate::ignore::{IgnoreError, IgnoreRules};
use crate::sitemap::{render_robots, render_sitemap, SitemapEntry};

/// Configuration for building a sitemap.
#[derive(Debug, Clone)]
pub struct SitemapConfig {
    /// Sites to scan, in output order
    pub sites: Vec<SiteRoot>,

    /// Path of the sitemap file to write
    pub output: PathBuf,

    /// Exclusion rules applied to every site
    pub ignore: IgnoreRules,

    /// Also write robots.txt next to the sitemap
    pub robots_txt: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            sites: vec![SiteRoot::new(".", "https://amit.is-a.dev/")],
            output: PathBuf::from("sitemap.xml"),
            ignore: IgnoreRules::default(),
            robots_txt: false,
        }
    }
}

/// Result of a sitemap build.
#[derive(Debug)]
pub struct SitemapResult {
    /// Number of URLs written
    pub urls: usize,

    /// Sites that were scanned
    pub sites_scanned: usize,

    /// Sites skipped because their directory was missing
    pub sites_skipped: usize,

    /// Path of the written sitemap
    pub output_path: PathBuf,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during a sitemap build.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    #[error(transparent)]
    Ignore(#[from] IgnoreError),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Sitemap builder.
pub struct SitemapBuilder {
    config: SitemapConfig,
}

impl SitemapBuilder {
    /// Create a new sitemap builder.
    pub fn new(config: SitemapConfig) -> Self {
        Self { config }
    }

    /// Scan every configured site and return the collected entries.
    ///
    /// Missing site directories are skipped with a warning. Returns the
    /// entries alongside the number of sites skipped.
    pub fn collect(&self) -> Result<(Vec<SitemapEntry>, usize), SitemapError> {
        let ignore = self.config.ignore.compile()?;
        let mut entries = Vec::new();
        let mut skipped = 0;

        for site in &self.config.sites {
            if !site.local_path.is_dir() {
                tracing::warn!(
                    "Directory not found, skipping: {}",
                    site.local_path.display()
                );
                skipped += 1;
                continue;
            }

            tracing::info!(
                "Scanning {} ({})",
                site.base_url,
                site.local_path.display()
            );

            let found = discover_site(site, &ignore);
            tracing::debug!("Found {} pages under {}", found.len(), site.base_url);
            entries.extend(found);
        }

        Ok((entries, skipped))
    }

    /// Build and write the sitemap.
    pub async fn build(&self) -> Result<SitemapResult, SitemapError> {
        let start = Instant::now();

        let (entries, skipped) = self.collect()?;
        let xml = render_sitemap(&entries);

        if let Some(parent) = self.config.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SitemapError::WriteError(e.to_string()))?;
            }
        }

        fs::write(&self.config.output, xml).map_err(|e| {
            SitemapError::WriteError(format!("{}: {}", self.config.output.display(), e))
        })?;

        if self.config.robots_txt {
            self.write_robots()?;
        }

        Ok(SitemapResult {
            urls: entries.len(),
            sites_scanned: self.config.sites.len() - skipped,
            sites_skipped: skipped,
            output_path: self.config.output.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Write robots.txt beside the sitemap, pointing at the first site.
    fn write_robots(&self) -> Result<(), SitemapError> {
        let Some(site) = self.config.sites.first() else {
            tracing::warn!("No sites configured, not writing robots.txt");
            return Ok(());
        };

        let file_name = self
            .config
            .output
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("sitemap.xml");
        let sitemap_url = format!("{}{}", site.base_url, file_name);

        let robots_path = self.config.output.with_file_name("robots.txt");
        fs::write(&robots_path, render_robots(&sitemap_url))
            .map_err(|e| SitemapError::WriteError(format!("{}: {}", robots_path.display(), e)))?;

        tracing::info!("Wrote {}", robots_path.display());
        Ok(())
    }
}
