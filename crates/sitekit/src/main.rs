//! sitekit CLI - maintenance tasks for a personal static website.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sitekit")]
#[command(about = "Generate QR assets and sitemaps for a personal website")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sitekit.toml config file
    #[arg(short, long, default_value = "sitekit.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default sitekit.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate styled QR codes for every configured route
    Qr {
        /// Output directory (defaults to config or "assets")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Route identifier to generate; repeat to generate several.
        /// Replaces the configured route list.
        #[arg(short, long = "route")]
        routes: Vec<String>,
    },

    /// Build sitemap.xml from the configured site directories
    Sitemap {
        /// Sitemap file to write (defaults to config or "sitemap.xml")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Qr { output, routes } => {
            commands::qr::run(&cli.config, output, routes).await?;
        }
        Commands::Sitemap { output } => {
            commands::sitemap::run(&cli.config, output).await?;
        }
    }

    Ok(())
}
