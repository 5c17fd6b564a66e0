//! product-meta - Resolve a representative image and title for any product URL

use anyhow::Result;
use clap::{Parser, Subcommand};
use product_meta::commands::{CheckCommand, PlanCommand, ResolveCommand};
use product_meta::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "product-meta",
    version,
    about = "Resolve a representative image and title for product URLs",
    long_about = "Scrapes OpenGraph/Twitter tags from product pages and falls back to an image search \
                  when a page has no image."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "PRODUCT_META_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve image and title for product URLs
    #[command(alias = "r")]
    Resolve {
        /// Product page URL(s)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Known product title, used as the search query (single URL only)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show the search plan for a URL without network access
    #[command(alias = "p")]
    Plan {
        /// Product page URL
        url: String,

        /// Known product title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Check that the image search credentials work
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    match cli.command {
        Commands::Resolve { urls, title } => {
            let cmd = ResolveCommand::new(config);
            let output = cmd.execute(&urls, title.as_deref()).await?;
            println!("{}", output);
        }

        Commands::Plan { url, title } => {
            let cmd = PlanCommand::new(config);
            println!("{}", cmd.execute(&url, title.as_deref()));
        }

        Commands::Check => {
            let cmd = CheckCommand::new(config);
            println!("{}", cmd.execute().await?);
        }
    }

    Ok(())
}
