use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use market_scraper::config::Config;
use market_scraper::logging;
use market_scraper::pipeline::MarketPipeline;
use market_scraper::server;

#[derive(Parser)]
#[command(name = "market_scraper")]
#[command(about = "Toronto markets and pop-up vendor events harvester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured source once and print the JSON result
    Scrape {
        /// TOML file overriding the built-in configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Process at most this many sources
        #[arg(long)]
        max_sources: Option<usize>,
        /// Skip the LLM enhancement step even when a key is set
        #[arg(long)]
        no_enhance: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Serve the scraper over HTTP
    Serve {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// List configured sources and the strategy each one uses
    Sources {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::resolve(path.as_deref()).context("failed to load configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            config,
            max_sources,
            no_enhance,
            pretty,
        } => {
            let mut config = load_config(config)?;
            if let Some(n) = max_sources {
                config.max_sources_per_run = n;
            }
            if no_enhance {
                config.enhancement.enabled = false;
            }

            let pipeline = MarketPipeline::from_config(config)?;
            let response = pipeline.respond().await;
            let output = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", output);

            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Serve { config, port } => {
            let config = load_config(config)?;
            let pipeline = Arc::new(MarketPipeline::from_config(config)?);
            info!(port, "starting server");
            server::start_server(pipeline, port).await?;
        }
        Commands::Sources { config } => {
            let config = load_config(config)?;
            let pipeline = MarketPipeline::from_config(config)?;
            for (url, strategy) in pipeline.source_plan() {
                println!("{:<20} {}", strategy, url);
            }
        }
    }

    Ok(())
}
