//! Entry point: parse CLI, load configuration and run the scrape.

use clap::Parser;
use hoops_scrape::{
    cli::Hoops,
    commands::{handle_scrape, ScrapeParams},
    AppConfig, Result,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let app = Hoops::parse();

    let default_level = if app.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hoops_scrape={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    let params = ScrapeParams {
        mode: app.mode,
        target_date: app.target_date,
        max_seasons: app.max_seasons,
    };
    let summary = match handle_scrape(&config, params).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Scrape failed");
            return Err(e);
        }
    };

    if app.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }

    Ok(())
}
