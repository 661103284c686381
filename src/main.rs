use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsflow::app::AppContext;
use newsflow::cli::{commands, Cli, Commands};
use newsflow::config::Config;
use newsflow::domain::SearchOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Headlines { category, refresh } => {
            commands::show_headlines(&ctx, category, refresh).await?;
        }
        Commands::Search {
            query,
            sort,
            range,
            language,
        } => {
            let options = SearchOptions {
                sort_by: sort,
                date_range: range,
                language,
            };
            commands::search(&ctx, &query, options).await?;
        }
        Commands::Summarize { url } => {
            commands::summarize(&ctx, &url).await?;
        }
    }

    Ok(())
}
