use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use estuary::app::AppContext;
use estuary::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the command's JSON response.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let failure = serde_json::json!({
            "success": false,
            "error": e.to_string(),
        });
        println!("{}", failure);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::with_workers(cli.data_dir.clone(), cli.workers)?;

    match cli.command {
        Commands::Feeds => commands::list_feeds(&ctx)?,
        Commands::Articles {
            feeds,
            page,
            per_page,
            search,
        } => {
            commands::articles(&ctx, feeds.as_deref(), page, per_page, search.as_deref()).await?;
        }
        Commands::Add {
            url,
            title,
            category,
            icon,
        } => {
            commands::add_feed(&ctx, &url, title.as_deref(), &category, &icon).await?;
        }
        Commands::Remove { id } => commands::remove_feed(&ctx, &id)?,
        Commands::Refresh { id } => commands::refresh_feed(&ctx, &id).await?,
        Commands::Settings {
            cache_minutes,
            items_per_page,
        } => {
            commands::settings(&ctx, cache_minutes, items_per_page)?;
        }
        Commands::Export { output } => commands::export(&ctx, output.as_deref())?,
    }

    Ok(())
}
