// Shopping List - local list inspection and quick add
// Entry point and logging setup

use shopping_list::app::AppState;
use shopping_list::config::StoreConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Usage: shopping-list [DATA_DIR] [ITEM...]
#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopping_list=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shopping List");

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> shopping_list::error::Result<()> {
    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shopping-list-data"));

    let app = AppState::open(StoreConfig::new(data_dir)).await?;

    for item in args {
        let added = app.add_item(&item, 1).await?;
        if let Some(promoted) = added.promoted {
            tracing::info!("New suggestion: {}", promoted.title);
        }
    }

    match app.share_text().await? {
        Some(text) => println!("{}", text),
        None => println!("Your list is empty"),
    }

    let suggestions = app.suggestions.list_suggestions().await?;
    if !suggestions.is_empty() {
        let titles: Vec<&str> = suggestions.iter().map(|s| s.title.as_str()).collect();
        println!("\nSuggested: {}", titles.join(", "));
    }

    app.close().await;
    Ok(())
}
