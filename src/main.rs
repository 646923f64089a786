use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use stock_watcher::AppConfig;
use stock_watcher::fetcher::HttpFetcher;
use stock_watcher::notifier::TelegramNotifier;
use stock_watcher::scheduler::StockScheduler;
use stock_watcher::store::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stock_watcher=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("Starting Stock Watcher...");
    info!(
        "database = {}, interval = {} seconds, user_agent = {:?}, always_notify = {}",
        config.database.path,
        config.scheduler.interval_seconds,
        config.fetcher.user_agent,
        config.scheduler.always_notify
    );

    let store = SqliteStore::connect(&config.database).await?;
    store.migrate().await?;

    let scheduler = StockScheduler::new(
        Arc::new(store),
        Arc::new(HttpFetcher::new(&config.fetcher)?),
        Arc::new(TelegramNotifier::new(&config.notifications.telegram)?),
        config.scheduler.clone(),
    );

    tokio::select! {
        _ = scheduler.run_forever() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down...");
        }
    }

    Ok(())
}
