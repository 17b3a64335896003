mod config;
mod feed;

use std::sync::Arc;

use anyhow::Context;
use storehooks_events::{
    Dispatcher, InMemoryCatalog, SubscriberRegistry, WebhookDelivery, WebhookEventConsumer,
    WebhookManager,
};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{LogFormat, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = RelayConfig::from_env()?;

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(
        subscriptions = %config.subscriptions_path.display(),
        webhook_timeout_secs = config.webhook_timeout.as_secs(),
        "Loaded relay configuration"
    );

    // --- Subscriptions ---
    let subscriptions = tokio::fs::read_to_string(&config.subscriptions_path)
        .await
        .with_context(|| {
            format!(
                "failed to read subscriptions from {}",
                config.subscriptions_path.display()
            )
        })?;
    let registry = Arc::new(SubscriberRegistry::from_json(&subscriptions)?);
    tracing::info!(count = registry.list()?.len(), "Webhook subscriptions registered");

    // --- Delivery ---
    let delivery = Arc::new(WebhookDelivery::new(config.webhook_timeout)?);
    let tracker = TaskTracker::new();
    let manager = WebhookManager::new(registry, delivery, tracker.clone(), Handle::current());

    // --- Consumer ---
    let catalog = Arc::new(InMemoryCatalog::new());
    let consumer = WebhookEventConsumer::new(Arc::clone(&catalog), Dispatcher::new(manager));

    // --- Shutdown signal ---
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl-C, stopping feed");
                cancel.cancel();
            }
        });
    }

    // --- Feed ---
    let stats = feed::pump(tokio::io::stdin(), &catalog, &consumer, cancel).await?;
    tracing::info!(
        snapshots = stats.snapshots,
        removals = stats.removals,
        events = stats.events,
        failed = stats.failed,
        rejected = stats.rejected,
        "Feed finished"
    );

    tracker.close();
    if tokio::time::timeout(config.shutdown_grace, tracker.wait())
        .await
        .is_err()
    {
        tracing::warn!(
            in_flight = tracker.len(),
            "Shutdown grace period elapsed with webhook deliveries in flight"
        );
    }

    tracing::info!("Relay stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storehooks_relay=debug,storehooks_events=debug".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
