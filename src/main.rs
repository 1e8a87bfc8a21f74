use hiring_pipeline::{
    config::init_config,
    database::{memory::InMemoryStore, pool, postgres::PgStore, store::PipelineStore},
    routes::{self, RateLimits},
    services::notification_service::{LogNotifier, Notifier, WebhookNotifier},
    telemetry, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = init_config()?;
    telemetry::init(config.log_format)?;

    let (store, storage): (Arc<dyn PipelineStore>, &'static str) = match &config.database_url {
        Some(url) => {
            let pool = pool::create_pool(url).await?;
            pool::run_migrations(&pool).await?;
            let store: Arc<dyn PipelineStore> = Arc::new(PgStore::new(pool));
            (store, "postgres")
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            let store: Arc<dyn PipelineStore> = Arc::new(InMemoryStore::new());
            (store, "memory")
        }
    };

    let notifier: Arc<dyn Notifier> = match (&config.notification_webhook_url, &config.webhook_secret)
    {
        (Some(url), Some(secret)) => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.notify_timeout_secs))
                .build()?;
            info!(target_url = %url, "delivering notifications through webhook");
            Arc::new(WebhookNotifier::new(client, url.clone(), secret.clone()))
        }
        _ => {
            info!("no notification webhook configured, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let app_state = AppState::new(store, notifier, config, storage);
    let notifications = app_state.pipeline.notifications().clone();

    let app = routes::build_router(
        app_state,
        RateLimits {
            api_rps: config.api_rps,
            public_rps: config.public_rps,
        },
    );

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(in_flight = notifications.in_flight(), "draining notifications");
    notifications.flush().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
