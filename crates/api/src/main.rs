//! kb-slack API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use kb_slack_common::config::AppConfig;
use kb_slack_common::db::connect_kanboard;
use kb_slack_notifier::Notifier;
use kb_slack_notifier::store::PgStore;
use kb_slack_notifier::transport::HttpTransport;

use kb_slack_api::routes::create_router;
use kb_slack_api::state::AppState;

/// Event payloads are small; comments are the largest field.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json for structured output
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("kb_slack_api=debug,kb_slack_notifier=debug,tower_http=debug")
        }),
    );
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!("Starting kb-slack API server...");

    // Load configuration
    let config = AppConfig::from_env()?;
    if config.default_webhook_url.is_empty() {
        tracing::info!("No default webhook; only users and projects with their own URL are notified");
    }
    tracing::info!(
        forward_attachments = config.forward_attachments,
        links = !config.application_url.is_empty(),
        "Notifier configured"
    );

    let pool = connect_kanboard(&config).await?;

    let notifier = Notifier::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(HttpTransport::new()?),
        config.notifier_config(),
    );
    let state = AppState::new(notifier);

    let app = create_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .map_err(|_| anyhow::anyhow!("LISTEN_ADDR must be a socket address"))?;
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    tracing::info!("kb-slack API server stopped.");
    Ok(())
}
