use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use studiobook::app;
use studiobook::config::AppConfig;
use studiobook::services::notification::resend::ResendEmailSender;
use studiobook::services::notification::{EmailSender, NotificationDispatcher};
use studiobook::state::AppState;
use studiobook::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN not set, using the default token");
    }

    let store = store::build_store(&config)?;

    let sender: Option<Arc<dyn EmailSender>> = match &config.resend_api_key {
        Some(key) => {
            tracing::info!("sending customer email via {}", config.resend_api_url);
            Some(Arc::new(ResendEmailSender::new(
                config.resend_api_url.clone(),
                key.clone(),
            )))
        }
        None => {
            tracing::warn!("RESEND_API_KEY not set, customer emails are disabled");
            None
        }
    };
    let notifier = Arc::new(NotificationDispatcher::new(
        sender,
        config.from_email.clone(),
        config.studio_name.clone(),
    )?);
    tracing::info!(enabled = notifier.is_enabled(), studio = %config.studio_name, "customer notifications ready");

    let state = Arc::new(AppState::new(config.clone(), store, notifier));
    let app = app::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
