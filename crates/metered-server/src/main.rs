//! metered-server binary

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metered_billing::{BillingClient, BillingError, MemoryBilling, TierClient};
use metered_core::MemoryUserStore;
use metered_payments::{PaymentError, PaymentProcessor, StripePayments};
use metered_server::{config::ServerConfig, router, session::Sessions, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let billing: Arc<dyn BillingClient> = match TierClient::from_env() {
        Ok(tier) => {
            tracing::info!("✓ Tier sidecar at {}", tier.base_url());
            Arc::new(tier)
        }
        Err(BillingError::Config(reason)) => {
            tracing::warn!("⚠ Tier not configured ({reason}) - using in-memory billing");
            Arc::new(MemoryBilling::new())
        }
        Err(e) => return Err(e.into()),
    };

    let payments: Option<Arc<dyn PaymentProcessor>> = match StripePayments::from_env() {
        Ok(stripe) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(stripe))
        }
        Err(PaymentError::Config(reason)) => {
            tracing::warn!("⚠ Stripe not configured ({reason}) - payments disabled");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let sessions = Sessions::from_secret(config.session_secret.as_deref(), config.cookie_secure)
        .map_err(|e| anyhow::anyhow!("invalid SESSION_SECRET: {e}"))?;

    let addr = format!("0.0.0.0:{}", config.port);

    let state = AppState {
        billing,
        payments,
        users: Arc::new(MemoryUserStore::new()),
        sessions: Arc::new(sessions),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 metered-server listening on http://{addr}");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
