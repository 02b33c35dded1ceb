//! Application State

use std::sync::Arc;

use metered_billing::BillingClient;
use metered_core::UserStore;
use metered_payments::PaymentProcessor;

use crate::config::ServerConfig;
use crate::session::Sessions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Billing service (Tier sidecar or in-memory placeholder)
    pub billing: Arc<dyn BillingClient>,

    /// Payment processor (optional - None if not configured)
    pub payments: Option<Arc<dyn PaymentProcessor>>,

    /// Signed-up users
    pub users: Arc<dyn UserStore>,

    pub sessions: Arc<Sessions>,

    pub config: Arc<ServerConfig>,
}
