//! Payment method setup

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

use metered_payments::PaymentProcessor;

use crate::error::ApiError;
use crate::pages::{self, PaymentView};
use crate::session::CurrentUser;
use crate::state::AppState;

/// Query Stripe appends when it redirects back after confirming a setup intent
#[derive(Debug, Default, Deserialize)]
pub struct SetupReturn {
    pub setup_intent: Option<String>,
    pub redirect_status: Option<String>,
}

fn processor(state: &AppState) -> Result<&Arc<dyn PaymentProcessor>, ApiError> {
    state.payments.as_ref().ok_or(ApiError::PaymentsDisabled)
}

pub async fn payment(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Html<String>, ApiError> {
    let payments = processor(&state)?;
    let customer_id = state.billing.whois(&user.org).await?;

    let customer = payments.fetch_customer(&customer_id).await?;
    let intent = payments.create_setup_intent(&customer_id).await?;
    let return_url = state.config.url("/attach-payment-method");

    Ok(pages::payment(&PaymentView {
        customer: &customer,
        publishable_key: payments.publishable_key(),
        client_secret: &intent.client_secret,
        return_url: &return_url,
    }))
}

pub async fn attach_payment_method(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(setup): Query<SetupReturn>,
) -> Result<Redirect, ApiError> {
    if setup.redirect_status.as_deref() != Some("succeeded") {
        tracing::info!(
            org = %user.org,
            status = ?setup.redirect_status,
            "Setup intent not confirmed"
        );
        return Ok(Redirect::to("/payment"));
    }

    let intent = setup
        .setup_intent
        .ok_or_else(|| ApiError::Validation("setup_intent required".into()))?;

    let payments = processor(&state)?;
    let customer_id = state.billing.whois(&user.org).await?;
    payments.attach_payment_method(&customer_id, &intent).await?;

    Ok(Redirect::to("/payment"))
}
