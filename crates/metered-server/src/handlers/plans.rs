//! Pricing and plan changes

use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use metered_billing::CheckoutOptions;

use crate::config::PlanChangeMode;
use crate::error::ApiError;
use crate::pages;
use crate::session::{CurrentUser, plan_hint, set_cookies};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanChoice {
    pub plan: String,
}

/// Published plans, freshly pulled on every request
pub async fn pricing(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let plans = state.billing.pull_latest_pricing().await?;
    let signed_in = state.sessions.authenticated_user(&headers).is_some();

    Ok(pages::pricing(&plans, plan_hint(&headers).as_deref(), signed_in))
}

pub async fn change_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(choice): Form<PlanChoice>,
) -> Result<Response, ApiError> {
    match state.config.plan_change {
        PlanChangeMode::Direct => {
            state.billing.subscribe(&user.org, &choice.plan).await?;
            tracing::info!(org = %user.org, plan = %choice.plan, "Plan changed");

            let cookie = state.sessions.plan_cookie(&choice.plan);
            Ok((set_cookies(vec![cookie]), Redirect::to("/app")).into_response())
        }
        PlanChangeMode::Checkout => {
            let options = CheckoutOptions {
                cancel_url: Some(state.config.url("/checkout_cancel")),
                features: vec![choice.plan.clone()],
            };
            let url = state
                .billing
                .start_checkout(&user.org, &state.config.url("/checkout_success"), options)
                .await?;
            tracing::info!(org = %user.org, plan = %choice.plan, "Checkout started");

            Ok(Redirect::to(&url).into_response())
        }
    }
}

/// Back from checkout: refresh the plan hint. The redirect happens even when
/// the phase cannot be read.
pub async fn checkout_success(State(state): State<AppState>, user: CurrentUser) -> Response {
    match state.billing.current_phase(&user.org).await {
        Ok(phase) => {
            if let Some(plan) = phase.current_plan() {
                let cookie = state.sessions.plan_cookie(plan);
                return (set_cookies(vec![cookie]), Redirect::to("/app")).into_response();
            }
        }
        Err(e) => tracing::warn!(org = %user.org, error = %e, "Phase lookup after checkout failed"),
    }
    Redirect::to("/app").into_response()
}

pub async fn checkout_cancel(_user: CurrentUser) -> Redirect {
    Redirect::to("/pricing")
}
