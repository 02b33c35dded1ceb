use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use metered_billing::{FEATURE_CONVERT, run_metered};
use metered_core::{Conversion, Temperature};

use crate::error::ApiError;
use crate::session::CurrentUser;
use crate::state::AppState;

fn temp_required() -> ApiError {
    ApiError::Validation("bad request, temp required".into())
}

/// Metered temperature conversion.
///
/// Entitlement is checked before the body is looked at, so an exhausted org
/// gets 402 even for a malformed request. Nothing is reported unless a
/// conversion was produced.
pub async fn convert(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<Conversion>, JsonRejection>,
) -> Result<Json<Temperature>, ApiError> {
    let converted = run_metered(state.billing.as_ref(), &user.org, FEATURE_CONVERT, move || {
        let Json(request) = body.map_err(|e| {
            tracing::debug!(error = %e, "Unreadable conversion body");
            temp_required()
        })?;
        request.convert().ok_or_else(temp_required)
    })
    .await?;

    Ok(Json(converted))
}
