//! HTTP error mapping
//!
//! Every failure a handler can surface goes through [`ApiError`]. Upstream
//! failures from either external service share one response shape so no
//! provider payload reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use metered_billing::{BillingError, GateError, Usage};
use metered_core::CoreError;
use metered_payments::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,

    #[serde(flatten)]
    pub usage: Option<Usage>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The org's plan does not permit another use
    #[error("Plan limit reached for {}", .0.feature)]
    Entitlement(Usage),

    /// Billing or payment service failed or was unreachable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// No payment processor configured
    #[error("Payments not configured")]
    PaymentsDisabled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            Self::Entitlement(_) => (
                StatusCode::PAYMENT_REQUIRED,
                "PLAN_LIMIT_REACHED",
                "not allowed by plan".into(),
            ),
            Self::Upstream(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_UNAVAILABLE",
                "A required service is unavailable. Please try again.".into(),
            ),
            Self::PaymentsDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PAYMENTS_DISABLED",
                "Payments not configured".into(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred.".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();

        match &self {
            Self::Upstream(detail) => tracing::error!(detail = %detail, "Upstream failure"),
            Self::Internal(detail) => tracing::error!(detail = %detail, "Internal failure"),
            _ => tracing::debug!(code, "Request rejected"),
        }

        let usage = match self {
            Self::Entitlement(usage) => Some(usage),
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.into(),
                usage,
            }),
        )
            .into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Config(_) => Self::PaymentsDisabled,
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<GateError<ApiError>> for ApiError {
    fn from(err: GateError<ApiError>) -> Self {
        match err {
            GateError::Upstream(e) => e.into(),
            GateError::Exhausted(usage) => Self::Entitlement(usage),
            GateError::Rejected(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Entitlement(Usage::not_entitled("feature:convert"))
                .into_response()
                .status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ApiError::from(BillingError::Timeout(10)).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(PaymentError::Stripe("card_declined".into()))
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_upstream_shape_hides_provider_detail() {
        let api = ApiError::from(BillingError::Api {
            status: 500,
            code: "internal".into(),
            message: "stripe: secret leaked".into(),
        });
        let (_, code, error) = api.parts();
        assert_eq!(code, "UPSTREAM_UNAVAILABLE");
        assert!(!error.contains("stripe"));
    }

    #[test]
    fn test_entitlement_body() {
        let usage = Usage { feature: "feature:convert".into(), used: 10, limit: 10 };
        let body = serde_json::to_value(ErrorResponse {
            error: "not allowed by plan".into(),
            code: "PLAN_LIMIT_REACHED".into(),
            usage: Some(usage),
        })
        .unwrap();
        assert_eq!(body["used"], 10);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["feature"], "feature:convert");
    }
}
