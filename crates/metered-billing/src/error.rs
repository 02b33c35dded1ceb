//! Billing Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, BillingError>;

/// Billing-service errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Transport failure talking to the billing service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not finish within the configured bound
    #[error("Billing service timed out after {0}s")]
    Timeout(u64),

    /// The billing service answered with an error payload
    #[error("Billing API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// No billing record exists for the org
    #[error("Org not found: {0}")]
    OrgNotFound(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local state error (placeholder billing only)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BillingError {
    /// Whether the org simply has no billing record yet
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::OrgNotFound(_))
    }

    /// Provider-neutral message safe to show to end users
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::OrgNotFound(_) => "No billing account found. Please sign up again.",
            Self::Timeout(_) | Self::Http(_) => {
                "The billing service is currently unavailable. Please try again."
            }
            _ => "The billing service could not process your request.",
        }
    }
}

impl From<serde_json::Error> for BillingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
