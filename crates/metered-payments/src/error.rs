//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Stripe did not answer within the configured bound
    #[error("Stripe timed out after {0}s")]
    Timeout(u64),

    /// An id did not have the Stripe prefix it needs
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Stripe answered without a field the flow depends on
    #[error("Missing field in Stripe response: {0}")]
    MissingField(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Stripe(_) | Self::Timeout(_) => "Payment processing failed. Please try again.",
            Self::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your request.",
        }
    }
}

impl From<stripe::StripeError> for PaymentError {
    fn from(err: stripe::StripeError) -> Self {
        Self::Stripe(err.to_string())
    }
}
