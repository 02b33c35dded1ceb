//! # metered-payments
//!
//! Stripe glue for saving a customer's payment method.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌────────────────────────┐
//! │ /payment     │──▶│ Stripe.js       │──▶│ /attach-payment-method │
//! │ setup intent │   │ confirms intent │   │ set as default         │
//! └──────────────┘   └─────────────────┘   └────────────────────────┘
//! ```
//!
//! Every call is one bounded request with the secret key as bearer token,
//! optionally scoped to a connected account.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use metered_payments::{PaymentProcessor, StripePayments};
//!
//! let stripe = StripePayments::from_env()?;
//! let intent = stripe.create_setup_intent("cus_123").await?;
//! // hand intent.client_secret to Stripe.js
//! ```

mod error;
mod model;
mod processor;

pub use error::{PaymentError, Result};
pub use model::{CustomerSummary, PaymentMethodSummary, SetupIntentSummary};
pub use processor::{PaymentProcessor, StripeConfig, StripePayments};
