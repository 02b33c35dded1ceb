//! # metered-billing
//!
//! Plans, subscriptions, usage limits and hosted checkout, backed by the
//! [Tier](https://tier.run) metering service.
//!
//! ## Backends
//!
//! - **Tier** (`TierClient`): a `tier serve` sidecar reached over HTTP
//! - **Memory** (`MemoryBilling`): a fixed in-process catalogue, used when no
//!   sidecar is configured
//!
//! ## Usage
//!
//! ```rust,ignore
//! use metered_billing::{BillingClient, TierClient, gate::run_metered, FEATURE_CONVERT};
//!
//! let billing = TierClient::from_env()?;
//! let org = OrgId::for_user("user");
//!
//! let answer = run_metered(&billing, &org, FEATURE_CONVERT, || request.convert().ok_or(BadInput))
//!     .await?;
//! ```

pub mod collation;
pub mod gate;
mod client;
mod error;
mod memory;
mod model;
mod tier;

pub use client::BillingClient;
pub use error::{BillingError, Result};
pub use gate::{GateError, run_metered};
pub use memory::{FREE_CONVERSIONS, MemoryBilling};
pub use model::{
    CheckoutOptions, FEATURE_CONVERT, FeatureTerms, Phase, Plan, PriceTier, Usage, dollars,
};
pub use tier::{TierClient, TierConfig};
