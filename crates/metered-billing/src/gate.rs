//! Entitlement gate for metered features.
//!
//! ```text
//! lookup_usage ──▶ used >= limit? ──yes──▶ Exhausted   (nothing reported)
//!                        │ no
//!                        ▼
//!                   operation() ──Err──▶ Rejected      (nothing reported)
//!                        │ Ok
//!                        ▼
//!                   report_usage ──▶ Ok(output)        (reported once)
//! ```
//!
//! A failed usage report is logged and does not fail the call; the operation
//! has already produced its result by then.

use metered_core::OrgId;

use crate::client::BillingClient;
use crate::error::BillingError;
use crate::model::Usage;

/// Why a metered call did not produce output
#[derive(Debug)]
pub enum GateError<E> {
    /// Usage could not be checked
    Upstream(BillingError),

    /// The org has used up its allowance
    Exhausted(Usage),

    /// The operation itself refused the input
    Rejected(E),
}

/// Run `operation` for `org` if its plan still permits `feature`.
pub async fn run_metered<T, E, F>(
    billing: &dyn BillingClient,
    org: &OrgId,
    feature: &str,
    operation: F,
) -> Result<T, GateError<E>>
where
    F: FnOnce() -> Result<T, E>,
{
    let usage = billing
        .lookup_usage(org, feature)
        .await
        .map_err(GateError::Upstream)?;

    if usage.exhausted() {
        tracing::info!(
            org = %org,
            feature = %feature,
            used = usage.used,
            limit = usage.limit,
            "Feature limit reached"
        );
        return Err(GateError::Exhausted(usage));
    }

    let output = operation().map_err(GateError::Rejected)?;

    if let Err(e) = billing.report_usage(org, feature).await {
        tracing::error!(
            org = %org,
            feature = %feature,
            error = %e,
            "Failed to report usage"
        );
    }

    Ok(output)
}
