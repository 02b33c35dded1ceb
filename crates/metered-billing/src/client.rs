//! Billing client abstraction
//!
//! Every operation is a single request against the billing service; nothing is
//! cached locally, so each answer reflects the service's state at call time.

use async_trait::async_trait;
use metered_core::OrgId;

use crate::collation::sort_by_locale;
use crate::error::Result;
use crate::model::{CheckoutOptions, Phase, Plan, Usage};

/// Billing client trait (Strategy pattern)
///
/// Implemented by [`TierClient`](crate::TierClient) for a live sidecar and by
/// [`MemoryBilling`](crate::MemoryBilling) when none is wired up.
#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Fetch the published plans in the order the service returns them
    async fn pull(&self) -> Result<Vec<Plan>>;

    /// Published plans sorted by id in English-locale order
    async fn pull_latest_pricing(&self) -> Result<Vec<Plan>> {
        let mut plans = self.pull().await?;
        sort_by_locale(&mut plans, |plan| plan.id.as_str());
        Ok(plans)
    }

    /// Put the org on a plan starting now. Repeating the call with the same
    /// plan leaves the org on that plan.
    async fn subscribe(&self, org: &OrgId, plan_id: &str) -> Result<()>;

    /// Current used-vs-limit for one feature
    async fn lookup_usage(&self, org: &OrgId, feature: &str) -> Result<Usage>;

    /// Record one use of a feature
    async fn report_usage(&self, org: &OrgId, feature: &str) -> Result<()>;

    /// The org's active phase
    async fn current_phase(&self, org: &OrgId) -> Result<Phase>;

    /// Begin a hosted checkout, returning the URL to send the user to
    async fn start_checkout(
        &self,
        org: &OrgId,
        success_url: &str,
        options: CheckoutOptions,
    ) -> Result<String>;

    /// Payment-processor customer id linked to the org
    async fn whois(&self, org: &OrgId) -> Result<String>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
