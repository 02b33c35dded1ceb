//! In-memory billing
//!
//! Stands in for the billing service when no Tier sidecar is configured, and
//! backs the tests. Plans are fixed at construction; subscriptions and usage
//! counters live behind one lock.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metered_core::OrgId;

use crate::client::BillingClient;
use crate::error::{BillingError, Result};
use crate::model::{CheckoutOptions, FEATURE_CONVERT, FeatureTerms, Phase, Plan, Usage};

/// Free-plan allowance for the converter
pub const FREE_CONVERSIONS: u64 = 10;

#[derive(Default)]
struct Ledger {
    subscriptions: HashMap<OrgId, Subscription>,
    usage: HashMap<(OrgId, String), u64>,
}

struct Subscription {
    plan_id: String,
    since: DateTime<Utc>,
}

/// Placeholder billing backend
pub struct MemoryBilling {
    plans: Vec<Plan>,
    ledger: RwLock<Ledger>,
}

impl Default for MemoryBilling {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBilling {
    /// Catalogue of a free plan (10 conversions) and an unlimited pro plan
    pub fn new() -> Self {
        Self::with_plans(vec![
            Plan::new("plan:free@0")
                .with_title("Free")
                .with_feature(FEATURE_CONVERT, FeatureTerms::limited(FREE_CONVERSIONS)),
            Plan::new("plan:pro@0")
                .with_title("Pro")
                .with_feature(FEATURE_CONVERT, FeatureTerms::unlimited().with_base(1000)),
        ])
    }

    pub fn with_plans(plans: Vec<Plan>) -> Self {
        Self {
            plans,
            ledger: RwLock::new(Ledger::default()),
        }
    }

    fn plan(&self, plan_id: &str) -> Result<&Plan> {
        self.plans
            .iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| BillingError::Api {
                status: 400,
                code: "invalid_plan".into(),
                message: format!("unknown plan {plan_id}"),
            })
    }

    fn subscribed_plan(&self, ledger: &Ledger, org: &OrgId) -> Result<&Plan> {
        let sub = ledger
            .subscriptions
            .get(org)
            .ok_or_else(|| BillingError::OrgNotFound(org.to_string()))?;
        self.plan(&sub.plan_id)
    }
}

fn poisoned<T>(_: T) -> BillingError {
    BillingError::Storage("billing ledger lock poisoned".into())
}

#[async_trait]
impl BillingClient for MemoryBilling {
    async fn pull(&self) -> Result<Vec<Plan>> {
        Ok(self.plans.clone())
    }

    async fn subscribe(&self, org: &OrgId, plan_id: &str) -> Result<()> {
        self.plan(plan_id)?;
        let mut ledger = self.ledger.write().map_err(poisoned)?;

        let unchanged = ledger
            .subscriptions
            .get(org)
            .is_some_and(|sub| sub.plan_id == plan_id);
        if !unchanged {
            ledger.subscriptions.insert(
                org.clone(),
                Subscription {
                    plan_id: plan_id.to_string(),
                    since: Utc::now(),
                },
            );
            tracing::info!(org = %org, plan = %plan_id, "Subscribed org (in-memory)");
        }
        Ok(())
    }

    async fn lookup_usage(&self, org: &OrgId, feature: &str) -> Result<Usage> {
        let ledger = self.ledger.read().map_err(poisoned)?;
        let plan = self.subscribed_plan(&ledger, org)?;

        let used = ledger
            .usage
            .get(&(org.clone(), feature.to_string()))
            .copied()
            .unwrap_or(0);

        Ok(match plan.limit_for(feature) {
            None => Usage::not_entitled(feature),
            Some(limit) => Usage {
                feature: feature.to_string(),
                used,
                limit: limit.unwrap_or(u64::MAX),
            },
        })
    }

    async fn report_usage(&self, org: &OrgId, feature: &str) -> Result<()> {
        let mut ledger = self.ledger.write().map_err(poisoned)?;
        if !ledger.subscriptions.contains_key(org) {
            return Err(BillingError::OrgNotFound(org.to_string()));
        }

        *ledger
            .usage
            .entry((org.clone(), feature.to_string()))
            .or_insert(0) += 1;
        Ok(())
    }

    async fn current_phase(&self, org: &OrgId) -> Result<Phase> {
        let ledger = self.ledger.read().map_err(poisoned)?;
        let plan = self.subscribed_plan(&ledger, org)?;
        let since = ledger.subscriptions.get(org).map(|sub| sub.since);

        Ok(Phase {
            effective: since,
            end: None,
            features: plan
                .features
                .keys()
                .map(|feature| format!("{feature}@{}", plan.id))
                .collect(),
            plans: vec![plan.id.clone()],
        })
    }

    /// There is no hosted page to visit: the requested plans are applied
    /// immediately and the user goes straight to `success_url`.
    async fn start_checkout(
        &self,
        org: &OrgId,
        success_url: &str,
        options: CheckoutOptions,
    ) -> Result<String> {
        for plan_id in &options.features {
            self.subscribe(org, plan_id).await?;
        }
        Ok(success_url.to_string())
    }

    async fn whois(&self, org: &OrgId) -> Result<String> {
        Err(BillingError::OrgNotFound(org.to_string()))
    }

    fn name(&self) -> &str {
        "MemoryBilling"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> OrgId {
        OrgId::for_user("user")
    }

    #[tokio::test]
    async fn test_unknown_org_fails() {
        let billing = MemoryBilling::new();
        let err = billing.lookup_usage(&org(), FEATURE_CONVERT).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(billing.current_phase(&org()).await.unwrap_err().is_not_found());
        assert!(billing.report_usage(&org(), FEATURE_CONVERT).await.is_err());
    }

    #[tokio::test]
    async fn test_free_plan_counts_down() {
        let billing = MemoryBilling::new();
        billing.subscribe(&org(), "plan:free@0").await.unwrap();

        let usage = billing.lookup_usage(&org(), FEATURE_CONVERT).await.unwrap();
        assert_eq!(usage, Usage { feature: FEATURE_CONVERT.into(), used: 0, limit: 10 });

        for _ in 0..FREE_CONVERSIONS {
            billing.report_usage(&org(), FEATURE_CONVERT).await.unwrap();
        }
        assert!(billing.lookup_usage(&org(), FEATURE_CONVERT).await.unwrap().exhausted());
    }

    #[tokio::test]
    async fn test_subscribe_twice_is_harmless() {
        let billing = MemoryBilling::new();
        billing.subscribe(&org(), "plan:free@0").await.unwrap();
        let first = billing.current_phase(&org()).await.unwrap();
        billing.subscribe(&org(), "plan:free@0").await.unwrap();
        let second = billing.current_phase(&org()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.current_plan(), Some("plan:free@0"));
    }

    #[tokio::test]
    async fn test_unknown_plan_rejected() {
        let billing = MemoryBilling::new();
        let err = billing.subscribe(&org(), "plan:gold@9").await.unwrap_err();
        assert!(matches!(err, BillingError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_checkout_applies_plan() {
        let billing = MemoryBilling::new();
        billing.subscribe(&org(), "plan:free@0").await.unwrap();

        let url = billing
            .start_checkout(
                &org(),
                "http://localhost/checkout_success",
                CheckoutOptions {
                    cancel_url: Some("http://localhost/checkout_cancel".into()),
                    features: vec!["plan:pro@0".into()],
                },
            )
            .await
            .unwrap();

        assert_eq!(url, "http://localhost/checkout_success");
        let usage = billing.lookup_usage(&org(), FEATURE_CONVERT).await.unwrap();
        assert_eq!(usage.limit, u64::MAX);
    }

    #[tokio::test]
    async fn test_pricing_is_sorted() {
        let billing = MemoryBilling::with_plans(vec![Plan::new("pro"), Plan::new("basic")]);
        let ids: Vec<_> = billing
            .pull_latest_pricing()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["basic", "pro"]);
    }
}
