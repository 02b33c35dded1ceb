//! Billing data model
//!
//! Shapes follow the Tier API wire format. Plan attributes beyond the ones
//! read here are kept verbatim in [`Plan::attributes`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metered feature name for the temperature converter
pub const FEATURE_CONVERT: &str = "feature:convert";

/// A pricing plan as published by the billing service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier, e.g. `plan:free@0` (the key of the pull response map)
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub features: BTreeMap<String, FeatureTerms>,

    /// Provider-defined attributes not modelled above
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Plan {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>, terms: FeatureTerms) -> Self {
        self.features.insert(feature.into(), terms);
        self
    }

    /// Title for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Usage limit this plan grants for a feature.
    ///
    /// `None` when the plan does not include the feature, `Some(None)` when it
    /// is included without a cap.
    pub fn limit_for(&self, feature: &str) -> Option<Option<u64>> {
        self.features.get(feature).map(FeatureTerms::limit)
    }

    /// Sum of the flat per-interval fees, in cents
    pub fn base_price_cents(&self) -> Decimal {
        self.features
            .values()
            .filter_map(|terms| terms.base)
            .map(Decimal::from)
            .sum()
    }
}

/// How a plan prices and limits one feature
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Flat fee in cents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<PriceTier>,
}

impl FeatureTerms {
    /// Feature capped at `upto` uses per interval
    pub fn limited(upto: u64) -> Self {
        Self {
            tiers: vec![PriceTier {
                upto: Some(upto),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// Feature with no usage cap
    pub fn unlimited() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_base(mut self, cents: i64) -> Self {
        self.base = Some(cents);
        self
    }

    /// The last tier's ceiling; an open last tier (or no tiers) means no cap.
    pub fn limit(&self) -> Option<u64> {
        self.tiers.last().and_then(|tier| tier.upto)
    }
}

/// One step of a tiered price
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upto: Option<u64>,

    /// Per-unit price in cents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<i64>,
}

/// Used-vs-limit for one (org, feature) pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub feature: String,
    pub used: u64,
    pub limit: u64,
}

impl Usage {
    /// Usage for a feature the org's plan does not include
    pub fn not_entitled(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            used: 0,
            limit: 0,
        }
    }

    /// `used >= limit`: no further use is allowed
    pub const fn exhausted(&self) -> bool {
        self.used >= self.limit
    }

    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// The plans an org is on over a time window
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub plans: Vec<String>,
}

impl Phase {
    /// First active plan, used as the display hint
    pub fn current_plan(&self) -> Option<&str> {
        self.plans.first().map(String::as_str)
    }
}

/// Extra parameters for a hosted checkout
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,

    /// Plans or features to subscribe on completion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// Format cents as dollars with two decimals (`1250` → `$12.50`)
pub fn dollars(cents: Decimal) -> String {
    let amount = (cents / Decimal::ONE_HUNDRED).round_dp(2);
    format!("${amount:.2}")
}
