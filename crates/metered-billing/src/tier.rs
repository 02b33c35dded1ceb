//! Tier API client
//!
//! Talks to a Tier sidecar (`tier serve`) over its JSON HTTP API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use metered_core::OrgId;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::client::BillingClient;
use crate::error::{BillingError, Result};
use crate::model::{CheckoutOptions, Phase, Plan, Usage};

/// Tier client configuration
#[derive(Clone, Debug)]
pub struct TierConfig {
    /// Sidecar base URL, e.g. `http://127.0.0.1:8080`
    pub base_url: String,

    /// API key sent as the basic-auth user; empty for an unauthenticated sidecar
    pub api_key: String,

    /// Bound applied to every request, in seconds
    pub timeout_secs: u64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl TierConfig {
    /// Read `TIER_BASE_URL`, `TIER_API_KEY` and `TIER_TIMEOUT_SECS`.
    ///
    /// Fails when `TIER_BASE_URL` is unset, meaning no billing service is wired up.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TIER_BASE_URL")
            .map_err(|_| BillingError::Config("TIER_BASE_URL not set".into()))?;
        let api_key = std::env::var("TIER_API_KEY").unwrap_or_default();
        let timeout_secs = std::env::var("TIER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            base_url,
            api_key,
            timeout_secs,
        })
    }
}

/// Tier billing client
pub struct TierClient {
    http: reqwest::Client,
    config: TierConfig,
}

#[derive(Deserialize)]
struct PullResponse {
    #[serde(default)]
    plans: BTreeMap<String, Plan>,
}

#[derive(Deserialize)]
struct LimitsResponse {
    #[serde(default)]
    usage: Vec<Usage>,
}

#[derive(Deserialize)]
struct WhoisResponse {
    #[serde(default)]
    stripe_id: String,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    org: &'a str,
    phases: Vec<PhaseRequest<'a>>,
}

#[derive(Serialize)]
struct PhaseRequest<'a> {
    features: Vec<&'a str>,
}

#[derive(Serialize)]
struct ReportRequest<'a> {
    org: &'a str,
    feature: &'a str,
    n: u64,
}

#[derive(Serialize)]
struct CheckoutRequest<'a> {
    org: &'a str,
    success_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_url: Option<&'a str>,
    #[serde(skip_serializing_if = "no_features")]
    features: &'a [String],
}

fn no_features(features: &&[String]) -> bool {
    features.is_empty()
}

impl TierClient {
    pub fn new(config: TierConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TierConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.api_key.is_empty() {
            request
        } else {
            request.basic_auth(&self.config.api_key, None::<&str>)
        }
    }

    fn transport(&self, err: reqwest::Error) -> BillingError {
        if err.is_timeout() {
            BillingError::Timeout(self.config.timeout_secs)
        } else {
            BillingError::Http(err)
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, org: &OrgId) -> Result<T> {
        let request = self
            .authorize(self.http.get(self.url(path)))
            .query(&[("org", org.as_str())]);
        self.send(request, Some(org)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        org: Option<&OrgId>,
    ) -> Result<T> {
        let request = self.authorize(self.http.post(self.url(path))).json(body);
        self.send(request, org).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        org: Option<&OrgId>,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| self.transport(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport(e))?;

        if status.is_success() {
            let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
            return Ok(serde_json::from_slice(body)?);
        }

        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or(ErrorBody {
            status: status.as_u16(),
            code: String::new(),
            message: String::from_utf8_lossy(&bytes).into_owned(),
        });

        tracing::warn!(
            status = status.as_u16(),
            code = %body.code,
            message = %body.message,
            "Tier request failed"
        );

        match (body.code.as_str(), org) {
            ("org_not_found", Some(org)) => Err(BillingError::OrgNotFound(org.to_string())),
            _ => Err(BillingError::Api {
                status: if body.status == 0 { status.as_u16() } else { body.status },
                code: body.code,
                message: body.message,
            }),
        }
    }
}

#[async_trait]
impl BillingClient for TierClient {
    async fn pull(&self) -> Result<Vec<Plan>> {
        let request = self.authorize(self.http.get(self.url("/v1/pull")));
        let latest: PullResponse = self.send(request, None).await?;

        Ok(latest
            .plans
            .into_iter()
            .map(|(id, plan)| Plan { id, ..plan })
            .collect())
    }

    async fn subscribe(&self, org: &OrgId, plan_id: &str) -> Result<()> {
        let body = SubscribeRequest {
            org: org.as_str(),
            phases: vec![PhaseRequest {
                features: vec![plan_id],
            }],
        };
        let _: IgnoredAny = self.post("/v1/subscribe", &body, Some(org)).await?;

        tracing::info!(org = %org, plan = %plan_id, "Subscribed org");
        Ok(())
    }

    async fn lookup_usage(&self, org: &OrgId, feature: &str) -> Result<Usage> {
        let limits: LimitsResponse = self.get("/v1/limits", org).await?;

        Ok(limits
            .usage
            .into_iter()
            .find(|u| u.feature == feature)
            .unwrap_or_else(|| Usage::not_entitled(feature)))
    }

    async fn report_usage(&self, org: &OrgId, feature: &str) -> Result<()> {
        let body = ReportRequest {
            org: org.as_str(),
            feature,
            n: 1,
        };
        let _: IgnoredAny = self.post("/v1/report", &body, Some(org)).await?;
        Ok(())
    }

    async fn current_phase(&self, org: &OrgId) -> Result<Phase> {
        self.get("/v1/phase", org).await
    }

    async fn start_checkout(
        &self,
        org: &OrgId,
        success_url: &str,
        options: CheckoutOptions,
    ) -> Result<String> {
        let body = CheckoutRequest {
            org: org.as_str(),
            success_url,
            cancel_url: options.cancel_url.as_deref(),
            features: &options.features,
        };
        let checkout: CheckoutResponse = self.post("/v1/checkout", &body, Some(org)).await?;
        Ok(checkout.url)
    }

    async fn whois(&self, org: &OrgId) -> Result<String> {
        let whois: WhoisResponse = self.get("/v1/whois", org).await?;
        if whois.stripe_id.is_empty() {
            return Err(BillingError::OrgNotFound(org.to_string()));
        }
        Ok(whois.stripe_id)
    }

    fn name(&self) -> &str {
        "Tier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TierConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_url_joining() {
        let client = TierClient::new(TierConfig {
            base_url: "http://tier.local/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.url("/v1/pull"), "http://tier.local/v1/pull");
    }

    #[test]
    fn test_request_shapes() {
        let subscribe = SubscribeRequest {
            org: "org:user",
            phases: vec![PhaseRequest { features: vec!["plan:free@0"] }],
        };
        assert_eq!(
            serde_json::to_value(&subscribe).unwrap(),
            serde_json::json!({"org": "org:user", "phases": [{"features": ["plan:free@0"]}]})
        );

        let features = Vec::new();
        let checkout = CheckoutRequest {
            org: "org:user",
            success_url: "http://localhost/checkout_success",
            cancel_url: None,
            features: &features,
        };
        assert_eq!(
            serde_json::to_value(&checkout).unwrap(),
            serde_json::json!({
                "org": "org:user",
                "success_url": "http://localhost/checkout_success",
            })
        );
    }

    #[test]
    fn test_pull_response_keys_become_ids() {
        let raw = r#"{"plans": {"plan:pro@0": {"title": "Pro"}, "plan:free@0": {}}}"#;
        let pulled: PullResponse = serde_json::from_str(raw).unwrap();
        let ids: Vec<_> = pulled
            .plans
            .into_iter()
            .map(|(id, plan)| Plan { id, ..plan }.id)
            .collect();
        assert_eq!(ids, vec!["plan:free@0", "plan:pro@0"]);
    }

    #[tokio::test]
    async fn test_unreachable_sidecar_is_an_error() {
        let client = TierClient::new(TierConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();

        let err = client
            .lookup_usage(&OrgId::for_user("user"), "feature:convert")
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Http(_) | BillingError::Timeout(_)));
    }
}
