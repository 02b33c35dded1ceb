//! Server configuration

use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

/// How `POST /plan` changes a subscription
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanChangeMode {
    /// Subscribe immediately
    Direct,
    /// Send the user through the billing service's hosted checkout
    Checkout,
}

/// Anything other than `direct` selects checkout.
impl FromStr for PlanChangeMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "direct" => Self::Direct,
            _ => Self::Checkout,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,

    /// Absolute base for URLs handed to external services
    pub public_url: String,

    /// Mark session cookies `Secure`
    pub cookie_secure: bool,

    /// HMAC key for the user cookie; a random one is generated when unset
    pub session_secret: Option<String>,

    pub static_dir: PathBuf,

    /// Plan every new signup is subscribed to
    pub default_plan: String,

    pub plan_change: PlanChangeMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            public_url: "http://localhost:80".into(),
            cookie_secure: false,
            session_secret: None,
            static_dir: PathBuf::from("static"),
            default_plan: "plan:free@0".into(),
            plan_change: PlanChangeMode::Checkout,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let public_url = std::env::var("PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.cookie_secure);

        Self {
            port,
            public_url,
            cookie_secure,
            session_secret: std::env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty()),
            static_dir: std::env::var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            default_plan: std::env::var("DEFAULT_PLAN").unwrap_or(defaults.default_plan),
            plan_change: std::env::var("PLAN_CHANGE_MODE")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.plan_change),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.public_url, path)
    }
}
