//! Cookie sessions
//!
//! The cookies are the whole session: `user` carries the signed user id,
//! `plan` an unsigned plan hint for display. Nothing is stored server-side.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderName,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{AppendHeaders, Redirect},
};
use cookie::{Cookie, SameSite, time::Duration};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use metered_core::{OrgId, validate_username};

use crate::state::AppState;

pub const USER_COOKIE: &str = "user";
pub const PLAN_COOKIE: &str = "plan";

/// Lifetime of the `user` cookie
pub const SESSION_TTL_DAYS: i64 = 14;

type HmacSha256 = Hmac<Sha256>;

/// Issues, reads and clears session cookies
#[derive(Clone)]
pub struct Sessions {
    mac: HmacSha256,
    secure: bool,
}

impl Sessions {
    pub fn new(secret: &[u8], secure: bool) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
            secure,
        })
    }

    /// Use `secret`, or generate a per-process key when none is configured.
    pub fn from_secret(
        secret: Option<&str>,
        secure: bool,
    ) -> Result<Self, hmac::digest::InvalidLength> {
        match secret {
            Some(secret) => Self::new(secret.as_bytes(), secure),
            None => {
                tracing::warn!("SESSION_SECRET not set - sessions will not survive a restart");
                let key = format!(
                    "{}{}",
                    uuid::Uuid::new_v4().simple(),
                    uuid::Uuid::new_v4().simple()
                );
                Self::new(key.as_bytes(), secure)
            }
        }
    }

    fn signature(&self, user_id: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(user_id.as_bytes());
        mac
    }

    /// `user_id.hexsig`
    pub fn sign(&self, user_id: &str) -> String {
        let tag = self.signature(user_id).finalize().into_bytes();
        format!("{user_id}.{}", hex::encode(tag))
    }

    /// The user id inside a signed value, if the signature holds
    pub fn verify(&self, value: &str) -> Option<String> {
        let (user_id, tag) = value.rsplit_once('.')?;
        let tag = hex::decode(tag).ok()?;
        self.signature(user_id)
            .verify_slice(&tag)
            .ok()
            .map(|()| user_id.to_string())
    }

    /// Session cookie for a freshly authenticated user
    pub fn issue(&self, user_id: &str) -> Cookie<'static> {
        Cookie::build((USER_COOKIE, self.sign(user_id)))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(SESSION_TTL_DAYS))
            .build()
    }

    pub fn plan_cookie(&self, plan_id: &str) -> Cookie<'static> {
        Cookie::build((PLAN_COOKIE, plan_id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Expire both session cookies
    pub fn clear(&self) -> Vec<Cookie<'static>> {
        [USER_COOKIE, PLAN_COOKIE]
            .into_iter()
            .map(|name| {
                let mut cookie = Cookie::build((name, ""))
                    .path("/")
                    .http_only(true)
                    .secure(self.secure)
                    .build();
                cookie.make_removal();
                cookie
            })
            .collect()
    }

    /// The user the request is authenticated as: a validly signed `user`
    /// cookie naming a recognized user.
    pub fn authenticated_user(&self, headers: &HeaderMap) -> Option<String> {
        let value = cookie_value(headers, USER_COOKIE)?;
        self.verify(&value).filter(|id| validate_username(id))
    }
}

/// Read one cookie from the request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// The display-only plan hint
pub fn plan_hint(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, PLAN_COOKIE).filter(|plan| !plan.is_empty())
}

/// `Set-Cookie` headers for a response
pub fn set_cookies(cookies: Vec<Cookie<'static>>) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(
        cookies
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie.to_string()))
            .collect(),
    )
}

/// An authenticated user; extracting it redirects to `/login` otherwise.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub org: OrgId,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = state
            .sessions
            .authenticated_user(&parts.headers)
            .ok_or_else(|| Redirect::to("/login"))?;

        Ok(Self {
            org: OrgId::for_user(&id),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sessions() -> Sessions {
        Sessions::new(b"test-secret", false).unwrap()
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_sign_and_verify() {
        let sessions = sessions();
        let signed = sessions.sign("user");
        assert!(signed.starts_with("user."));
        assert_eq!(sessions.verify(&signed).as_deref(), Some("user"));
    }

    #[test]
    fn test_tampered_values_are_rejected() {
        let sessions = sessions();
        let signed = sessions.sign("user");

        assert_eq!(sessions.verify("user"), None);
        assert_eq!(sessions.verify(&signed.replacen("user", "admin", 1)), None);
        assert_eq!(sessions.verify("user.zz"), None);

        let other = Sessions::new(b"other-secret", false).unwrap();
        assert_eq!(other.verify(&signed), None);
    }

    #[test]
    fn test_authenticated_user_requires_signature() {
        let sessions = sessions();
        let signed = format!("theme=dark; user={}", sessions.sign("user"));

        assert_eq!(
            sessions.authenticated_user(&headers(&signed)).as_deref(),
            Some("user")
        );
        assert_eq!(sessions.authenticated_user(&headers("user=user")), None);
        assert_eq!(sessions.authenticated_user(&HeaderMap::new()), None);
    }

    #[test]
    fn test_unrecognized_user_is_not_authenticated() {
        let sessions = sessions();
        let signed = format!("user={}", sessions.sign("mallory"));
        assert_eq!(sessions.authenticated_user(&headers(&signed)), None);
    }

    #[test]
    fn test_issued_cookie_attributes() {
        let cookie = Sessions::new(b"k", true).unwrap().issue("user");
        assert_eq!(cookie.name(), USER_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::days(14)));
    }

    #[test]
    fn test_clear_expires_both_cookies() {
        let cleared = sessions().clear();
        let names: Vec<_> = cleared.iter().map(Cookie::name).collect();
        assert_eq!(names, vec![USER_COOKIE, PLAN_COOKIE]);

        for cookie in &cleared {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(cookie.http_only(), Some(true));
        }
    }

    #[test]
    fn test_plan_hint() {
        assert_eq!(
            plan_hint(&headers("plan=plan:free@0")).as_deref(),
            Some("plan:free@0")
        );
        assert_eq!(plan_hint(&headers("plan=")), None);
    }
}
