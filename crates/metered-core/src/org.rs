//! Billing account naming.

use serde::{Deserialize, Serialize};

const ORG_PREFIX: &str = "org:";

/// The billing-service account for a local user (`org:<user id>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(String);

impl OrgId {
    /// Derive the org for a user identifier.
    pub fn for_user(user_id: &str) -> Self {
        Self(format!("{ORG_PREFIX}{user_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrgId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_is_prefixed_user_id() {
        assert_eq!(OrgId::for_user("user").as_str(), "org:user");
        assert_eq!(OrgId::for_user("user"), OrgId::for_user("user"));
        assert_ne!(OrgId::for_user("a"), OrgId::for_user("b"));
    }
}
