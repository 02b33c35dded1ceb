//! User records and storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use crate::error::{CoreError, Result};
use crate::org::OrgId;

/// A signed-up user.
///
/// The password is held in plain text; it is only ever compared against the
/// fixed demo credential.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
            created_at: Utc::now(),
        }
    }

    /// Billing account for this user.
    pub fn org(&self) -> OrgId {
        OrgId::for_user(&self.id)
    }

    fn same_credentials(&self, other: &Self) -> bool {
        self.id == other.id && self.password == other.password
    }
}

/// Result of [`UserStore::create`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new record was stored
    Created,
    /// An identical record was already present; nothing changed
    Existing,
}

/// User storage keyed by user id.
pub trait UserStore: Send + Sync {
    /// Insert a user unless a different record holds the id.
    ///
    /// The check and the insert happen under one lock, so two concurrent
    /// signups can never overwrite each other.
    fn create(&self, user: User) -> Result<CreateOutcome>;

    fn get(&self, id: &str) -> Result<Option<User>>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-process user store
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CoreError {
    CoreError::Storage("user store lock poisoned".into())
}

impl UserStore for MemoryUserStore {
    fn create(&self, user: User) -> Result<CreateOutcome> {
        let mut users = self.users.write().map_err(poisoned)?;

        match users.entry(user.id.clone()) {
            Entry::Occupied(existing) if existing.get().same_credentials(&user) => {
                Ok(CreateOutcome::Existing)
            }
            Entry::Occupied(_) => Err(CoreError::UserExists(user.id)),
            Entry::Vacant(slot) => {
                tracing::debug!(user = %user.id, "Stored new user");
                slot.insert(user);
                Ok(CreateOutcome::Created)
            }
        }
    }

    fn get(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(id).cloned())
    }

    fn len(&self) -> Result<usize> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_create_and_get() {
        let store = MemoryUserStore::new();
        assert!(store.is_empty().unwrap());

        let outcome = store.create(User::new("user", "pass")).unwrap();
        assert_eq!(outcome, CreateOutcome::Created);

        let user = store.get("user").unwrap().unwrap();
        assert_eq!(user.id, "user");
        assert_eq!(user.org().as_str(), "org:user");
        assert!(store.get("other").unwrap().is_none());
    }

    #[test]
    fn test_identical_signup_is_idempotent() {
        let store = MemoryUserStore::new();
        store.create(User::new("user", "pass")).unwrap();

        let outcome = store.create(User::new("user", "pass")).unwrap();
        assert_eq!(outcome, CreateOutcome::Existing);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_conflicting_signup_does_not_overwrite() {
        let store = MemoryUserStore::new();
        store.create(User::new("user", "pass")).unwrap();

        let err = store.create(User::new("user", "other")).unwrap_err();
        assert!(matches!(err, CoreError::UserExists(_)));
        assert_eq!(store.get("user").unwrap().unwrap().password, "pass");
    }

    #[test]
    fn test_concurrent_signups_keep_every_user() {
        let store = Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.create(User::new(format!("user-{i}"), "pass")))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), CreateOutcome::Created);
        }
        assert_eq!(store.len().unwrap(), 16);
    }
}
