//! Demo identity rules.
//!
//! A stand-in for a real identity provider: exactly one credential pair is
//! accepted. Signup and login share the same rule so a freshly signed-up user
//! can always log back in.

use serde::Serialize;

const DEMO_USERNAME: &str = "user";
const DEMO_PASSWORD: &str = "pass";

pub fn validate_username(username: &str) -> bool {
    username == DEMO_USERNAME
}

pub fn validate_password(password: &str) -> bool {
    password == DEMO_PASSWORD
}

/// Accepts only the demo credential pair.
pub fn validate_credentials(username: &str, password: &str) -> bool {
    validate_username(username) && validate_password(password)
}

/// Field errors for a rejected signup, keyed the way the signup form renders them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewUserErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl NewUserErrors {
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

/// Check a prospective username/password pair.
///
/// The username is checked first; a bad username short-circuits so the form
/// shows one problem at a time.
pub fn validate_new_user(username: &str, password: &str) -> Result<(), NewUserErrors> {
    if !validate_username(username) {
        return Err(NewUserErrors {
            username: Some(
                "Username must be 4 characters, containing the characters \
                 \"u\", \"s\", \"e\", and \"r\", in that order."
                    .into(),
            ),
            password: None,
        });
    }
    if !validate_password(password) {
        return Err(NewUserErrors {
            username: None,
            password: Some("Password too easy to guess. It must be \"pass\".".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_demo_pair_is_accepted() {
        assert!(validate_credentials("user", "pass"));
        assert!(!validate_credentials("user", "password"));
        assert!(!validate_credentials("admin", "pass"));
        assert!(!validate_credentials("", ""));
        assert!(!validate_credentials("User", "pass"));
    }

    #[test]
    fn test_new_user_reports_username_first() {
        let errors = validate_new_user("bob", "nope").unwrap_err();
        assert!(errors.username.is_some());
        assert!(errors.password.is_none());
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_new_user_bad_password() {
        let errors = validate_new_user("user", "hunter2").unwrap_err();
        assert!(errors.username.is_none());
        assert!(errors.password.as_deref().unwrap().contains("pass"));
    }

    #[test]
    fn test_new_user_ok() {
        assert!(validate_new_user("user", "pass").is_ok());
    }
}
