use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::repo_types::{Provider, Role};

/// Request body for local registration. Role and provider are server-assigned.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Equality filter over user fields; absent fields match everything.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSearch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub provider: Option<Provider>,
    #[serde(rename = "github.login", alias = "githubLogin")]
    pub github_login: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
