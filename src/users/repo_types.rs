use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    fn from_db(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// How the account signs in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Local,
    Github,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Github => "github",
        }
    }

    fn from_db(s: &str) -> Self {
        match s {
            "github" => Provider::Github,
            _ => Provider::Local,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubIdentity {
    pub login: String,
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A named, linked entry on a user's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    #[serde(rename = "skillname")]
    pub name: String,
    #[serde(rename = "githublink", default)]
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub provider: Provider,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>, // Argon2 hash, never leaves the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubIdentity>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Public projection returned by `GET /api/users/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            role: self.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub provider: Provider,
    pub password_hash: Option<String>,
    pub github: Option<GithubIdentity>,
}

/// Row of the `users` table; skills live in their own table.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub provider: String,
    pub password_hash: Option<String>,
    pub github_login: Option<String>,
    pub github_id: Option<i64>,
    pub github_name: Option<String>,
    pub created_at: OffsetDateTime,
}

impl UserRow {
    pub fn into_user(self, skills: Vec<Skill>) -> User {
        let github = match (self.github_login, self.github_id) {
            (Some(login), Some(id)) => Some(GithubIdentity {
                login,
                id,
                name: self.github_name,
            }),
            _ => None,
        };
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: Role::from_db(&self.role),
            provider: Provider::from_db(&self.provider),
            password_hash: self.password_hash,
            github,
            skills,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SkillRow {
    pub user_id: Uuid,
    pub name: String,
    pub link: String,
}
