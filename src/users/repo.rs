use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

use super::dto::UserSearch;
use super::repo_types::{NewUser, Skill, SkillRow, User, UserRow};
use crate::error::AppError;

const USER_COLUMNS: &str = "id, name, email, role, provider, password_hash, \
                            github_login, github_id, github_name, created_at";

/// Failure to insert a user.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("The specified email address is already in use.")]
    DuplicateEmail,

    #[error("GitHub account is already linked to another user")]
    DuplicateGithub,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail | RepoError::DuplicateGithub => {
                AppError::Validation(e.to_string())
            }
            RepoError::Other(e) => AppError::Internal(e),
        }
    }
}

/// Maps a unique violation (SQLSTATE 23505) to the column it guards.
fn insert_error(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return match db.constraint() {
                Some(c) if c.contains("email") => RepoError::DuplicateEmail,
                _ => RepoError::DuplicateGithub,
            };
        }
    }
    RepoError::Other(anyhow::Error::new(e).context("insert user"))
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn search(&self, filter: &UserSearch) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_github_login(&self, login: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_github_id(&self, github_id: i64) -> anyhow::Result<Option<User>>;
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError>;
    /// Inserts a user carrying a GitHub identity, or returns the user already
    /// linked to that GitHub id.
    async fn create_or_get_github(&self, new_user: NewUser) -> Result<User, RepoError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    /// Appends a skill to the user with the given GitHub login and returns the
    /// updated user, or `None` when no such user exists.
    async fn push_skill(&self, github_login: &str, skill: Skill) -> anyhow::Result<Option<User>>;
}

pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn with_skills(&self, rows: Vec<UserRow>) -> anyhow::Result<Vec<User>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let skills = sqlx::query_as::<_, SkillRow>(
            r#"
            SELECT user_id, name, link
              FROM skills
             WHERE user_id = ANY($1)
             ORDER BY id ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("load skills")?;

        let mut by_user: HashMap<Uuid, Vec<Skill>> = HashMap::new();
        for s in skills {
            by_user.entry(s.user_id).or_default().push(Skill {
                name: s.name,
                link: s.link,
            });
        }
        Ok(rows
            .into_iter()
            .map(|r| {
                let skills = by_user.remove(&r.id).unwrap_or_default();
                r.into_user(skills)
            })
            .collect())
    }

    async fn insert(
        &self,
        new_user: NewUser,
        on_conflict: &str,
    ) -> Result<Option<UserRow>, RepoError> {
        let (github_login, github_id, github_name) = match new_user.github {
            Some(g) => (Some(g.login), Some(g.id), g.name),
            None => (None, None, None),
        };
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, role, provider, password_hash,
                               github_login, github_id, github_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            {on_conflict}
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.role.as_str())
        .bind(new_user.provider.as_str())
        .bind(new_user.password_hash)
        .bind(github_login)
        .bind(github_id)
        .bind(github_name)
        .fetch_optional(&self.db)
        .await
        .map_err(insert_error)
    }

    async fn with_skills_opt(&self, row: Option<UserRow>) -> anyhow::Result<Option<User>> {
        match row {
            Some(row) => Ok(self.with_skills(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        self.with_skills(rows).await
    }

    async fn search(&self, filter: &UserSearch) -> anyhow::Result<Vec<User>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users WHERE TRUE"));
        if let Some(name) = &filter.name {
            qb.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(email) = &filter.email {
            qb.push(" AND email = ").push_bind(email.clone());
        }
        if let Some(role) = filter.role {
            qb.push(" AND role = ").push_bind(role.as_str());
        }
        if let Some(provider) = filter.provider {
            qb.push(" AND provider = ").push_bind(provider.as_str());
        }
        if let Some(login) = &filter.github_login {
            qb.push(" AND github_login = ").push_bind(login.clone());
        }
        qb.push(" ORDER BY created_at ASC");

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.db)
            .await
            .context("search users")?;
        self.with_skills(rows).await
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        self.with_skills_opt(row).await
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        self.with_skills_opt(row).await
    }

    async fn find_by_github_login(&self, login: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE github_login = $1"
        ))
        .bind(login)
        .fetch_optional(&self.db)
        .await
        .context("find user by github login")?;
        self.with_skills_opt(row).await
    }

    async fn find_by_github_id(&self, github_id: i64) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE github_id = $1"
        ))
        .bind(github_id)
        .fetch_optional(&self.db)
        .await
        .context("find user by github id")?;
        self.with_skills_opt(row).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let row = self
            .insert(new_user, "")
            .await?
            .ok_or_else(|| anyhow::anyhow!("insert returned no row"))?;
        Ok(row.into_user(Vec::new()))
    }

    async fn create_or_get_github(&self, new_user: NewUser) -> Result<User, RepoError> {
        let github_id = new_user
            .github
            .as_ref()
            .map(|g| g.id)
            .ok_or_else(|| anyhow::anyhow!("github identity required"))?;
        if let Some(row) = self
            .insert(new_user, "ON CONFLICT (github_id) DO NOTHING")
            .await?
        {
            return Ok(row.into_user(Vec::new()));
        }
        // lost the race to a concurrent first login
        Ok(self
            .find_by_github_id(github_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("github user vanished after conflict"))?)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("update password hash")?;
        Ok(())
    }

    async fn push_skill(&self, github_login: &str, skill: Skill) -> anyhow::Result<Option<User>> {
        // one statement, no read-modify-write
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO skills (user_id, name, link)
            SELECT id, $2, $3 FROM users WHERE github_login = $1
            RETURNING user_id
            "#,
        )
        .bind(github_login)
        .bind(skill.name)
        .bind(skill.link)
        .fetch_optional(&self.db)
        .await
        .context("insert skill")?;

        match inserted {
            Some((user_id,)) => self.find_by_id(user_id).await,
            None => Ok(None),
        }
    }
}
