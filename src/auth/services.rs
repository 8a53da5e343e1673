use tracing::{info, warn};

use super::oauth::ProviderIdentity;
use crate::users::{GithubIdentity, NewUser, Provider, RepoError, Role, User, UserRepo};

/// Finds the account linked to a GitHub identity, creating one on first login.
/// Existing accounts are returned as stored.
pub async fn find_or_create_github_user(
    users: &dyn UserRepo,
    identity: ProviderIdentity,
) -> anyhow::Result<User> {
    if let Some(user) = users.find_by_github_id(identity.id).await? {
        return Ok(user);
    }

    // an email already owned by a local account stays with that account
    let email = match identity.email.map(|e| e.trim().to_lowercase()) {
        Some(e) if users.find_by_email(&e).await?.is_none() => Some(e),
        _ => None,
    };

    let new_user = |email: Option<String>| NewUser {
        name: identity.name.clone().unwrap_or_else(|| identity.login.clone()),
        email,
        role: Role::User,
        provider: Provider::Github,
        password_hash: None,
        github: Some(GithubIdentity {
            login: identity.login.clone(),
            id: identity.id,
            name: identity.name.clone(),
        }),
    };

    // a concurrent first login for the same GitHub id yields that row
    let user = match users.create_or_get_github(new_user(email)).await {
        Err(RepoError::DuplicateEmail) => {
            warn!(github_id = identity.id, "email claimed meanwhile, linking without it");
            users.create_or_get_github(new_user(None)).await?
        }
        other => other?,
    };
    info!(user_id = %user.id, "user created from github login");
    Ok(user)
}
