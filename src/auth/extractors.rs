use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::AppError, state::AppState, users::User};

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Session token from `Authorization: Bearer ..` or the `access_token` query
/// parameter.
fn session_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get(AUTHORIZATION) {
        let auth = auth
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid Authorization header".into()))?;
        return auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::to_string)
            .ok_or_else(|| AppError::Unauthorized("invalid auth scheme".into()));
    }
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.access_token)
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))
}

/// The authenticated user, loaded from the store.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_session(&token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthorized("invalid or expired token".into())
        })?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for unknown user");
                AppError::Unauthorized("user not found".into())
            })?;

        Ok(CurrentUser(user))
    }
}

/// An authenticated user with the `admin` role.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!(user_id = %user.id, "admin route refused");
            return Err(AppError::Forbidden("admin role required".into()));
        }
        Ok(AdminUser(user))
    }
}
