use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{is_valid_email, ChangePasswordRequest, CreateUserRequest, UserSearch},
    repo::RepoError,
    repo_types::{NewUser, Profile, Provider, Role, Skill, User},
};
use crate::{
    auth::{
        dto::TokenResponse,
        jwt::JwtKeys,
        password::{authenticate, hash_password},
        AdminUser, CurrentUser,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(index).post(create))
        .route("/api/users/me", get(me))
        .route("/api/users/changePassword", post(change_password))
        .route("/api/users/search", post(search))
        .route(
            "/api/users/profiles/:github_username",
            get(get_user_profile).post(post_new_skill),
        )
        .route("/api/users/:id", get(show).delete(destroy))
}

/// All users. Admin only.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// Registers a local account and signs the caller in.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password cannot be blank".into()));
    }
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(RepoError::DuplicateEmail.into());
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(NewUser {
            name: payload.name.trim().to_string(),
            email: Some(email),
            role: Role::User,
            provider: Provider::Local,
            password_hash: Some(password_hash),
            github: None,
        })
        .await?;

    let token = JwtKeys::from_ref(&state).sign_session(user.id)?;
    info!(user_id = %user.id, "user registered");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, _caller))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("user not found".into()))?;
    Ok(Json(user.profile()))
}

/// Admin only. Succeeds whether or not the user existed.
#[instrument(skip(state, admin))]
pub async fn destroy(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let removed = state.users.delete(id).await?;
    info!(admin_id = %admin.id, user_id = %id, removed, "user delete");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    if !authenticate(&payload.old_password, user.password_hash.as_deref())? {
        warn!("old password mismatch");
        return Err(AppError::Forbidden("Old password is not correct".into()));
    }
    if payload.new_password.is_empty() {
        return Err(AppError::Validation("Password cannot be blank".into()));
    }

    let hash = hash_password(&payload.new_password)?;
    state.users.set_password_hash(user.id, &hash).await?;
    info!("password changed");
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Json(filter): Json<UserSearch>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.search(&filter).await?))
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[instrument(skip(state))]
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(github_username): Path<String>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .find_by_github_login(&github_username)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find that profile".into()))?;
    Ok(Json(user))
}

/// Appends a skill to the profile and returns the updated user.
#[instrument(skip(state, skill))]
pub async fn post_new_skill(
    State(state): State<AppState>,
    Path(github_username): Path<String>,
    Json(skill): Json<Skill>,
) -> AppResult<Json<User>> {
    let skill = Skill {
        name: skill.name.trim().to_string(),
        link: skill.link.trim().to_string(),
    };
    if skill.name.is_empty() {
        return Err(AppError::Validation("Skill name cannot be blank".into()));
    }

    let user = state
        .users
        .push_skill(&github_username, skill)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find that profile".into()))?;
    info!(user_id = %user.id, skills = user.skills.len(), "skill added");
    Ok(Json(user))
}
