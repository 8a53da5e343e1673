use axum::{
    extract::{FromRef, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CallbackQuery, LoginRequest, TokenResponse},
    jwt::JwtKeys,
    password::authenticate,
    services::find_or_create_github_user,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/local", post(login_local))
        .route("/auth/:provider", get(oauth_redirect))
        .route("/auth/:provider/callback", get(oauth_callback))
}

#[instrument(skip(state, payload))]
pub async fn login_local(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = payload.email.trim().to_lowercase();

    let user = state.users.find_by_email(&email).await?.ok_or_else(|| {
        warn!(email = %email, "login unknown email");
        AppError::Unauthorized("This email is not registered.".into())
    })?;

    if !authenticate(&payload.password, user.password_hash.as_deref())? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("This password is not correct.".into()));
    }

    let token = JwtKeys::from_ref(&state).sign_session(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

/// 302 to the provider's consent page.
#[instrument(skip(state))]
pub async fn oauth_redirect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> AppResult<impl IntoResponse> {
    let p = state
        .oauth
        .get(&provider)
        .ok_or_else(|| AppError::NotFound(format!("Unknown provider {provider}")))?;

    let oauth_state = JwtKeys::from_ref(&state).sign_state(p.name())?;
    let location = p.authorize_url(&oauth_state)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

/// Provider callback: links or creates the account, sets the `token` cookie
/// and sends the browser home.
#[instrument(skip(state, query))]
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<impl IntoResponse> {
    let p = state
        .oauth
        .get(&provider)
        .ok_or_else(|| AppError::NotFound(format!("Unknown provider {provider}")))?;

    if let Some(err) = query.error {
        warn!(provider = %provider, error = %err, "provider denied login");
        return Err(AppError::Unauthorized(err));
    }
    let code = query
        .code
        .ok_or_else(|| AppError::Unauthorized("missing code".into()))?;

    let keys = JwtKeys::from_ref(&state);
    keys.verify_state(query.state.as_deref().unwrap_or_default(), p.name())
        .map_err(|e| {
            warn!(error = %e, "oauth state rejected");
            AppError::Unauthorized("invalid oauth state".into())
        })?;

    let identity = p.fetch_identity(&code).await.map_err(|e| {
        warn!(error = %e, provider = %provider, "code exchange failed");
        AppError::Unauthorized("could not verify provider identity".into())
    })?;

    let user = find_or_create_github_user(state.users.as_ref(), identity).await?;
    let token = keys.sign_session(user.id)?;
    info!(user_id = %user.id, provider = %provider, "oauth login");

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, format!("token={token}; Path=/; SameSite=Lax")),
        ],
    ))
}
