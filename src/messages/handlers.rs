use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use super::repo_types::{Message, NewMessage, NewMessageRequest};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn message_routes() -> Router<AppState> {
    Router::new().route("/api/messages", get(inbox).post(create))
}

#[instrument(skip(state, sender, payload), fields(sender_id = %sender.id))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(sender): CurrentUser,
    Json(payload): Json<NewMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Message title cannot be blank".into()));
    }
    if state
        .users
        .find_by_github_id(payload.user_github_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Recipient not found".into()));
    }

    let message = state
        .messages
        .create(NewMessage {
            sender_id: sender.id,
            recipient_github_id: payload.user_github_id,
            title,
            body: payload.message,
        })
        .await?;
    info!(message_id = %message.id, recipient = message.recipient_github_id, "message sent");
    Ok((StatusCode::CREATED, Json(message)))
}

/// Messages addressed to the caller. Accounts without a GitHub identity have
/// no inbox.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn inbox(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Message>>> {
    let messages = match &user.github {
        Some(github) => state.messages.list_for_recipient(github.id).await?,
        None => Vec::new(),
    };
    Ok(Json(messages))
}
