use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "sender")]
    pub sender_id: Option<Uuid>,
    #[serde(rename = "userGithubID")]
    pub recipient_github_id: i64,
    pub title: String,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Request body for `POST /api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessageRequest {
    #[serde(rename = "userGithubID")]
    pub user_github_id: i64,
    pub title: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub recipient_github_id: i64,
    pub title: String,
    pub body: String,
}
