use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Message, NewMessage};

#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn create(&self, message: NewMessage) -> anyhow::Result<Message>;
    /// Messages addressed to a GitHub id, newest first.
    async fn list_for_recipient(&self, github_id: i64) -> anyhow::Result<Vec<Message>>;
}

pub struct PgMessageRepo {
    db: PgPool,
}

impl PgMessageRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepo for PgMessageRepo {
    async fn create(&self, message: NewMessage) -> anyhow::Result<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_github_id, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, recipient_github_id, title, body, created_at
            "#,
        )
        .bind(message.sender_id)
        .bind(message.recipient_github_id)
        .bind(message.title)
        .bind(message.body)
        .fetch_one(&self.db)
        .await
        .context("insert message")
    }

    async fn list_for_recipient(&self, github_id: i64) -> anyhow::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, recipient_github_id, title, body, created_at
              FROM messages
             WHERE recipient_github_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(github_id)
        .fetch_all(&self.db)
        .await
        .context("list messages")
    }
}
