use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewThing, Thing, ThingUpdate};

#[async_trait]
pub trait ThingRepo: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Thing>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Thing>>;
    async fn create(&self, new_thing: NewThing) -> anyhow::Result<Thing>;
    async fn update(&self, id: Uuid, update: ThingUpdate) -> anyhow::Result<Option<Thing>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

pub struct PgThingRepo {
    db: PgPool,
}

impl PgThingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ThingRepo for PgThingRepo {
    async fn list(&self) -> anyhow::Result<Vec<Thing>> {
        sqlx::query_as::<_, Thing>("SELECT id, name, info, active FROM things ORDER BY name ASC")
            .fetch_all(&self.db)
            .await
            .context("list things")
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Thing>> {
        sqlx::query_as::<_, Thing>("SELECT id, name, info, active FROM things WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("get thing")
    }

    async fn create(&self, new_thing: NewThing) -> anyhow::Result<Thing> {
        sqlx::query_as::<_, Thing>(
            r#"
            INSERT INTO things (name, info, active)
            VALUES ($1, $2, $3)
            RETURNING id, name, info, active
            "#,
        )
        .bind(new_thing.name)
        .bind(new_thing.info)
        .bind(new_thing.active)
        .fetch_one(&self.db)
        .await
        .context("insert thing")
    }

    async fn update(&self, id: Uuid, update: ThingUpdate) -> anyhow::Result<Option<Thing>> {
        sqlx::query_as::<_, Thing>(
            r#"
            UPDATE things
               SET name = COALESCE($2, name),
                   info = COALESCE($3, info),
                   active = COALESCE($4, active)
             WHERE id = $1
            RETURNING id, name, info, active
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.info)
        .bind(update.active)
        .fetch_optional(&self.db)
        .await
        .context("update thing")
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM things WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete thing")?;
        Ok(res.rows_affected() > 0)
    }
}
