use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Thing {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub info: String,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewThing {
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThingUpdate {
    pub name: Option<String>,
    pub info: Option<String>,
    pub active: Option<bool>,
}
