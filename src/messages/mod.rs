pub mod handlers;
mod repo;
mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::{MessageRepo, PgMessageRepo};
pub use repo_types::{Message, NewMessage, NewMessageRequest};

pub fn router() -> Router<AppState> {
    handlers::message_routes()
}
