pub mod handlers;
mod repo;
mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgThingRepo, ThingRepo};
pub use repo_types::{NewThing, Thing, ThingUpdate};

pub fn router() -> Router<AppState> {
    handlers::thing_routes()
}
