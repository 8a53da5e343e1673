mod dto;
pub mod handlers;
mod repo;
mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use dto::UserSearch;
pub use repo::{PgUserRepo, RepoError, UserRepo};
pub use repo_types::{GithubIdentity, NewUser, Profile, Provider, Role, Skill, User};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
