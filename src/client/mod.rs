//! Typed client for the JSON API and the page controllers built on it.

pub mod api;
pub mod main_page;
pub mod profile;

pub use api::{ApiClient, ClientError};
pub use main_page::MainController;
pub use profile::{MessageModal, ModalAction, ModalOutcome, ProfileController};
