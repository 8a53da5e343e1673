pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod seed;
pub mod state;
pub mod things;
pub mod users;

#[cfg(test)]
mod fakes;
