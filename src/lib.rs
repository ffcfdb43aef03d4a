pub mod api;
pub mod assignments;
pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
