pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use error::{AccountError, Result};
