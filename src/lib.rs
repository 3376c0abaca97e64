// Session Service Library

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod store;

pub use error::{AuthError, Result};

use std::sync::Arc;

use services::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub cookie_secure: bool,
}
