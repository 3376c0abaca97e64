pub mod auth;

pub use auth::{login, logout, refresh, register};
