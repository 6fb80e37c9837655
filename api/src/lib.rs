//! HTTP layer of the account service
//!
//! Exposes the application factory so integration tests can drive the same
//! routes, middleware and error mapping the binary serves.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState, Stores};
