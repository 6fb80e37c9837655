//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - HS256 access token signing and verification
//! - Refresh token issuance with one-time rotation
//! - Revocation and cleanup of refresh tokens

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::TokenService;
