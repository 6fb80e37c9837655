//! # Infrastructure Layer
//!
//! Concrete implementations of the account service's outbound ports:
//!
//! - **Database**: MySQL repositories for every store trait in `acct_core`,
//!   plus the pooled connection and embedded migrations
//! - **SMS**: a JSON-over-HTTP gateway, a console gateway for development and
//!   a decorator that records every delivery attempt

use acct_core::errors::DomainError;
use thiserror::Error;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// SMS gateway implementations
pub mod sms;

pub use database::{DatabasePool, MySqlStores};
pub use sms::{build_gateway, ConsoleSmsGateway, HttpSmsGateway, RecordingSmsGateway};

/// Infrastructure error types
#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SMS service error: {0}")]
    Sms(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Sms(service) => DomainError::Upstream { service },
            other => DomainError::internal(other),
        }
    }
}
