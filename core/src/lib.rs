//! # Account Service Core
//!
//! Domain layer of the account service: entities, the OTP and token engines,
//! account services, repository interfaces with in-memory implementations,
//! and the error types every layer above builds on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{Clock, ManualClock, SystemClock};
pub use errors::{DomainError, DomainResult, ErrorKind};
