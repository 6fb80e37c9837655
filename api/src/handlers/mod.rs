//! Request-independent handler helpers

pub mod error;

pub use error::{status_for, ApiError};
