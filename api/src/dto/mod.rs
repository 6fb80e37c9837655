//! Request and response bodies
//!
//! Bodies are camelCase JSON. Requests carry `validator` rules checked before
//! any service call; responses are built from domain entities.

pub mod admin;
pub mod auth;
pub mod profile;
pub mod verification;
