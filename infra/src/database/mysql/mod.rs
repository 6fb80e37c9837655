//! MySQL implementations of the repository traits in `acct_core`.
//!
//! UUIDs are stored as `CHAR(36)` strings and timestamps as `DATETIME(6)` in
//! UTC. Unique indexes back every uniqueness rule, so constraint violations
//! are translated into the same domain errors the in-memory stores raise.

pub mod otp_store_impl;
pub mod profile_repository_impl;
pub mod role_repository_impl;
pub mod sms_log_repository_impl;
pub mod token_repository_impl;
pub mod user_repository_impl;
pub mod verification_repository_impl;

pub use otp_store_impl::MySqlOtpStore;
pub use profile_repository_impl::MySqlProfileRepository;
pub use role_repository_impl::MySqlRoleRepository;
pub use sms_log_repository_impl::MySqlSmsLogRepository;
pub use token_repository_impl::MySqlRefreshTokenRepository;
pub use user_repository_impl::MySqlUserRepository;
pub use verification_repository_impl::MySqlVerificationRequestRepository;

use acct_core::errors::DomainError;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

/// Wrap a query failure with the operation that failed
pub(crate) fn query_failed(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Internal {
        message: format!("Failed to {}: {}", operation, e),
    }
}

/// Typed column read
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    parse_uuid(name, &raw)
}

pub(crate) fn optional_uuid_column(row: &MySqlRow, name: &str) -> Result<Option<Uuid>, DomainError> {
    let raw: Option<String> = column(row, name)?;
    raw.map(|value| parse_uuid(name, &value)).transpose()
}

/// Parse an enum stored as its string form
pub(crate) fn parsed_column<T>(row: &MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = column(row, name)?;
    raw.parse().map_err(|e: String| DomainError::Internal {
        message: format!("Invalid {}: {}", name, e),
    })
}

fn parse_uuid(name: &str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", name, e),
    })
}

/// Name of the unique index a failed statement violated, if any
pub(crate) fn violated_unique_key(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(unique_key_from_message(db.message()))
        }
        _ => None,
    }
}

/// `Duplicate entry 'x' for key 'users.uq_users_email'` -> `uq_users_email`
fn unique_key_from_message(message: &str) -> String {
    let key = message
        .rsplit("for key ")
        .next()
        .unwrap_or_default()
        .trim_matches('\'');
    key.rsplit('.').next().unwrap_or(key).to_string()
}
