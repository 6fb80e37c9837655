//! Domain entities representing core business objects.

pub mod otp;
pub mod profile;
pub mod sms_log;
pub mod token;
pub mod user;
pub mod verification_request;

// Re-export commonly used types
pub use otp::{OtpKey, OtpRecord, OtpReference, OtpStatus};
pub use profile::{Profile, ProfileSnapshot, ProfileUpdate};
pub use sms_log::SmsLog;
pub use token::{
    AccessTokenSubject, Claims, IssuedRefreshToken, RefreshTokenRecord, TokenPair,
    ACCESS_TOKEN_TYPE,
};
pub use user::{Role, User, ROLE_ADMIN, ROLE_USER};
pub use verification_request::{VerificationRequest, VerificationStatus, VerificationType};
