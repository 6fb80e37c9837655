pub mod auth;
pub mod cors;

pub use auth::{AdminContext, AuthContext, JwtAuth};
pub use cors::create_cors;
