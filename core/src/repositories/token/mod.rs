#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryRefreshTokenRepository;
pub use trait_::RefreshTokenRepository;
