#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryVerificationRequestRepository;
pub use trait_::VerificationRequestRepository;
