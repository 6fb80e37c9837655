#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryOtpStore;
pub use trait_::OtpStore;
