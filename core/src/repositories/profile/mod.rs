#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryProfileRepository;
pub use trait_::ProfileRepository;
