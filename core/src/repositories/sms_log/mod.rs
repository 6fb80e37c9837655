#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemorySmsLogRepository;
pub use trait_::SmsLogRepository;
