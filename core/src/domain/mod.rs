//! Domain layer containing business entities and the clock abstraction.

pub mod clock;
pub mod entities;

// Re-export commonly used domain types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::*;
