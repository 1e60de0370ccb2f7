//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod clock;
mod identity;
mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::IdentityProvider;
pub use store::DocumentStore;
