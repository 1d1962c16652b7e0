//! Shared protocol types for settings-sync
//!
//! Everything the page controller and the host agree on, kept free of any
//! browser or server dependency so it can be tested natively.

pub mod backoff;
pub mod binding;
pub mod change;
pub mod error;
pub mod events;
pub mod messages;
pub mod value;

pub use backoff::*;
pub use binding::*;
pub use change::*;
pub use error::*;
pub use events::*;
pub use value::*;
