//! Competition request workflow: submit, approve and reject.

pub mod actions;
pub mod duplicate_guard;
pub mod errors;
pub mod events;
pub mod inbox;
pub mod models;
pub mod saga;

pub use errors::{CompetitionError, StoreStep};
pub use events::CompetitionEvent;
