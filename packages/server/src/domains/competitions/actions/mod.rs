//! Competition workflow actions
//!
//! Entry points called from the HTTP route. Each takes typed ids, talks to
//! the store through `ServerDeps`, and returns a `CompetitionEvent`.

pub mod resolve;
pub mod submit;

pub use resolve::{approve_competition_request, reject_competition_request};
pub use submit::submit_competition_request;
