//! Typed ID definitions for the workflow entities.

pub use super::id::Id;

/// Marker type for User entities (authors and reviewers).
pub struct User;

/// Marker type for Competition entities.
pub struct Competition;

/// Marker type for Request entities (pending creation requests).
pub struct Request;

pub type UserId = Id<User>;

pub type CompetitionId = Id<Competition>;

pub type RequestId = Id<Request>;
