//! Competition domain events
//!
//! Fact events returned by the workflow actions once every step committed.
//!
//!   HTTP route → Action → CompetitionEvent → response message

use serde::{Deserialize, Serialize};

use crate::common::{CompetitionId, RequestId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionEvent {
    /// A pending competition and its CREATE request exist and every admin was notified
    CompetitionRequested {
        competition_id: CompetitionId,
        request_id: RequestId,
        author_id: UserId,
        notified_admins: usize,
    },

    /// The competition is now valid and the request is resolved
    CompetitionApproved {
        competition_id: CompetitionId,
        request_id: RequestId,
        reviewed_by: UserId,
    },

    /// The competition is gone and the request is resolved
    CompetitionRejected {
        competition_id: CompetitionId,
        request_id: RequestId,
        reviewed_by: UserId,
    },
}

impl CompetitionEvent {
    /// Human-readable success message for the caller.
    pub fn message(&self) -> &'static str {
        match self {
            CompetitionEvent::CompetitionRequested { .. } => {
                "Successfully requested creation of competition."
            }
            CompetitionEvent::CompetitionApproved { .. } => "Competition approved.",
            CompetitionEvent::CompetitionRejected { .. } => "Competition rejected.",
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            CompetitionEvent::CompetitionRequested { request_id, .. }
            | CompetitionEvent::CompetitionApproved { request_id, .. }
            | CompetitionEvent::CompetitionRejected { request_id, .. } => *request_id,
        }
    }
}
