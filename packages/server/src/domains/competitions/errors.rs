use thiserror::Error;

use crate::common::{AuthError, RequestId, UserId};
use crate::kernel::StoreError;

/// The persistence step a store failure happened in. The display text is
/// what the caller sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStep {
    LoadCompetitions,
    LoadAuthor,
    CreateCompetition,
    CreateRequest,
    LoadAdmins,
    SendToAdmins,
    LoadRequest,
    ApproveCompetition,
    RemoveCompetition,
    DeleteFromAdmins,
    DeleteRequest,
}

impl std::fmt::Display for StoreStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            StoreStep::LoadCompetitions => "Database failed to load competitions.",
            StoreStep::LoadAuthor => "Database failed to load author.",
            StoreStep::CreateCompetition => "Database failed to create the competition.",
            StoreStep::CreateRequest => "Database failed to create the request.",
            StoreStep::LoadAdmins => "Database failed to load admins.",
            StoreStep::SendToAdmins => "Database failed to send request to admins.",
            StoreStep::LoadRequest => "Database failed to load the request.",
            StoreStep::ApproveCompetition => "Database failed to approve competition.",
            StoreStep::RemoveCompetition => "Failed to remove competition.",
            StoreStep::DeleteFromAdmins => "Database failed to delete request from admins.",
            StoreStep::DeleteRequest => "Database failed to delete request.",
        };
        f.write_str(message)
    }
}

fn duplicate_message(pending: &bool) -> &'static str {
    if *pending {
        "A competition with that name is already being requested."
    } else {
        "A competition with that name already exists."
    }
}

/// Everything a workflow action can fail with
#[derive(Error, Debug)]
pub enum CompetitionError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", duplicate_message(.pending))]
    DuplicateCompetition { name: String, pending: bool },

    #[error("Author of competition request could not be found.")]
    AuthorNotFound(UserId),

    #[error("Competition request was not found.")]
    RequestNotFound(RequestId),

    #[error("Unauthorized access to requests.")]
    Unauthorized(#[from] AuthError),

    #[error("{step}")]
    Store {
        step: StoreStep,
        #[source]
        source: StoreError,
    },
}

impl CompetitionError {
    pub fn validation(message: impl Into<String>) -> Self {
        CompetitionError::Validation(message.into())
    }

    pub fn store(step: StoreStep) -> impl FnOnce(StoreError) -> Self {
        move |source| CompetitionError::Store { step, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_depends_on_pending_flag() {
        let valid = CompetitionError::DuplicateCompetition {
            name: "Cup".into(),
            pending: false,
        };
        let pending = CompetitionError::DuplicateCompetition {
            name: "Cup".into(),
            pending: true,
        };
        assert_eq!(valid.to_string(), "A competition with that name already exists.");
        assert_eq!(
            pending.to_string(),
            "A competition with that name is already being requested."
        );
    }

    #[test]
    fn store_errors_report_the_step() {
        let err = CompetitionError::store(StoreStep::SendToAdmins)(StoreError::Backend(
            anyhow::anyhow!("connection reset"),
        ));
        assert_eq!(err.to_string(), "Database failed to send request to admins.");
    }
}
