//! Uniform `{ success, message }` replies for the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domains::competitions::{CompetitionError, CompetitionEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// A status code plus the JSON body sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: ApiResponse,
}

impl ApiReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, true, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, false, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, false, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, false, message)
    }

    fn new(status: StatusCode, success: bool, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse {
                success,
                message: message.into(),
            },
        }
    }
}

impl From<CompetitionEvent> for ApiReply {
    fn from(event: CompetitionEvent) -> Self {
        ApiReply::ok(event.message())
    }
}

impl From<CompetitionError> for ApiReply {
    fn from(err: CompetitionError) -> Self {
        let message = err.to_string();
        match err {
            CompetitionError::Validation(_)
            | CompetitionError::DuplicateCompetition { .. }
            | CompetitionError::AuthorNotFound(_)
            | CompetitionError::RequestNotFound(_) => ApiReply::bad_request(message),
            CompetitionError::Unauthorized(_) => ApiReply::unauthorized(message),
            CompetitionError::Store { step, source } => {
                error!(step = ?step, error = %source, "Store failure");
                ApiReply::unavailable(message)
            }
        }
    }
}

impl From<Result<CompetitionEvent, CompetitionError>> for ApiReply {
    fn from(result: Result<CompetitionEvent, CompetitionError>) -> Self {
        match result {
            Ok(event) => event.into(),
            Err(err) => err.into(),
        }
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AuthError, RequestId};
    use crate::domains::competitions::StoreStep;
    use crate::kernel::StoreError;

    #[test]
    fn maps_error_kinds_to_status_codes() {
        let cases = [
            (CompetitionError::validation("x"), StatusCode::BAD_REQUEST),
            (
                CompetitionError::DuplicateCompetition {
                    name: "Cup".into(),
                    pending: true,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CompetitionError::RequestNotFound(RequestId::new()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CompetitionError::from(AuthError::AdminRequired),
                StatusCode::UNAUTHORIZED,
            ),
            (
                CompetitionError::store(StoreStep::LoadAdmins)(StoreError::Backend(
                    anyhow::anyhow!("down"),
                )),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, status) in cases {
            let reply = ApiReply::from(err);
            assert_eq!(reply.status, status);
            assert!(!reply.body.success);
        }
    }

    #[test]
    fn store_failure_message_names_the_step() {
        let reply = ApiReply::from(CompetitionError::store(StoreStep::LoadAdmins)(
            StoreError::Backend(anyhow::anyhow!("down")),
        ));
        assert_eq!(reply.body.message, "Database failed to load admins.");
    }
}
