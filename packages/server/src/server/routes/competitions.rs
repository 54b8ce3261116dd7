//! `POST /competitions` - submit, approve or reject a competition request.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::common::{AdminCapability, AuthError, RequestId, UserId};
use crate::domains::competitions::actions::{
    approve_competition_request, reject_competition_request, submit_competition_request,
};
use crate::domains::competitions::models::CompetitionDescriptor;
use crate::domains::competitions::CompetitionError;
use crate::kernel::ServerDeps;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::response::ApiReply;

/// What the caller wants done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    Request,
    Accept,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionPost {
    #[serde(rename = "type")]
    pub post_type: PostType,
    #[serde(default)]
    pub competition: Option<CompetitionDescriptor>,
    /// Author of a REQUEST; defaults to the caller.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub request_id: Option<Uuid>,
}

impl PostType {
    /// Reviews need an admin; submissions only need a signed-in caller.
    fn required_capability(self) -> Option<AdminCapability> {
        match self {
            PostType::Request => None,
            PostType::Accept => Some(AdminCapability::ApproveRequests),
            PostType::Reject => Some(AdminCapability::RejectRequests),
        }
    }
}

pub async fn competitions_handler(
    Extension(state): Extension<AxumAppState>,
    auth_user: Option<Extension<AuthUser>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiReply {
    let Some(Extension(auth_user)) = auth_user else {
        debug!("Competition post without valid token");
        return ApiReply::unauthorized(AuthError::AuthenticationRequired.to_string());
    };

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Invalid competition post");
            return invalid_post();
        }
    };

    // Only the type is read before the admin check.
    let post_type = match PostType::deserialize(&body["type"]) {
        Ok(post_type) => post_type,
        Err(e) => {
            warn!(error = %e, "Competition post with unknown type");
            return invalid_post();
        }
    };
    if let Err(reply) = authorize(post_type, &auth_user) {
        return reply;
    }

    let post = match serde_json::from_value::<CompetitionPost>(body) {
        Ok(post) => post,
        Err(e) => {
            warn!(error = %e, post_type = ?post_type, "Invalid competition post");
            return invalid_post();
        }
    };

    // Runs detached so a client disconnect cannot cut the workflow short.
    let deps = state.deps.clone();
    let workflow = tokio::spawn(async move { dispatch(post, auth_user, &deps).await });

    match workflow.await {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, "Competition workflow task failed");
            ApiReply::unavailable("Competition request could not be completed.")
        }
    }
}

async fn dispatch(post: CompetitionPost, auth_user: AuthUser, deps: &ServerDeps) -> ApiReply {
    match post.post_type {
        PostType::Request => {
            let author_id = post
                .user_id
                .map(UserId::from_uuid)
                .unwrap_or(auth_user.user_id);
            let descriptor = post.competition.unwrap_or_default();
            submit_competition_request(descriptor, author_id, deps)
                .await
                .into()
        }
        PostType::Accept => {
            let Some(request_id) = post.request_id.map(RequestId::from_uuid) else {
                return invalid_post();
            };
            approve_competition_request(request_id, auth_user.actor(), deps)
                .await
                .into()
        }
        PostType::Reject => {
            let Some(request_id) = post.request_id.map(RequestId::from_uuid) else {
                return invalid_post();
            };
            reject_competition_request(request_id, auth_user.actor(), deps)
                .await
                .into()
        }
    }
}

fn authorize(post_type: PostType, auth_user: &AuthUser) -> Result<(), ApiReply> {
    let Some(capability) = post_type.required_capability() else {
        return Ok(());
    };
    auth_user
        .actor()
        .can(capability)
        .check()
        .map(|_| ())
        .map_err(|e| ApiReply::from(CompetitionError::from(e)))
}

fn invalid_post() -> ApiReply {
    ApiReply::bad_request("Invalid competition post.")
}
