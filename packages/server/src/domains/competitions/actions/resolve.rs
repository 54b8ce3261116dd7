//! Approve / Reject - an admin resolves a pending competition request.
//!
//! Both share one control structure: authorize, load the pending request,
//! apply the decision to the competition, retract the request from every
//! admin inbox, then mark the request resolved. No compensation: every step
//! moves toward the resolved state and repeating it is harmless.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::common::{Actor, AdminCapability, RequestId};
use crate::domains::competitions::errors::{CompetitionError, StoreStep};
use crate::domains::competitions::events::CompetitionEvent;
use crate::domains::competitions::inbox::{fan_out, InboxOp};
use crate::domains::competitions::models::RequestStatus;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn capability(self) -> AdminCapability {
        match self {
            Decision::Approve => AdminCapability::ApproveRequests,
            Decision::Reject => AdminCapability::RejectRequests,
        }
    }

    fn status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

/// Approve a pending request: the competition becomes valid.
pub async fn approve_competition_request(
    request_id: RequestId,
    actor: Actor,
    deps: &ServerDeps,
) -> Result<CompetitionEvent, CompetitionError> {
    resolve(request_id, actor, Decision::Approve, deps).await
}

/// Reject a pending request: the competition is deleted.
pub async fn reject_competition_request(
    request_id: RequestId,
    actor: Actor,
    deps: &ServerDeps,
) -> Result<CompetitionEvent, CompetitionError> {
    resolve(request_id, actor, Decision::Reject, deps).await
}

async fn resolve(
    request_id: RequestId,
    actor: Actor,
    decision: Decision,
    deps: &ServerDeps,
) -> Result<CompetitionEvent, CompetitionError> {
    // Authorization comes before any store access
    let actor = actor.can(decision.capability()).check().map_err(|e| {
        warn!(actor_id = %actor.id(), request_id = %request_id, decision = ?decision, "Unauthorized review attempt");
        CompetitionError::from(e)
    })?;

    let store = deps.store();
    info!(request_id = %request_id, reviewer = %actor.id(), decision = ?decision, "Resolving competition request");

    // Step 1: Load the pending request with its competition
    let populated = store
        .find_pending_request(request_id)
        .await
        .map_err(CompetitionError::store(StoreStep::LoadRequest))?
        .ok_or_else(|| {
            warn!(request_id = %request_id, "No pending competition request");
            CompetitionError::RequestNotFound(request_id)
        })?;
    let competition_id = populated.request.competition;

    // Step 2: Apply the decision to the competition
    match decision {
        Decision::Approve => {
            if populated.competition.is_none() {
                warn!(request_id = %request_id, competition_id = %competition_id, "Requested competition no longer exists");
                return Err(CompetitionError::RequestNotFound(request_id));
            }
            let approved = store
                .set_competition_valid(competition_id, true)
                .await
                .map_err(CompetitionError::store(StoreStep::ApproveCompetition))?;
            if approved.is_none() {
                warn!(request_id = %request_id, competition_id = %competition_id, "Competition removed while approving");
                return Err(CompetitionError::RequestNotFound(request_id));
            }
        }
        Decision::Reject => {
            let removed = store
                .delete_competition(competition_id)
                .await
                .map_err(CompetitionError::store(StoreStep::RemoveCompetition))?;
            if !removed {
                debug!(competition_id = %competition_id, "Competition already removed");
            }
        }
    }

    // Step 3: Retract the request from every admin inbox
    let admin_ids = store
        .find_admin_ids()
        .await
        .map_err(CompetitionError::store(StoreStep::LoadAdmins))?;

    fan_out(store, &admin_ids, request_id, InboxOp::Remove)
        .await
        .into_result()
        .map_err(CompetitionError::store(StoreStep::DeleteFromAdmins))?;

    // Step 4: Resolve the request
    let resolved = store
        .resolve_request(request_id, decision.status(), Utc::now())
        .await
        .map_err(CompetitionError::store(StoreStep::DeleteRequest))?;
    if !resolved {
        warn!(request_id = %request_id, decision = ?decision, "Request already resolved by another reviewer");
    }

    info!(
        request_id = %request_id,
        competition_id = %competition_id,
        reviewer = %actor.id(),
        status = %decision.status(),
        "Competition request resolved"
    );

    Ok(match decision {
        Decision::Approve => CompetitionEvent::CompetitionApproved {
            competition_id,
            request_id,
            reviewed_by: actor.id(),
        },
        Decision::Reject => CompetitionEvent::CompetitionRejected {
            competition_id,
            request_id,
            reviewed_by: actor.id(),
        },
    })
}
