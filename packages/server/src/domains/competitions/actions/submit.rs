//! Submit - request creation of a new competition.
//!
//! Writes a pending competition and its CREATE request, then routes the
//! request to every admin. Each committed write is recorded in a [`Saga`] so a
//! failure further down removes what was already written.

use tracing::{error, info, warn};

use crate::common::UserId;
use crate::domains::competitions::duplicate_guard::{check_name, NameMatch};
use crate::domains::competitions::errors::{CompetitionError, StoreStep};
use crate::domains::competitions::events::CompetitionEvent;
use crate::domains::competitions::inbox::{fan_out, InboxOp};
use crate::domains::competitions::models::{Competition, CompetitionDescriptor, Request};
use crate::domains::competitions::saga::{Compensation, Saga};
use crate::kernel::{BaseResourceStore, ServerDeps, StoreError};

/// Submit a competition for admin review.
///
/// Returns `CompetitionRequested` once the competition, the request and every
/// admin inbox entry are written.
pub async fn submit_competition_request(
    descriptor: CompetitionDescriptor,
    author_id: UserId,
    deps: &ServerDeps,
) -> Result<CompetitionEvent, CompetitionError> {
    let store = deps.store();
    let name = descriptor.normalized_name().to_string();

    if name.is_empty() {
        warn!(author_id = %author_id, "Rejected competition request with blank name");
        return Err(CompetitionError::validation(
            "Competition name must be filled out.",
        ));
    }

    info!(author_id = %author_id, name = %name, "Competition requested");

    // Step 1: Duplicate guard (fast path, the unique index decides)
    let check = check_name(store, &name, deps.name_match)
        .await
        .map_err(CompetitionError::store(StoreStep::LoadCompetitions))?;
    if let Some(err) = check.into_error(&name) {
        warn!(name = %name, error = %err, "Competition name already taken");
        return Err(err);
    }

    // Step 2: Load the author
    let author = store
        .find_user(author_id)
        .await
        .map_err(CompetitionError::store(StoreStep::LoadAuthor))?
        .ok_or_else(|| {
            warn!(author_id = %author_id, "Author of competition request not found");
            CompetitionError::AuthorNotFound(author_id)
        })?;

    // Step 3: Create the pending competition
    let competition = match store
        .create_competition(Competition::pending(&descriptor, author.id))
        .await
    {
        Ok(competition) => competition,
        Err(e) if e.is_conflict() => return Err(lost_name_race(store, &name).await),
        Err(e) => return Err(CompetitionError::store(StoreStep::CreateCompetition)(e)),
    };

    let mut saga = Saga::begin("submit_competition_request");
    saga.record(Compensation::DeleteCompetition(competition.id));

    // Step 4: Create the CREATE request
    let request = match store
        .create_request(Request::creation(&author, &competition))
        .await
    {
        Ok(request) => request,
        Err(e) => return Err(abort(saga, store, StoreStep::CreateRequest, e).await),
    };
    saga.record(Compensation::DeleteRequest(request.id));

    // Step 5: Route the request to every admin
    let admin_ids = match store.find_admin_ids().await {
        Ok(ids) => ids,
        Err(e) => return Err(abort(saga, store, StoreStep::LoadAdmins, e).await),
    };

    let report = fan_out(store, &admin_ids, request.id, InboxOp::Append).await;
    if !report.delivered.is_empty() {
        saga.record(Compensation::RetractInbox {
            request_id: request.id,
            admins: report.delivered.clone(),
        });
    }
    if !report.is_complete() {
        error!(
            request_id = %request.id,
            failed_admins = ?report.failed_admins(),
            "Failed to deliver competition request to every admin"
        );
    }
    let delivered = match report.into_result() {
        Ok(delivered) => delivered,
        Err(e) => return Err(abort(saga, store, StoreStep::SendToAdmins, e).await),
    };

    saga.commit();

    info!(
        competition_id = %competition.id,
        request_id = %request.id,
        admin_count = delivered.len(),
        "Competition request submitted"
    );

    Ok(CompetitionEvent::CompetitionRequested {
        competition_id: competition.id,
        request_id: request.id,
        author_id: author.id,
        notified_admins: delivered.len(),
    })
}

/// Unwind everything written so far and report the failing step.
async fn abort(
    saga: Saga,
    store: &dyn BaseResourceStore,
    step: StoreStep,
    source: StoreError,
) -> CompetitionError {
    error!(step = ?step, error = %source, "Competition request failed");
    let orphaned = saga.unwind(store).await;
    if !orphaned.is_empty() {
        error!(step = ?step, orphaned = ?orphaned, "Competition request left orphaned state");
    }
    CompetitionError::store(step)(source)
}

/// Another submission created the same name between the guard and our insert.
async fn lost_name_race(store: &dyn BaseResourceStore, name: &str) -> CompetitionError {
    let pending = match store.find_competition_by_name(name, NameMatch::Exact).await {
        Ok(Some(existing)) => !existing.valid,
        Ok(None) => true,
        Err(e) => {
            warn!(name = %name, error = %e, "Could not re-read conflicting competition");
            true
        }
    };
    warn!(name = %name, pending, "Competition name claimed by a concurrent request");
    CompetitionError::DuplicateCompetition {
        name: name.to_string(),
        pending,
    }
}
