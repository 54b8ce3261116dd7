// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The workflow lives in domains/competitions/actions and talks to the store
// through this trait so tests can swap in the in-memory implementation.
//
// Naming convention: Base* for trait names (e.g., BaseResourceStore)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::common::{CompetitionId, RequestId, UserId};
use crate::domains::competitions::duplicate_guard::NameMatch;
use crate::domains::competitions::models::{
    Competition, PopulatedRequest, Request, RequestStatus, User,
};

/// Failure of a single store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Anything else: connection loss, timeouts, malformed rows.
    #[error("Store failure: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

// =============================================================================
// Resource Store Trait (Infrastructure - Competition, User and Request documents)
// =============================================================================

/// Persistence for the workflow entities.
///
/// Every method is an independent write or read: there is no transaction
/// spanning two calls. Writes that target something already gone report
/// `false` / `None` rather than failing.
#[async_trait]
pub trait BaseResourceStore: Send + Sync {
    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    // --- competitions ---

    async fn find_competition(&self, id: CompetitionId) -> Result<Option<Competition>, StoreError>;

    /// Oldest competition whose name collides with `name` under `mode`.
    async fn find_competition_by_name(
        &self,
        name: &str,
        mode: NameMatch,
    ) -> Result<Option<Competition>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the case-insensitive name is taken.
    async fn create_competition(&self, competition: Competition) -> Result<Competition, StoreError>;

    async fn set_competition_valid(
        &self,
        id: CompetitionId,
        valid: bool,
    ) -> Result<Option<Competition>, StoreError>;

    async fn delete_competition(&self, id: CompetitionId) -> Result<bool, StoreError>;

    // --- users and inboxes ---

    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Ids of every admin, in creation order. Inboxes are not loaded.
    async fn find_admin_ids(&self) -> Result<Vec<UserId>, StoreError>;

    /// Upsert keyed by (user, request). Returns `false` if already present.
    async fn add_inbox_entry(&self, user_id: UserId, request_id: RequestId)
        -> Result<bool, StoreError>;

    /// Returns `false` if the entry was absent.
    async fn remove_inbox_entry(
        &self,
        user_id: UserId,
        request_id: RequestId,
    ) -> Result<bool, StoreError>;

    // --- request ledger ---

    async fn create_request(&self, request: Request) -> Result<Request, StoreError>;

    /// Any request, resolved or not.
    async fn find_request(&self, id: RequestId) -> Result<Option<Request>, StoreError>;

    /// A still-pending request together with its competition.
    async fn find_pending_request(
        &self,
        id: RequestId,
    ) -> Result<Option<PopulatedRequest>, StoreError>;

    /// Conditional on the request being pending; `false` means someone else
    /// resolved it first.
    async fn resolve_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn delete_request(&self, id: RequestId) -> Result<bool, StoreError>;
}
