// TestDependencies - in-memory store for testing
//
// Provides a resource store that keeps everything in process memory, with
// per-operation failure injection and call recording.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{BaseResourceStore, StoreError};
use super::ServerDeps;
use crate::common::{CompetitionId, RequestId, UserId};
use crate::domains::competitions::duplicate_guard::NameMatch;
use crate::domains::competitions::models::{
    Competition, PopulatedRequest, Request, RequestStatus, User,
};

/// One variant per store method, used to target failures and inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Ping,
    FindCompetition,
    FindCompetitionByName,
    CreateCompetition,
    SetCompetitionValid,
    DeleteCompetition,
    CreateUser,
    FindUser,
    FindAdminIds,
    AddInboxEntry,
    RemoveInboxEntry,
    CreateRequest,
    FindRequest,
    FindPendingRequest,
    ResolveRequest,
    DeleteRequest,
}

#[derive(Default)]
struct StoreState {
    competitions: HashMap<CompetitionId, Competition>,
    users: HashMap<UserId, User>,
    requests: HashMap<RequestId, Request>,
}

#[derive(Default)]
struct FailurePlan {
    ops: HashSet<StoreOp>,
    /// Inbox writes for these users fail, whatever the op.
    inboxes: HashSet<UserId>,
}

/// In-memory [`BaseResourceStore`].
///
/// Cloning shares the underlying data, so a test can keep a handle while the
/// workflow owns another.
#[derive(Clone, Default)]
pub struct InMemoryResourceStore {
    state: Arc<Mutex<StoreState>>,
    failures: Arc<Mutex<FailurePlan>>,
    calls: Arc<Mutex<Vec<StoreOp>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not wedge the others.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `op` fail with a backend error.
    pub fn fail_on(&self, op: StoreOp) -> &Self {
        lock(&self.failures).ops.insert(op);
        self
    }

    /// Make inbox writes for one user fail.
    pub fn fail_inbox_for(&self, user_id: UserId) -> &Self {
        lock(&self.failures).inboxes.insert(user_id);
        self
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut failures = lock(&self.failures);
        failures.ops.clear();
        failures.inboxes.clear();
    }

    /// Operations invoked so far, in call order.
    pub fn calls(&self) -> Vec<StoreOp> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, op: StoreOp) -> usize {
        lock(&self.calls).iter().filter(|c| **c == op).count()
    }

    pub fn competitions(&self) -> Vec<Competition> {
        let mut all: Vec<Competition> = lock(&self.state).competitions.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    pub fn requests(&self) -> Vec<Request> {
        let mut all: Vec<Request> = lock(&self.state).requests.values().cloned().collect();
        all.sort_by_key(|r| r.id);
        all
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        lock(&self.state).users.get(&id).cloned()
    }

    /// Insert a user directly, bypassing failure injection.
    pub fn seed_user(&self, name: &str, admin: bool) -> User {
        let user = User::new(name, admin);
        lock(&self.state).users.insert(user.id, user.clone());
        user
    }

    /// Insert a competition directly, bypassing failure injection and the name index.
    pub fn seed_competition(&self, competition: Competition) -> Competition {
        lock(&self.state)
            .competitions
            .insert(competition.id, competition.clone());
        competition
    }

    /// Wrap this store in server dependencies with the default name matching.
    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(Arc::new(self.clone()), NameMatch::default())
    }

    /// Every call suspends once, so concurrent workflows interleave the way
    /// they do against a real database.
    async fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        lock(&self.calls).push(op);
        if lock(&self.failures).ops.contains(&op) {
            return Err(StoreError::Backend(anyhow!("injected failure: {:?}", op)));
        }
        Ok(())
    }

    async fn enter_inbox(&self, op: StoreOp, user_id: UserId) -> Result<(), StoreError> {
        self.enter(op).await?;
        if lock(&self.failures).inboxes.contains(&user_id) {
            return Err(StoreError::Backend(anyhow!(
                "injected inbox failure for user {}",
                user_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BaseResourceStore for InMemoryResourceStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.enter(StoreOp::Ping).await
    }

    async fn find_competition(&self, id: CompetitionId) -> Result<Option<Competition>, StoreError> {
        self.enter(StoreOp::FindCompetition).await?;
        Ok(lock(&self.state).competitions.get(&id).cloned())
    }

    async fn find_competition_by_name(
        &self,
        name: &str,
        mode: NameMatch,
    ) -> Result<Option<Competition>, StoreError> {
        self.enter(StoreOp::FindCompetitionByName).await?;
        let state = lock(&self.state);
        Ok(state
            .competitions
            .values()
            .filter(|c| mode.matches(&c.name, name))
            .min_by_key(|c| (c.created_at, c.id))
            .cloned())
    }

    async fn create_competition(&self, competition: Competition) -> Result<Competition, StoreError> {
        self.enter(StoreOp::CreateCompetition).await?;
        let mut state = lock(&self.state);
        let key = competition.name.to_lowercase();
        if state
            .competitions
            .values()
            .any(|c| c.name.to_lowercase() == key)
        {
            return Err(StoreError::Conflict(format!(
                "competition name \"{}\" is taken",
                competition.name
            )));
        }
        state
            .competitions
            .insert(competition.id, competition.clone());
        Ok(competition)
    }

    async fn set_competition_valid(
        &self,
        id: CompetitionId,
        valid: bool,
    ) -> Result<Option<Competition>, StoreError> {
        self.enter(StoreOp::SetCompetitionValid).await?;
        let mut state = lock(&self.state);
        Ok(state.competitions.get_mut(&id).map(|c| {
            c.valid = valid;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_competition(&self, id: CompetitionId) -> Result<bool, StoreError> {
        self.enter(StoreOp::DeleteCompetition).await?;
        Ok(lock(&self.state).competitions.remove(&id).is_some())
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        self.enter(StoreOp::CreateUser).await?;
        lock(&self.state).users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.enter(StoreOp::FindUser).await?;
        Ok(lock(&self.state).users.get(&id).cloned())
    }

    async fn find_admin_ids(&self) -> Result<Vec<UserId>, StoreError> {
        self.enter(StoreOp::FindAdminIds).await?;
        let state = lock(&self.state);
        let mut admins: Vec<&User> = state.users.values().filter(|u| u.admin).collect();
        admins.sort_by_key(|u| (u.created_at, u.id));
        Ok(admins.into_iter().map(|u| u.id).collect())
    }

    async fn add_inbox_entry(
        &self,
        user_id: UserId,
        request_id: RequestId,
    ) -> Result<bool, StoreError> {
        self.enter_inbox(StoreOp::AddInboxEntry, user_id).await?;
        let mut state = lock(&self.state);
        let Some(user) = state.users.get_mut(&user_id) else {
            return Err(StoreError::Backend(anyhow!("user {} does not exist", user_id)));
        };
        if user.has_request(request_id) {
            return Ok(false);
        }
        user.requests.push(request_id);
        Ok(true)
    }

    async fn remove_inbox_entry(
        &self,
        user_id: UserId,
        request_id: RequestId,
    ) -> Result<bool, StoreError> {
        self.enter_inbox(StoreOp::RemoveInboxEntry, user_id).await?;
        let mut state = lock(&self.state);
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = user.requests.len();
        user.requests.retain(|r| *r != request_id);
        Ok(user.requests.len() != before)
    }

    async fn create_request(&self, request: Request) -> Result<Request, StoreError> {
        self.enter(StoreOp::CreateRequest).await?;
        lock(&self.state).requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
        self.enter(StoreOp::FindRequest).await?;
        Ok(lock(&self.state).requests.get(&id).cloned())
    }

    async fn find_pending_request(
        &self,
        id: RequestId,
    ) -> Result<Option<PopulatedRequest>, StoreError> {
        self.enter(StoreOp::FindPendingRequest).await?;
        let state = lock(&self.state);
        Ok(state
            .requests
            .get(&id)
            .filter(|r| r.status.is_pending())
            .map(|request| PopulatedRequest {
                request: request.clone(),
                competition: state.competitions.get(&request.competition).cloned(),
            }))
    }

    async fn resolve_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.enter(StoreOp::ResolveRequest).await?;
        let mut state = lock(&self.state);
        match state.requests.get_mut(&id) {
            Some(request) if request.status.is_pending() => {
                request.status = status;
                request.resolved_at = Some(resolved_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_request(&self, id: RequestId) -> Result<bool, StoreError> {
        self.enter(StoreOp::DeleteRequest).await?;
        let mut state = lock(&self.state);
        let removed = state.requests.remove(&id).is_some();
        // Mirrors the ON DELETE CASCADE on user_requests.
        for user in state.users.values_mut() {
            user.requests.retain(|r| *r != id);
        }
        Ok(removed)
    }
}
