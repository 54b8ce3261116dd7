//! Postgres-backed resource store.
//!
//! Thin adapter: every query lives on the models, this only maps their
//! `anyhow` errors onto [`StoreError`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::{BaseResourceStore, StoreError};
use crate::common::{CompetitionId, RequestId, UserId};
use crate::domains::competitions::duplicate_guard::NameMatch;
use crate::domains::competitions::models::{
    Competition, PopulatedRequest, Request, RequestStatus, User,
};

#[derive(Clone)]
pub struct PostgresResourceStore {
    pool: PgPool,
}

impl PostgresResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations become [`StoreError::Conflict`]; everything else is a backend failure.
fn classify(err: anyhow::Error) -> StoreError {
    if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    StoreError::Backend(err)
}

#[async_trait]
impl BaseResourceStore for PostgresResourceStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| classify(e.into()))
    }

    async fn find_competition(&self, id: CompetitionId) -> Result<Option<Competition>, StoreError> {
        Competition::find_by_id(id, &self.pool).await.map_err(classify)
    }

    async fn find_competition_by_name(
        &self,
        name: &str,
        mode: NameMatch,
    ) -> Result<Option<Competition>, StoreError> {
        Competition::find_by_name(name, mode, &self.pool)
            .await
            .map_err(classify)
    }

    async fn create_competition(&self, competition: Competition) -> Result<Competition, StoreError> {
        competition.insert(&self.pool).await.map_err(classify)
    }

    async fn set_competition_valid(
        &self,
        id: CompetitionId,
        valid: bool,
    ) -> Result<Option<Competition>, StoreError> {
        Competition::set_valid(id, valid, &self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_competition(&self, id: CompetitionId) -> Result<bool, StoreError> {
        Competition::delete(id, &self.pool).await.map_err(classify)
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        user.insert(&self.pool).await.map_err(classify)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        User::find_by_id(id, &self.pool).await.map_err(classify)
    }

    async fn find_admin_ids(&self) -> Result<Vec<UserId>, StoreError> {
        User::find_admin_ids(&self.pool).await.map_err(classify)
    }

    async fn add_inbox_entry(
        &self,
        user_id: UserId,
        request_id: RequestId,
    ) -> Result<bool, StoreError> {
        User::add_inbox_entry(user_id, request_id, &self.pool)
            .await
            .map_err(classify)
    }

    async fn remove_inbox_entry(
        &self,
        user_id: UserId,
        request_id: RequestId,
    ) -> Result<bool, StoreError> {
        User::remove_inbox_entry(user_id, request_id, &self.pool)
            .await
            .map_err(classify)
    }

    async fn create_request(&self, request: Request) -> Result<Request, StoreError> {
        request.insert(&self.pool).await.map_err(classify)
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
        Request::find_by_id(id, &self.pool).await.map_err(classify)
    }

    async fn find_pending_request(
        &self,
        id: RequestId,
    ) -> Result<Option<PopulatedRequest>, StoreError> {
        Request::find_pending_populated(id, &self.pool)
            .await
            .map_err(classify)
    }

    async fn resolve_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Request::mark_resolved(id, status, resolved_at, &self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_request(&self, id: RequestId) -> Result<bool, StoreError> {
        Request::delete(id, &self.pool).await.map_err(classify)
    }
}
