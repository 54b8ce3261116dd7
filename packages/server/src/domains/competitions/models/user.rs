use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{RequestId, UserId};

/// User - an author of requests, and a reviewer when `admin` is set.
///
/// `requests` is the user's inbox: ordered references to pending requests.
/// It lives in the `user_requests` table and is loaded alongside the row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub admin: bool,
    #[sqlx(skip)]
    pub requests: Vec<RequestId>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct InboxRow {
    user_id: UserId,
    request_id: RequestId,
}

impl User {
    pub fn new(name: impl Into<String>, admin: bool) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            admin,
            requests: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the inbox references the given request.
    pub fn has_request(&self, request_id: RequestId) -> bool {
        self.requests.contains(&request_id)
    }

    // =========================================================================
    // SQL Queries
    // =========================================================================

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        let mut user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, admin, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.admin)
        .bind(self.created_at)
        .fetch_one(pool)
        .await?;
        user.requests = Self::load_inbox(user.id, pool).await?;
        Ok(user)
    }

    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match user {
            Some(mut user) => {
                user.requests = Self::load_inbox(user.id, pool).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Ids of all admins, in creation order.
    pub async fn find_admin_ids(pool: &PgPool) -> Result<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM users WHERE admin = true ORDER BY created_at, id",
        )
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    pub async fn load_inbox(id: UserId, pool: &PgPool) -> Result<Vec<RequestId>> {
        let rows = sqlx::query_as::<_, InboxRow>(
            r#"
            SELECT user_id, request_id FROM user_requests
            WHERE user_id = $1
            ORDER BY added_at, request_id
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.request_id).collect())
    }

    /// Append a request to a user's inbox. Idempotent: returns `false` when
    /// the entry was already there.
    pub async fn add_inbox_entry(
        user_id: UserId,
        request_id: RequestId,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_requests (user_id, request_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, request_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(request_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a request from a user's inbox. Returns `false` when it was absent.
    pub async fn remove_inbox_entry(
        user_id: UserId,
        request_id: RequestId,
        pool: &PgPool,
    ) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM user_requests WHERE user_id = $1 AND request_id = $2")
                .bind(user_id)
                .bind(request_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
