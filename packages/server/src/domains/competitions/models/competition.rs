use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CompetitionId, UserId};
use crate::domains::competitions::duplicate_guard::NameMatch;

/// Competition - a shared resource that exists only once an admin approves it.
///
/// `valid = false` means the competition is waiting on its CREATE request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub description: Option<String>,
    pub directors: Vec<UserId>,
    pub valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied competition fields. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompetitionDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CompetitionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// The name as it will be stored and matched (surrounding whitespace removed).
    pub fn normalized_name(&self) -> &str {
        self.name.trim()
    }
}

impl Competition {
    /// Build a competition awaiting approval, with the requester as its first director.
    pub fn pending(descriptor: &CompetitionDescriptor, director: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CompetitionId::new(),
            name: descriptor.normalized_name().to_string(),
            description: descriptor.description.clone(),
            directors: vec![director],
            valid: false,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // SQL Queries
    // =========================================================================

    /// Insert a new competition. Fails with a unique violation when the
    /// lower-cased name is taken.
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (id, name, description, directors, valid, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(&self.directors)
        .bind(self.valid)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(competition)
    }

    pub async fn find_by_id(id: CompetitionId, pool: &PgPool) -> Result<Option<Self>> {
        let competition =
            sqlx::query_as::<_, Competition>("SELECT * FROM competitions WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(competition)
    }

    /// Find the oldest competition whose name collides with `name` under `mode`.
    pub async fn find_by_name(name: &str, mode: NameMatch, pool: &PgPool) -> Result<Option<Self>> {
        let sql = match mode {
            NameMatch::Prefix => {
                "SELECT * FROM competitions WHERE starts_with(lower(name), lower($1)) ORDER BY created_at LIMIT 1"
            }
            NameMatch::Exact => {
                "SELECT * FROM competitions WHERE lower(name) = lower($1) ORDER BY created_at LIMIT 1"
            }
        };
        let competition = sqlx::query_as::<_, Competition>(sql)
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(competition)
    }

    /// Flip the approval flag. Returns `None` if the competition no longer exists.
    pub async fn set_valid(id: CompetitionId, valid: bool, pool: &PgPool) -> Result<Option<Self>> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            UPDATE competitions
            SET valid = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valid)
        .fetch_optional(pool)
        .await?;
        Ok(competition)
    }

    /// Delete a competition. Returns whether a row was removed.
    pub async fn delete(id: CompetitionId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM competitions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
