use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{Competition, User};
use crate::common::{CompetitionId, RequestId, UserId};

/// What a request asks reviewers to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Create,
    Approve,
    Reject,
}

/// Lifecycle of a request. Resolved requests are kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_pending(self) -> bool {
        self == RequestStatus::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "PENDING"),
            RequestStatus::Approved => write!(f, "APPROVED"),
            RequestStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Request - a pending action routed to every admin's inbox
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Request {
    pub id: RequestId,
    #[sqlx(rename = "author_id")]
    pub author: UserId,
    pub body: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[sqlx(rename = "competition_id")]
    pub competition: CompetitionId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A request loaded together with the competition it targets.
///
/// `competition` is `None` when the competition was deleted underneath the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedRequest {
    pub request: Request,
    pub competition: Option<Competition>,
}

impl Request {
    /// Build the CREATE request for a freshly submitted competition.
    pub fn creation(author: &User, competition: &Competition) -> Self {
        Self {
            id: RequestId::new(),
            author: author.id,
            body: format!(
                "{} requests to create the competition \"{}\".",
                author.name, competition.name
            ),
            request_type: RequestType::Create,
            competition: competition.id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    // =========================================================================
    // SQL Queries
    // =========================================================================

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        let request = sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests (id, author_id, body, request_type, competition_id, status, created_at, resolved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.author)
        .bind(&self.body)
        .bind(self.request_type)
        .bind(self.competition)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.resolved_at)
        .fetch_one(pool)
        .await?;
        Ok(request)
    }

    pub async fn find_by_id(id: RequestId, pool: &PgPool) -> Result<Option<Self>> {
        let request = sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(request)
    }

    /// Load a request only while it is still pending, with its competition.
    pub async fn find_pending_populated(
        id: RequestId,
        pool: &PgPool,
    ) -> Result<Option<PopulatedRequest>> {
        let request = sqlx::query_as::<_, Request>(
            "SELECT * FROM requests WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let Some(request) = request else {
            return Ok(None);
        };

        let competition = Competition::find_by_id(request.competition, pool).await?;
        Ok(Some(PopulatedRequest {
            request,
            competition,
        }))
    }

    /// Move a pending request to a resolved status.
    ///
    /// Conditional on the request still being pending: returns `false` when
    /// another reviewer resolved it first (or it never existed).
    pub async fn mark_resolved(
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE requests
            SET status = $2, resolved_at = $3
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(resolved_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete, used only to compensate a failed submission.
    pub async fn delete(id: RequestId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::competitions::models::CompetitionDescriptor;

    #[test]
    fn creation_request_describes_the_competition() {
        let author = User::new("Ada", false);
        let competition =
            Competition::pending(&CompetitionDescriptor::new("Spring Classic"), author.id);

        let request = Request::creation(&author, &competition);

        assert_eq!(request.request_type, RequestType::Create);
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.author, author.id);
        assert_eq!(request.competition, competition.id);
        assert_eq!(
            request.body,
            "Ada requests to create the competition \"Spring Classic\"."
        );
    }

    #[test]
    fn request_type_uses_wire_names() {
        let json = serde_json::to_value(RequestType::Create).unwrap();
        assert_eq!(json, serde_json::json!("CREATE"));
    }
}
