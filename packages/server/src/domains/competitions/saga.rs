//! Compensation log for multi-write workflows.
//!
//! The store offers no transaction across documents. A workflow records one
//! compensation per committed write; if a later step fails it unwinds them
//! newest-first. Unwinding is best-effort: a compensation that fails is
//! logged with the ids left behind, and returned so callers can see it.

use tracing::{debug, error, info};

use super::inbox::{fan_out, InboxOp};
use crate::common::{CompetitionId, RequestId, UserId};
use crate::kernel::BaseResourceStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    DeleteCompetition(CompetitionId),
    DeleteRequest(RequestId),
    RetractInbox {
        request_id: RequestId,
        admins: Vec<UserId>,
    },
}

#[derive(Debug)]
#[must_use = "a saga must be committed or unwound"]
pub struct Saga {
    name: &'static str,
    compensations: Vec<Compensation>,
}

impl Saga {
    pub fn begin(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    pub fn record(&mut self, compensation: Compensation) {
        debug!(saga = self.name, compensation = ?compensation, "Recorded compensation");
        self.compensations.push(compensation);
    }

    pub fn pending(&self) -> &[Compensation] {
        &self.compensations
    }

    /// Every step succeeded; nothing to undo.
    pub fn commit(self) {
        debug!(saga = self.name, steps = self.compensations.len(), "Saga committed");
    }

    /// Undo recorded writes newest-first. Returns the compensations that could
    /// not be applied (orphaned state).
    pub async fn unwind(self, store: &dyn BaseResourceStore) -> Vec<Compensation> {
        info!(saga = self.name, steps = self.compensations.len(), "Unwinding saga");

        let mut orphaned = Vec::new();
        for compensation in self.compensations.into_iter().rev() {
            let outcome = match &compensation {
                Compensation::DeleteCompetition(id) => {
                    store.delete_competition(*id).await.map(|_| ())
                }
                Compensation::DeleteRequest(id) => store.delete_request(*id).await.map(|_| ()),
                Compensation::RetractInbox { request_id, admins } => {
                    fan_out(store, admins, *request_id, InboxOp::Remove)
                        .await
                        .into_result()
                        .map(|_| ())
                }
            };

            if let Err(e) = outcome {
                error!(
                    saga = self.name,
                    compensation = ?compensation,
                    error = %e,
                    "Compensation failed; orphaned state needs reconciliation"
                );
                orphaned.push(compensation);
            }
        }
        orphaned
    }
}
