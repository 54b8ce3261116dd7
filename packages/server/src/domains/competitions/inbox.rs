//! Inbox Fan-out - append a request to, or retract it from, every admin inbox.
//!
//! Per-admin writes are launched together and awaited jointly. Each write is
//! keyed by (admin, request), so repeating a fan-out is harmless and a retry
//! can target just the admins that failed.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::common::{RequestId, UserId};
use crate::kernel::{BaseResourceStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxOp {
    Append,
    Remove,
}

/// Per-admin outcome of one fan-out.
#[derive(Debug)]
pub struct FanOutReport {
    pub request_id: RequestId,
    pub op: InboxOp,
    /// Admins whose write succeeded (including no-op repeats), in input order.
    pub delivered: Vec<UserId>,
    /// Admins whose write failed, in input order.
    pub failed: Vec<(UserId, StoreError)>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_admins(&self) -> Vec<UserId> {
        self.failed.iter().map(|(id, _)| *id).collect()
    }

    /// Collapse to the aggregate result: the first failure wins.
    pub fn into_result(self) -> Result<Vec<UserId>, StoreError> {
        match self.failed.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(self.delivered),
        }
    }
}

/// Apply `op` for `request_id` to each admin's inbox concurrently.
pub async fn fan_out(
    store: &dyn BaseResourceStore,
    admin_ids: &[UserId],
    request_id: RequestId,
    op: InboxOp,
) -> FanOutReport {
    let writes = admin_ids.iter().map(|&admin_id| async move {
        let result = match op {
            InboxOp::Append => store.add_inbox_entry(admin_id, request_id).await,
            InboxOp::Remove => store.remove_inbox_entry(admin_id, request_id).await,
        };
        (admin_id, result)
    });

    let mut report = FanOutReport {
        request_id,
        op,
        delivered: Vec::with_capacity(admin_ids.len()),
        failed: Vec::new(),
    };

    for (admin_id, result) in join_all(writes).await {
        match result {
            Ok(changed) => {
                if !changed {
                    debug!(admin_id = %admin_id, request_id = %request_id, op = ?op, "Inbox already up to date");
                }
                report.delivered.push(admin_id);
            }
            Err(e) => {
                warn!(admin_id = %admin_id, request_id = %request_id, op = ?op, error = %e, "Inbox write failed");
                report.failed.push((admin_id, e));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::InMemoryResourceStore;

    #[tokio::test]
    async fn append_reaches_every_admin_once() {
        let store = InMemoryResourceStore::new();
        let a = store.seed_user("A", true);
        let b = store.seed_user("B", true);
        let request_id = RequestId::new();
        let admins = [a.id, b.id];

        let first = fan_out(&store, &admins, request_id, InboxOp::Append).await;
        let again = fan_out(&store, &admins, request_id, InboxOp::Append).await;

        assert!(first.is_complete());
        assert!(again.is_complete());
        assert_eq!(store.user(a.id).unwrap().requests, vec![request_id]);
        assert_eq!(store.user(b.id).unwrap().requests, vec![request_id]);
    }

    #[tokio::test]
    async fn remove_leaves_other_requests_alone() {
        let store = InMemoryResourceStore::new();
        let admin = store.seed_user("A", true);
        let keep = RequestId::new();
        let gone = RequestId::new();
        store.add_inbox_entry(admin.id, keep).await.unwrap();
        store.add_inbox_entry(admin.id, gone).await.unwrap();

        let report = fan_out(&store, &[admin.id], gone, InboxOp::Remove).await;

        assert_eq!(report.into_result().unwrap(), vec![admin.id]);
        assert_eq!(store.user(admin.id).unwrap().requests, vec![keep]);
    }

    #[tokio::test]
    async fn partial_failure_is_tracked_per_admin() {
        let store = InMemoryResourceStore::new();
        let ok = store.seed_user("Ok", true);
        let broken = store.seed_user("Broken", true);
        store.fail_inbox_for(broken.id);
        let request_id = RequestId::new();

        let report = fan_out(&store, &[ok.id, broken.id], request_id, InboxOp::Append).await;

        assert!(!report.is_complete());
        assert_eq!(report.delivered, vec![ok.id]);
        assert_eq!(report.failed_admins(), vec![broken.id]);
        assert!(store.user(ok.id).unwrap().has_request(request_id));

        // Retry only the failed subset once the store recovers.
        store.heal();
        let retry = fan_out(&store, &report.failed_admins(), request_id, InboxOp::Append).await;
        assert!(retry.is_complete());
        assert!(store.user(broken.id).unwrap().has_request(request_id));
    }

    #[tokio::test]
    async fn empty_admin_list_succeeds() {
        let store = InMemoryResourceStore::new();
        let report = fan_out(&store, &[], RequestId::new(), InboxOp::Append).await;
        assert!(report.into_result().unwrap().is_empty());
    }
}
