//! Server dependencies for workflow actions (using traits for testability)
//!
//! This module provides the dependency container handed to every action.
//! The store is a trait object so tests can run the full workflow in memory.

use std::sync::Arc;

use crate::domains::competitions::duplicate_guard::NameMatch;
use crate::kernel::BaseResourceStore;

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseResourceStore>,
    /// How the duplicate guard compares proposed names to existing ones.
    pub name_match: NameMatch,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn BaseResourceStore>, name_match: NameMatch) -> Self {
        Self { store, name_match }
    }

    pub fn store(&self) -> &dyn BaseResourceStore {
        self.store.as_ref()
    }
}
