//! Reconciliation planning.
//!
//! A sync pass partitions the fetched draft set against the ids already
//! mirrored locally into creates, updates, and stale ids. The plan is then
//! applied atomically by the store; planning itself touches no state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The three-way reconciliation outcome for one entity kind.
#[derive(Debug, Clone)]
pub struct SyncPlan<T> {
    /// Drafts with no local counterpart.
    pub to_create: Vec<T>,
    /// Drafts matching an existing local row; applied as full overwrites.
    pub to_update: Vec<T>,
    /// Local ids absent from the fetched set, scheduled for deletion.
    pub stale_ids: Vec<String>,
}

// Manual impl: a derive would require `T: Default`, but an empty plan needs
// nothing from `T`.
impl<T> Default for SyncPlan<T> {
    fn default() -> Self {
        Self {
            to_create: Vec::new(),
            to_update: Vec::new(),
            stale_ids: Vec::new(),
        }
    }
}

impl<T> SyncPlan<T> {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.stale_ids.is_empty()
    }
}

/// Counters reported by one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Set when the fetch hit the page cap; deletions were suppressed.
    pub truncated: bool,
}

/// Partition drafts against the locally-known id set.
///
/// Stale ids come out in deterministic order so repeated passes produce
/// identical plans for identical inputs.
pub fn partition<T, F>(drafts: Vec<T>, existing: &HashSet<String>, id_of: F) -> SyncPlan<T>
where
    F: Fn(&T) -> &str,
{
    let fetched: HashSet<String> = drafts.iter().map(|d| id_of(d).to_string()).collect();

    let mut plan = SyncPlan::default();
    for draft in drafts {
        if existing.contains(id_of(&draft)) {
            plan.to_update.push(draft);
        } else {
            plan.to_create.push(draft);
        }
    }

    plan.stale_ids = existing
        .iter()
        .filter(|id| !fetched.contains(*id))
        .cloned()
        .collect();
    plan.stale_ids.sort();

    plan
}
