//! Optimistic concurrency for whole-list writes.

use serde::{Deserialize, Serialize};

/// Revision a writer expects the stored record to be at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedRevision {
    /// Skip the check (last writer wins).
    Any,
    /// Require the record to be at exactly this revision.
    Exact(u64),
}

impl ExpectedRevision {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedRevision::Any => true,
            ExpectedRevision::Exact(v) => v == actual,
        }
    }
}
