use thiserror::Error;

use console_core::{ExpectedRevision, ResourceRef};

use crate::{ResourceMetadata, ResourceRecord, ResourceSharingState};

/// Grant Store errors.
///
/// ## Error Categories
///
/// - **NotFound**: no record for the resource
/// - **AlreadyExists**: `create` on an existing resource
/// - **Conflict**: the writer's expected revision is stale
/// - **Backend**: the underlying storage failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("resource not found: {0}")]
    NotFound(ResourceRef),

    #[error("resource already exists: {0}")]
    AlreadyExists(ResourceRef),

    #[error("revision conflict on {resource}: expected {expected:?}, found {actual}")]
    Conflict {
        resource: ResourceRef,
        expected: ExpectedRevision,
        actual: u64,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence for shareable resources.
///
/// Sharing writes replace both grant lists as a unit. Every successful write
/// returns the record at its new revision; `ExpectedRevision::Exact` rejects
/// stale writers, `ExpectedRevision::Any` is last-writer-wins.
pub trait GrantStore: Send + Sync {
    /// Insert a new record at revision 1.
    fn create(
        &self,
        resource: ResourceRef,
        metadata: ResourceMetadata,
        sharing: ResourceSharingState,
    ) -> Result<ResourceRecord, StoreError>;

    fn get(&self, resource: &ResourceRef) -> Result<ResourceRecord, StoreError>;

    fn replace_sharing(
        &self,
        resource: &ResourceRef,
        sharing: ResourceSharingState,
        expected: ExpectedRevision,
    ) -> Result<ResourceRecord, StoreError>;

    fn update_metadata(
        &self,
        resource: &ResourceRef,
        metadata: ResourceMetadata,
        expected: ExpectedRevision,
    ) -> Result<ResourceRecord, StoreError>;

    /// Remove the record (and with it, its sharing state).
    fn delete(&self, resource: &ResourceRef, expected: ExpectedRevision) -> Result<(), StoreError>;
}
