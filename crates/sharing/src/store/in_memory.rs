use std::collections::HashMap;
use std::sync::RwLock;

use console_core::{ExpectedRevision, ResourceRef};

use super::r#trait::{GrantStore, StoreError};
use crate::{ResourceMetadata, ResourceRecord, ResourceSharingState};

/// In-memory grant store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    records: RwLock<HashMap<ResourceRef, ResourceRecord>>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.records
            .read()
            .map(|r| r.len())
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn write_record<F>(
        &self,
        resource: &ResourceRef,
        expected: ExpectedRevision,
        mutate: F,
    ) -> Result<ResourceRecord, StoreError>
    where
        F: FnOnce(&mut ResourceRecord),
    {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let record = records
            .get_mut(resource)
            .ok_or_else(|| StoreError::NotFound(resource.clone()))?;

        if !expected.matches(record.revision) {
            return Err(StoreError::Conflict {
                resource: resource.clone(),
                expected,
                actual: record.revision,
            });
        }

        mutate(record);
        record.revision += 1;
        Ok(record.clone())
    }
}

impl GrantStore for InMemoryGrantStore {
    fn create(
        &self,
        resource: ResourceRef,
        metadata: ResourceMetadata,
        sharing: ResourceSharingState,
    ) -> Result<ResourceRecord, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        if records.contains_key(&resource) {
            return Err(StoreError::AlreadyExists(resource));
        }

        let record = ResourceRecord {
            resource: resource.clone(),
            metadata,
            sharing,
            revision: 1,
        };
        records.insert(resource, record.clone());
        Ok(record)
    }

    fn get(&self, resource: &ResourceRef) -> Result<ResourceRecord, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        records
            .get(resource)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(resource.clone()))
    }

    fn replace_sharing(
        &self,
        resource: &ResourceRef,
        sharing: ResourceSharingState,
        expected: ExpectedRevision,
    ) -> Result<ResourceRecord, StoreError> {
        self.write_record(resource, expected, |record| record.sharing = sharing)
    }

    fn update_metadata(
        &self,
        resource: &ResourceRef,
        metadata: ResourceMetadata,
        expected: ExpectedRevision,
    ) -> Result<ResourceRecord, StoreError> {
        self.write_record(resource, expected, |record| record.metadata = metadata)
    }

    fn delete(&self, resource: &ResourceRef, expected: ExpectedRevision) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let actual = records
            .get(resource)
            .map(|r| r.revision)
            .ok_or_else(|| StoreError::NotFound(resource.clone()))?;

        if !expected.matches(actual) {
            return Err(StoreError::Conflict {
                resource: resource.clone(),
                expected,
                actual,
            });
        }

        records.remove(resource);
        Ok(())
    }
}
