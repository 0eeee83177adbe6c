//! One controller for every shareable resource kind.
//!
//! Organizations, projects and secrets differ only in their `ResourceKind`;
//! every operation reads the current grants, resolves the caller's role at
//! `now`, and gates on the capability table before touching the store.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use console_auth::{
    AuthorizationExplanation, AuthzError, Capability, Grant, GrantValidationError, PrincipalIdentity,
    Resolution, authorize, explain_authorization,
};
use console_core::{ExpectedRevision, ResourceRef, Timestamp};

use crate::store::{GrantStore, StoreError};
use crate::{ResourceMetadata, ResourceRecord, ResourceSharingState, SharingPolicy};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("permission denied on {resource}: {source}")]
    Forbidden {
        resource: ResourceRef,
        #[source]
        source: AuthzError,
    },

    #[error("resource not found: {0}")]
    NotFound(ResourceRef),

    #[error("resource already exists: {0}")]
    AlreadyExists(ResourceRef),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid grants: {0}")]
    InvalidGrants(#[from] GrantValidationError),

    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(r) => ControllerError::NotFound(r),
            StoreError::AlreadyExists(r) => ControllerError::AlreadyExists(r),
            e @ StoreError::Conflict { .. } => ControllerError::Conflict(e.to_string()),
            StoreError::Backend(msg) => ControllerError::Store(msg),
        }
    }
}

/// A record as seen by one principal at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub record: ResourceRecord,
    #[serde(flatten)]
    pub resolution: Resolution,
}

pub struct ResourceController<S: GrantStore> {
    store: Arc<S>,
    policy: SharingPolicy,
}

impl<S: GrantStore> Clone for ResourceController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: GrantStore> std::fmt::Debug for ResourceController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<S: GrantStore> ResourceController<S> {
    pub fn new(store: Arc<S>, policy: SharingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &SharingPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a resource owned by `creator`.
    pub fn create(
        &self,
        resource: ResourceRef,
        metadata: ResourceMetadata,
        creator: &PrincipalIdentity,
    ) -> Result<ResourceRecord, ControllerError> {
        if creator.principal_id.trim().is_empty() {
            return Err(ControllerError::InvalidPrincipal(
                "creator principal id is blank".to_string(),
            ));
        }

        let sharing = ResourceSharingState::with_owner(creator.principal_id.clone());
        let record = self.store.create(resource, metadata, sharing)?;

        tracing::info!(resource = %record.resource, creator = %creator, "resource created");
        Ok(record)
    }

    /// Read a resource along with the caller's role and capabilities.
    pub fn get(
        &self,
        resource: &ResourceRef,
        identity: &PrincipalIdentity,
        now: Timestamp,
    ) -> Result<ResourceView, ControllerError> {
        let (record, resolution) = self.load_authorized(resource, identity, now, Capability::ViewResource)?;
        Ok(ResourceView { record, resolution })
    }

    /// Change display name / description. Requires `EditMetadata`.
    pub fn update_metadata(
        &self,
        resource: &ResourceRef,
        identity: &PrincipalIdentity,
        metadata: ResourceMetadata,
        expected: ExpectedRevision,
        now: Timestamp,
    ) -> Result<ResourceRecord, ControllerError> {
        let (current, _) = self.load_authorized(resource, identity, now, Capability::EditMetadata)?;

        let record = self
            .store
            .update_metadata(resource, metadata, pin(expected, current.revision))?;

        tracing::info!(resource = %resource, principal = %identity, revision = record.revision, "metadata updated");
        Ok(record)
    }

    /// Replace both grant lists. Requires `EditSharing`.
    ///
    /// Each list goes through the configured [`SharingPolicy`] before the
    /// store sees it.
    pub fn update_sharing(
        &self,
        resource: &ResourceRef,
        identity: &PrincipalIdentity,
        user_grants: Vec<Grant>,
        group_grants: Vec<Grant>,
        expected: ExpectedRevision,
        now: Timestamp,
    ) -> Result<ResourceRecord, ControllerError> {
        let (current, _) = self.load_authorized(resource, identity, now, Capability::EditSharing)?;

        let submitted = user_grants.len() + group_grants.len();
        let sharing = ResourceSharingState {
            user_grants: self.policy.prepare(user_grants)?,
            group_grants: self.policy.prepare(group_grants)?,
        };
        let kept = sharing.user_grants.len() + sharing.group_grants.len();

        let record = self
            .store
            .replace_sharing(resource, sharing, pin(expected, current.revision))?;

        tracing::info!(
            resource = %resource,
            principal = %identity,
            revision = record.revision,
            user_grants = record.sharing.user_grants.len(),
            group_grants = record.sharing.group_grants.len(),
            dropped = submitted - kept,
            "sharing updated"
        );
        Ok(record)
    }

    /// Delete a resource and its sharing state. Requires `DeleteResource`.
    pub fn delete(
        &self,
        resource: &ResourceRef,
        identity: &PrincipalIdentity,
        expected: ExpectedRevision,
        now: Timestamp,
    ) -> Result<(), ControllerError> {
        let (current, _) = self.load_authorized(resource, identity, now, Capability::DeleteResource)?;

        self.store.delete(resource, pin(expected, current.revision))?;

        tracing::info!(resource = %resource, principal = %identity, "resource deleted");
        Ok(())
    }

    /// Audit view of a decision; does not itself require any capability.
    pub fn explain(
        &self,
        resource: &ResourceRef,
        identity: &PrincipalIdentity,
        capability: Capability,
        now: Timestamp,
    ) -> Result<AuthorizationExplanation, ControllerError> {
        let record = self.store.get(resource)?;
        Ok(explain_authorization(
            &record.sharing.user_grants,
            &record.sharing.group_grants,
            identity,
            now,
            capability,
        ))
    }

    fn load_authorized(
        &self,
        resource: &ResourceRef,
        identity: &PrincipalIdentity,
        now: Timestamp,
        capability: Capability,
    ) -> Result<(ResourceRecord, Resolution), ControllerError> {
        let record = self.store.get(resource)?;
        let resolution = record.sharing.resolve(identity, now);

        if let Err(source) = authorize(resolution.role, capability) {
            tracing::warn!(
                resource = %resource,
                principal = %identity,
                role = %resolution.role,
                capability = %capability,
                "permission denied"
            );
            return Err(ControllerError::Forbidden {
                resource: resource.clone(),
                source,
            });
        }

        Ok((record, resolution))
    }
}

/// Writes are checked against the revision authorization was decided on.
fn pin(expected: ExpectedRevision, read: u64) -> ExpectedRevision {
    match expected {
        ExpectedRevision::Any => ExpectedRevision::Exact(read),
        exact => exact,
    }
}

#[cfg(test)]
mod tests {
    use console_auth::Role;

    use super::*;
    use crate::store::InMemoryGrantStore;

    fn ts(s: i64) -> Timestamp {
        Timestamp::from_unix(s)
    }

    fn alice() -> PrincipalIdentity {
        PrincipalIdentity::new("alice@x.com")
    }

    fn setup() -> (ResourceController<InMemoryGrantStore>, ResourceRef) {
        let controller = ResourceController::new(Arc::new(InMemoryGrantStore::new()), SharingPolicy::default());
        let secret = ResourceRef::secret("db-creds").unwrap();
        controller
            .create(secret.clone(), ResourceMetadata::new("DB creds", ""), &alice())
            .unwrap();
        (controller, secret)
    }

    #[test]
    fn blank_creator_is_rejected() {
        let controller = ResourceController::new(Arc::new(InMemoryGrantStore::new()), SharingPolicy::default());
        let err = controller
            .create(
                ResourceRef::organization("acme").unwrap(),
                ResourceMetadata::default(),
                &PrincipalIdentity::new(" "),
            )
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidPrincipal(_)));
    }

    #[test]
    fn stranger_is_forbidden() {
        let (controller, secret) = setup();
        let err = controller
            .get(&secret, &PrincipalIdentity::new("mallory@x.com"), ts(0))
            .unwrap_err();
        assert_eq!(
            err,
            ControllerError::Forbidden {
                resource: secret,
                source: AuthzError::Forbidden {
                    capability: Capability::ViewResource,
                    role: Role::None
                }
            }
        );
    }

    #[test]
    fn missing_resource_is_not_found() {
        let (controller, _) = setup();
        let other = ResourceRef::secret("nope").unwrap();
        assert_eq!(
            controller.get(&other, &alice(), ts(0)).unwrap_err(),
            ControllerError::NotFound(other)
        );
    }

    #[test]
    fn invalid_grants_are_rejected_before_write() {
        let (controller, secret) = setup();
        let bad = vec![Grant::new("bob@x.com", Role::Viewer).not_before(ts(10)).expires(ts(5))];
        let err = controller
            .update_sharing(&secret, &alice(), bad, vec![], ExpectedRevision::Any, ts(0))
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidGrants(GrantValidationError::InvalidWindow { .. })));
        assert_eq!(controller.store().get(&secret).unwrap().revision, 1);
    }

    #[test]
    fn view_serializes_role_and_capabilities_inline() {
        let (controller, secret) = setup();
        let view = controller.get(&secret, &alice(), ts(0)).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["role"], 3);
        assert_eq!(json["capabilities"]["canEditSharing"], true);
        assert_eq!(json["record"]["metadata"]["displayName"], "DB creds");
    }
}
