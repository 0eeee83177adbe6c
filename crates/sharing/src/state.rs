//! Per-resource sharing state and stored records.

use serde::{Deserialize, Serialize};

use console_auth::{Grant, PrincipalIdentity, Resolution, Role, resolve};
use console_core::{ResourceRef, Timestamp};

/// The two grant lists attached to one resource.
///
/// The same shape serves organizations, projects and secrets. Secrets were
/// historically written with `roleGrants` for the group list; that name is
/// accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSharingState {
    #[serde(default)]
    pub user_grants: Vec<Grant>,
    #[serde(default, alias = "roleGrants")]
    pub group_grants: Vec<Grant>,
}

impl ResourceSharingState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Initial state at creation time: the creator owns the resource.
    pub fn with_owner(principal: impl Into<String>) -> Self {
        Self {
            user_grants: vec![Grant::new(principal, Role::Owner)],
            group_grants: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_grants.is_empty() && self.group_grants.is_empty()
    }

    pub fn effective_role(&self, identity: &PrincipalIdentity, now: Timestamp) -> Role {
        self.resolve(identity, now).role
    }

    pub fn resolve(&self, identity: &PrincipalIdentity, now: Timestamp) -> Resolution {
        resolve(&self.user_grants, &self.group_grants, identity, now)
    }
}

/// Display metadata editors may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl ResourceMetadata {
    pub fn new(display_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: description.into(),
        }
    }
}

/// A stored resource: identity, metadata, sharing and its revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub resource: ResourceRef,
    pub metadata: ResourceMetadata,
    pub sharing: ResourceSharingState,
    /// Bumped by the store on every write; 1 after creation.
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_becomes_owner() {
        let state = ResourceSharingState::with_owner("alice@x.com");
        let alice = PrincipalIdentity::new("alice@x.com");
        assert_eq!(state.effective_role(&alice, Timestamp::from_unix(0)), Role::Owner);
        assert!(state.group_grants.is_empty());
    }

    #[test]
    fn accepts_role_grants_alias() {
        let state: ResourceSharingState = serde_json::from_str(
            r#"{"userGrants":[{"principal":"a@x.com","role":3}],"roleGrants":[{"principal":"ops","role":1}]}"#,
        )
        .unwrap();
        assert_eq!(state.group_grants, vec![Grant::new("ops", Role::Viewer)]);

        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("groupGrants").is_some());
        assert!(json.get("roleGrants").is_none());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let state: ResourceSharingState = serde_json::from_str("{}").unwrap();
        assert!(state.is_empty());
    }
}
