use serde::{Deserialize, Serialize};

use crate::Role;

/// An operation on a shared resource that a role may unlock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewResource,
    EditMetadata,
    DeleteResource,
    EditSharing,
}

/// Minimum role for each capability.
///
/// Every gate (UI affordances and server-side checks alike) reads this table;
/// nothing else compares roles for access decisions.
const CAPABILITY_TABLE: [(Capability, Role); 4] = [
    (Capability::ViewResource, Role::Viewer),
    (Capability::EditMetadata, Role::Editor),
    (Capability::DeleteResource, Role::Owner),
    (Capability::EditSharing, Role::Owner),
];

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ViewResource,
        Capability::EditMetadata,
        Capability::DeleteResource,
        Capability::EditSharing,
    ];

    pub fn minimum_role(self) -> Role {
        CAPABILITY_TABLE
            .iter()
            .find(|(cap, _)| *cap == self)
            .map(|(_, role)| *role)
            .unwrap_or(Role::Owner)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ViewResource => "view_resource",
            Capability::EditMetadata => "edit_metadata",
            Capability::DeleteResource => "delete_resource",
            Capability::EditSharing => "edit_sharing",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operations a role unlocks.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    pub can_view_resource: bool,
    pub can_edit_metadata: bool,
    pub can_delete_resource: bool,
    pub can_edit_sharing: bool,
}

impl CapabilitySet {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewResource => self.can_view_resource,
            Capability::EditMetadata => self.can_edit_metadata,
            Capability::DeleteResource => self.can_delete_resource,
            Capability::EditSharing => self.can_edit_sharing,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }
}

/// Derive the capability set for a role.
pub fn capabilities(role: Role) -> CapabilitySet {
    let has = |cap: Capability| role.at_least(cap.minimum_role());
    CapabilitySet {
        can_view_resource: has(Capability::ViewResource),
        can_edit_metadata: has(Capability::EditMetadata),
        can_delete_resource: has(Capability::DeleteResource),
        can_edit_sharing: has(Capability::EditSharing),
    }
}
