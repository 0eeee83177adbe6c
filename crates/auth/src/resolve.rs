//! Effective role resolution across direct and group grants.
//!
//! - No IO
//! - No panics
//! - No clock reads (`now` is always a parameter)

use serde::Serialize;

use console_core::Timestamp;

use crate::{CapabilitySet, Grant, PrincipalIdentity, Role, capabilities};

/// How a grant applies to the requesting principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    /// Listed in the user grants under the principal's own id.
    Direct,
    /// Listed in the group grants under a group the principal belongs to.
    Group,
}

/// Grants naming this principal directly or through one of its groups,
/// regardless of their validity window. Blank principals never match.
pub fn applicable_grants<'a>(
    user_grants: &'a [Grant],
    group_grants: &'a [Grant],
    identity: &'a PrincipalIdentity,
) -> impl Iterator<Item = (GrantSource, &'a Grant)> + 'a {
    let direct = user_grants
        .iter()
        .filter(move |g| !g.has_blank_principal() && g.principal == identity.principal_id)
        .map(|g| (GrantSource::Direct, g));

    let via_group = group_grants
        .iter()
        .filter(move |g| !g.has_blank_principal() && identity.is_member_of(&g.principal))
        .map(|g| (GrantSource::Group, g));

    direct.chain(via_group)
}

/// The highest role among all currently active grants that apply to the
/// principal, or `Role::None` when there are none.
///
/// Direct and group grants combine by taking the most permissive active one;
/// a lesser direct grant never masks a greater group grant, and declaration
/// order does not matter.
pub fn effective_role(
    user_grants: &[Grant],
    group_grants: &[Grant],
    identity: &PrincipalIdentity,
    now: Timestamp,
) -> Role {
    applicable_grants(user_grants, group_grants, identity)
        .filter(|(_, g)| g.is_active(now))
        .map(|(_, g)| g.role)
        .max()
        .unwrap_or(Role::None)
}

/// An effective role together with the capabilities it unlocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub role: Role,
    pub capabilities: CapabilitySet,
}

impl Resolution {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            capabilities: capabilities(role),
        }
    }
}

/// Resolve role and capabilities in one step.
pub fn resolve(
    user_grants: &[Grant],
    group_grants: &[Grant],
    identity: &PrincipalIdentity,
    now: Timestamp,
) -> Resolution {
    let role = effective_role(user_grants, group_grants, identity, now);
    tracing::debug!(
        principal = %identity.principal_id,
        groups = identity.groups.len(),
        role = %role,
        now = now.as_unix(),
        "resolved effective role"
    );
    Resolution::for_role(role)
}
