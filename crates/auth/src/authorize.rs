use serde::Serialize;
use thiserror::Error;

use console_core::Timestamp;

use crate::{
    Capability, CapabilitySet, Grant, GrantSource, PrincipalIdentity, Role, WindowState,
    applicable_grants, capabilities, effective_role,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' does not allow '{capability}'")]
    Forbidden { capability: Capability, role: Role },
}

/// Authorize an operation for an already resolved role.
///
/// - No IO
/// - No panics
/// - Decided by the capability table only
pub fn authorize(role: Role, capability: Capability) -> Result<(), AuthzError> {
    if capabilities(role).allows(capability) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { capability, role })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// This structure provides transparent, debuggable information about why
/// a request was allowed or denied.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The capability that was being checked.
    pub capability: Capability,

    /// Whether the capability was granted.
    pub granted: bool,

    /// Effective role at the evaluated instant.
    pub effective_role: Role,

    /// Minimum role the capability requires.
    pub required_role: Role,

    /// Full capability set of the effective role.
    pub capabilities: CapabilitySet,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Grants naming the principal that were active at `evaluated_at`.
    pub active_grants: Vec<GrantMatch>,

    /// Grants naming the principal that were outside their window.
    pub inactive_grants: Vec<GrantMatch>,

    pub principal_id: String,
    pub evaluated_at: Timestamp,
}

/// One grant that names the principal, with how and whether it applied.
#[derive(Debug, Clone, Serialize)]
pub struct GrantMatch {
    pub source: GrantSource,
    pub grant: Grant,
    pub window: WindowState,
}

/// Explain why a capability is (or would be) granted.
///
/// Answers "why was this request allowed/denied?" for audit and debugging.
/// The decision always equals `authorize(effective_role(..), capability)`.
pub fn explain_authorization(
    user_grants: &[Grant],
    group_grants: &[Grant],
    identity: &PrincipalIdentity,
    now: Timestamp,
    capability: Capability,
) -> AuthorizationExplanation {
    let (active_grants, inactive_grants): (Vec<GrantMatch>, Vec<GrantMatch>) =
        applicable_grants(user_grants, group_grants, identity)
            .map(|(source, grant)| GrantMatch {
                source,
                grant: grant.clone(),
                window: grant.window_state(now),
            })
            .partition(|m| m.window == WindowState::Active);

    let role = effective_role(user_grants, group_grants, identity, now);
    let required_role = capability.minimum_role();
    let granted = authorize(role, capability).is_ok();

    let reason = if granted {
        // The winning grant is any active one at the effective role.
        match active_grants.iter().find(|m| m.grant.role == role) {
            Some(m) => format!(
                "{} grant for '{}' gives role {} which allows {}",
                source_label(m.source),
                m.grant.principal,
                role,
                capability
            ),
            None => format!("role {role} allows {capability}"),
        }
    } else if active_grants.is_empty() && inactive_grants.is_empty() {
        format!("no grant names '{}' or any of its groups", identity.principal_id)
    } else if active_grants.is_empty() {
        format!(
            "all {} grant(s) naming '{}' are outside their validity window",
            inactive_grants.len(),
            identity.principal_id
        )
    } else {
        format!("effective role {role} is below {required_role}, required for {capability}")
    };

    AuthorizationExplanation {
        capability,
        granted,
        effective_role: role,
        required_role,
        capabilities: capabilities(role),
        reason,
        active_grants,
        inactive_grants,
        principal_id: identity.principal_id.clone(),
        evaluated_at: now,
    }
}

fn source_label(source: GrantSource) -> &'static str {
    match source {
        GrantSource::Direct => "direct",
        GrantSource::Group => "group",
    }
}
