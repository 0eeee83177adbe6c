//! Grant lists as Kubernetes object annotations.
//!
//! Each list is stored as a JSON array of `{principal, role, nbf?, exp?}`
//! under its own annotation key. Other annotations on the object are left
//! alone.

use std::collections::BTreeMap;

use thiserror::Error;

use console_auth::{Grant, Role};

use crate::ResourceSharingState;

pub const SHARE_USERS_ANNOTATION: &str = "console.sharing/share-users";
pub const SHARE_GROUPS_ANNOTATION: &str = "console.sharing/share-groups";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("annotation '{key}' is not a valid grant list: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode grant list for '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Encode both lists into annotation values.
pub fn encode_annotations(state: &ResourceSharingState) -> Result<BTreeMap<String, String>, CodecError> {
    let mut out = BTreeMap::new();
    out.insert(
        SHARE_USERS_ANNOTATION.to_string(),
        encode_list(SHARE_USERS_ANNOTATION, &state.user_grants)?,
    );
    out.insert(
        SHARE_GROUPS_ANNOTATION.to_string(),
        encode_list(SHARE_GROUPS_ANNOTATION, &state.group_grants)?,
    );
    Ok(out)
}

/// Decode the sharing state from an object's annotations.
///
/// Missing or blank annotations are empty lists. Role values that are not a
/// known ordinal or name decode as `Role::None` and are logged; the other
/// rows of the list are unaffected.
pub fn decode_annotations(annotations: &BTreeMap<String, String>) -> Result<ResourceSharingState, CodecError> {
    Ok(ResourceSharingState {
        user_grants: decode_list(annotations, SHARE_USERS_ANNOTATION)?,
        group_grants: decode_list(annotations, SHARE_GROUPS_ANNOTATION)?,
    })
}

fn encode_list(key: &'static str, grants: &[Grant]) -> Result<String, CodecError> {
    serde_json::to_string(grants).map_err(|source| CodecError::Encode { key, source })
}

/// Whether a raw `role` value is a known ordinal or name. Anything else is
/// folded into `Role::None` by the decoder. An absent role is the unspecified
/// ordinal, not corruption.
fn is_recognized_role(role: Option<&serde_json::Value>) -> bool {
    match role {
        None => true,
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .and_then(Role::try_from_ordinal)
            .is_some(),
        Some(serde_json::Value::String(name)) => name.parse::<Role>().is_ok(),
        Some(_) => false,
    }
}

fn decode_list(annotations: &BTreeMap<String, String>, key: &'static str) -> Result<Vec<Grant>, CodecError> {
    let Some(raw) = annotations.get(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let grants: Vec<Grant> = serde_json::from_str(raw).map_err(|source| CodecError::Malformed { key, source })?;

    if let Ok(rows) = serde_json::from_str::<Vec<serde_json::Map<String, serde_json::Value>>>(raw) {
        let unknown = rows
            .iter()
            .filter(|row| !is_recognized_role(row.get("role")))
            .count();
        if unknown > 0 {
            tracing::warn!(annotation = key, unknown, "grants with unknown roles decoded as no access");
        }
    }

    Ok(grants)
}
