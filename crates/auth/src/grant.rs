//! Grants: one principal's time-bounded role on one resource.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use console_core::Timestamp;

use crate::Role;

/// An access-control entry binding a principal to a role.
///
/// Whether `principal` names a user or a group is decided by which list the
/// grant lives in, not by the grant itself.
///
/// Wire shape: `{principal: string, role: int, nbf?: int64, exp?: int64}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub principal: String,
    #[serde(default)]
    pub role: Role,
    /// Not-before: inactive before this instant (inclusive lower bound).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<Timestamp>,
    /// Expiry: inactive at or after this instant (exclusive upper bound).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<Timestamp>,
}

/// Where `now` falls relative to a grant's validity window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    NotYetValid,
    Active,
    Expired,
}

impl Grant {
    pub fn new(principal: impl Into<String>, role: Role) -> Self {
        Self {
            principal: principal.into(),
            role,
            nbf: None,
            exp: None,
        }
    }

    pub fn not_before(mut self, nbf: Timestamp) -> Self {
        self.nbf = Some(nbf);
        self
    }

    pub fn expires(mut self, exp: Timestamp) -> Self {
        self.exp = Some(exp);
        self
    }

    /// True when the principal is empty after trimming whitespace.
    pub fn has_blank_principal(&self) -> bool {
        self.principal.trim().is_empty()
    }

    /// Locate `now` in the half-open window `[nbf, exp)`.
    ///
    /// A malformed window (`nbf > exp`) is never active: every instant is
    /// either before `nbf` or at/after `exp`.
    pub fn window_state(&self, now: Timestamp) -> WindowState {
        if self.nbf.is_some_and(|nbf| now < nbf) {
            return WindowState::NotYetValid;
        }
        if self.exp.is_some_and(|exp| now >= exp) {
            return WindowState::Expired;
        }
        WindowState::Active
    }

    pub fn is_active(&self, now: Timestamp) -> bool {
        self.window_state(now) == WindowState::Active
    }

    /// `nbf <= exp` whenever both are set.
    pub fn has_valid_window(&self) -> bool {
        match (self.nbf, self.exp) {
            (Some(nbf), Some(exp)) => nbf <= exp,
            _ => true,
        }
    }
}

/// Temporal validity check (`nbf <= now < exp`, absent bounds are open).
pub fn is_active(grant: &Grant, now: Timestamp) -> bool {
    grant.is_active(now)
}

/// Save-time cleanup of an edited grant list.
///
/// Drops rows whose principal is blank after trimming and keeps everything
/// else verbatim, in input order. Idempotent.
pub fn normalize(raw: impl IntoIterator<Item = Grant>) -> Vec<Grant> {
    let mut dropped = 0usize;
    let grants: Vec<Grant> = raw
        .into_iter()
        .filter(|g| {
            let keep = !g.has_blank_principal();
            if !keep {
                dropped += 1;
            }
            keep
        })
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, kept = grants.len(), "dropped grants with blank principals");
    }

    grants
}

/// Merge rows that differ only in role.
///
/// Rows with the same principal and the same `(nbf, exp)` window collapse
/// into the first such row, carrying the highest role among them. Rows whose
/// windows differ are kept apart since merging them would change access over
/// time. Stable and idempotent.
pub fn collapse_duplicates(grants: impl IntoIterator<Item = Grant>) -> Vec<Grant> {
    let mut out: Vec<Grant> = Vec::new();
    let mut index: HashMap<(String, Option<Timestamp>, Option<Timestamp>), usize> = HashMap::new();

    for grant in grants {
        let key = (grant.principal.clone(), grant.nbf, grant.exp);
        match index.get(&key) {
            Some(&pos) => {
                let kept = &mut out[pos];
                kept.role = kept.role.max(grant.role);
            }
            None => {
                index.insert(key, out.len());
                out.push(grant);
            }
        }
    }

    out
}

/// Which write-time checks to enforce.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Reject grants whose `nbf` is after `exp`.
    pub reject_invalid_windows: bool,
    /// Reject grants whose role is `None` (a row that grants nothing).
    pub reject_none_roles: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            reject_invalid_windows: true,
            reject_none_roles: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrantValidationError {
    #[error("grant for '{principal}' has nbf {nbf} after exp {exp}")]
    InvalidWindow {
        principal: String,
        nbf: Timestamp,
        exp: Timestamp,
    },

    #[error("grant for '{principal}' has no role")]
    NoneRole { principal: String },
}

/// Write-time validation of an already normalized list.
pub fn validate_grants(grants: &[Grant], rules: &ValidationRules) -> Result<(), GrantValidationError> {
    for grant in grants {
        if rules.reject_invalid_windows && !grant.has_valid_window() {
            if let (Some(nbf), Some(exp)) = (grant.nbf, grant.exp) {
                return Err(GrantValidationError::InvalidWindow {
                    principal: grant.principal.clone(),
                    nbf,
                    exp,
                });
            }
        }
        if rules.reject_none_roles && grant.role == Role::None {
            return Err(GrantValidationError::NoneRole {
                principal: grant.principal.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: i64) -> Timestamp {
        Timestamp::from_unix(s)
    }

    #[test]
    fn unbounded_grant_is_always_active() {
        let g = Grant::new("a", Role::Viewer);
        for t in [i64::MIN, -1, 0, 1_700_000_000, i64::MAX] {
            assert!(is_active(&g, ts(t)));
        }
    }

    #[test]
    fn expiry_is_exclusive() {
        let g = Grant::new("a", Role::Editor).expires(ts(1000));
        assert!(g.is_active(ts(999)));
        assert!(!g.is_active(ts(1000)));
        assert_eq!(g.window_state(ts(1000)), WindowState::Expired);
    }

    #[test]
    fn not_before_is_inclusive() {
        let g = Grant::new("a", Role::Editor).not_before(ts(500));
        assert_eq!(g.window_state(ts(499)), WindowState::NotYetValid);
        assert!(g.is_active(ts(500)));
    }

    #[test]
    fn inverted_window_is_never_active() {
        let g = Grant::new("a", Role::Owner).not_before(ts(200)).expires(ts(100));
        assert!(!g.has_valid_window());
        for t in [0, 99, 100, 150, 199, 200, 10_000] {
            assert!(!g.is_active(ts(t)), "active at {t}");
        }
    }

    #[test]
    fn empty_window_is_never_active() {
        let g = Grant::new("a", Role::Owner).not_before(ts(100)).expires(ts(100));
        assert!(g.has_valid_window());
        assert!(!g.is_active(ts(100)));
    }

    #[test]
    fn normalize_drops_blank_principals_only() {
        let raw = vec![
            Grant::new("  ", Role::Owner),
            Grant::new("bob@x.com", Role::Viewer).expires(ts(9)),
            Grant::new("", Role::Editor),
            Grant::new("\t\n", Role::Viewer),
            Grant::new("alice@x.com", Role::Owner),
        ];
        let out = normalize(raw);
        assert_eq!(
            out,
            vec![
                Grant::new("bob@x.com", Role::Viewer).expires(ts(9)),
                Grant::new("alice@x.com", Role::Owner),
            ]
        );
        assert_eq!(normalize(out.clone()), out);
    }

    #[test]
    fn normalize_keeps_duplicates_and_principal_text() {
        let raw = vec![
            Grant::new(" padded ", Role::Viewer),
            Grant::new(" padded ", Role::Viewer),
        ];
        assert_eq!(normalize(raw.clone()), raw);
    }

    #[test]
    fn collapse_merges_same_window_rows() {
        let raw = vec![
            Grant::new("a", Role::Viewer),
            Grant::new("b", Role::Editor),
            Grant::new("a", Role::Owner),
            Grant::new("a", Role::Editor).expires(ts(10)),
        ];
        let out = collapse_duplicates(raw);
        assert_eq!(
            out,
            vec![
                Grant::new("a", Role::Owner),
                Grant::new("b", Role::Editor),
                Grant::new("a", Role::Editor).expires(ts(10)),
            ]
        );
        assert_eq!(collapse_duplicates(out.clone()), out);
    }

    #[test]
    fn validation_rejects_inverted_windows_and_none_roles() {
        let rules = ValidationRules::default();

        let inverted = [Grant::new("a", Role::Viewer).not_before(ts(5)).expires(ts(4))];
        assert!(matches!(
            validate_grants(&inverted, &rules),
            Err(GrantValidationError::InvalidWindow { .. })
        ));

        let none = [Grant::new("a", Role::None)];
        assert_eq!(
            validate_grants(&none, &rules),
            Err(GrantValidationError::NoneRole { principal: "a".into() })
        );

        let permissive = ValidationRules {
            reject_invalid_windows: false,
            reject_none_roles: false,
        };
        assert!(validate_grants(&inverted, &permissive).is_ok());
        assert!(validate_grants(&none, &permissive).is_ok());
    }

    #[test]
    fn validation_agrees_with_window_check() {
        let rules = ValidationRules::default();
        let grants = [
            Grant::new("a", Role::Viewer).not_before(ts(7)).expires(ts(7)),
            Grant::new("b", Role::Viewer).not_before(ts(7)),
            Grant::new("c", Role::Viewer).expires(ts(7)),
            Grant::new("d", Role::Viewer).not_before(ts(8)).expires(ts(7)),
        ];
        for grant in grants {
            let validated = validate_grants(std::slice::from_ref(&grant), &rules).is_ok();
            assert_eq!(validated, grant.has_valid_window(), "{grant:?}");
        }
    }

    #[test]
    fn wire_shape_round_trips() {
        let g = Grant::new("dev-team", Role::Editor).not_before(ts(10)).expires(ts(20));
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"principal": "dev-team", "role": 2, "nbf": 10, "exp": 20})
        );

        let bare: Grant = serde_json::from_str(r#"{"principal":"p","role":3}"#).unwrap();
        assert_eq!(bare, Grant::new("p", Role::Owner));
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#"{"principal":"p","role":3}"#);
    }

    #[test]
    fn garbage_role_decodes_as_none() {
        let g: Grant = serde_json::from_str(r#"{"principal":"p","role":12}"#).unwrap();
        assert_eq!(g.role, Role::None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_grant() -> impl Strategy<Value = Grant> {
            (
                prop_oneof![Just(String::new()), Just("  ".to_string()), "[a-c ]{0,3}"],
                0i32..5,
                proptest::option::of(-5i64..5),
                proptest::option::of(-5i64..5),
            )
                .prop_map(|(principal, role, nbf, exp)| Grant {
                    principal,
                    role: Role::from_ordinal(role),
                    nbf: nbf.map(Timestamp::from_unix),
                    exp: exp.map(Timestamp::from_unix),
                })
        }

        proptest! {
            #[test]
            fn normalize_is_idempotent(gs in proptest::collection::vec(arb_grant(), 0..12)) {
                let once = normalize(gs);
                prop_assert_eq!(normalize(once.clone()), once);
            }

            #[test]
            fn normalize_is_an_order_preserving_filter(gs in proptest::collection::vec(arb_grant(), 0..12)) {
                let expected: Vec<Grant> = gs.iter().filter(|g| !g.principal.trim().is_empty()).cloned().collect();
                prop_assert_eq!(normalize(gs), expected);
            }

            #[test]
            fn collapse_is_idempotent(gs in proptest::collection::vec(arb_grant(), 0..12)) {
                let once = collapse_duplicates(gs);
                prop_assert_eq!(collapse_duplicates(once.clone()), once);
            }

            #[test]
            fn activity_matches_half_open_window(g in arb_grant(), now in -6i64..6) {
                let now = Timestamp::from_unix(now);
                let expected = g.nbf.is_none_or(|nbf| now >= nbf) && g.exp.is_none_or(|exp| now < exp);
                prop_assert_eq!(is_active(&g, now), expected);
            }
        }
    }
}
