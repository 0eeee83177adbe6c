//! Save-time sharing policy, configurable from the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use console_auth::{Grant, GrantValidationError, ValidationRules, collapse_duplicates, normalize, validate_grants};

pub const ENV_REJECT_INVALID_WINDOWS: &str = "CONSOLE_SHARING_REJECT_INVALID_WINDOWS";
pub const ENV_REJECT_NONE_ROLES: &str = "CONSOLE_SHARING_REJECT_NONE_ROLES";
pub const ENV_COLLAPSE_DUPLICATES: &str = "CONSOLE_SHARING_COLLAPSE_DUPLICATES";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' (expected true/false/1/0)")]
    InvalidValue { key: &'static str, value: String },
}

/// How an edited grant list is cleaned and checked before it is stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingPolicy {
    pub reject_invalid_windows: bool,
    pub reject_none_roles: bool,
    pub collapse_duplicates: bool,
}

impl Default for SharingPolicy {
    fn default() -> Self {
        Self {
            reject_invalid_windows: true,
            reject_none_roles: true,
            collapse_duplicates: false,
        }
    }
}

impl SharingPolicy {
    /// Accept any normalized list, matching the historical console behavior.
    pub fn permissive() -> Self {
        Self {
            reject_invalid_windows: false,
            reject_none_roles: false,
            collapse_duplicates: false,
        }
    }

    /// Load from `CONSOLE_SHARING_*` environment variables; unset keys keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            reject_invalid_windows: read_flag(&lookup, ENV_REJECT_INVALID_WINDOWS, defaults.reject_invalid_windows)?,
            reject_none_roles: read_flag(&lookup, ENV_REJECT_NONE_ROLES, defaults.reject_none_roles)?,
            collapse_duplicates: read_flag(&lookup, ENV_COLLAPSE_DUPLICATES, defaults.collapse_duplicates)?,
        })
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            reject_invalid_windows: self.reject_invalid_windows,
            reject_none_roles: self.reject_none_roles,
        }
    }

    /// normalize → (collapse) → (validate).
    pub fn prepare(&self, raw: impl IntoIterator<Item = Grant>) -> Result<Vec<Grant>, GrantValidationError> {
        let mut grants = normalize(raw);
        if self.collapse_duplicates {
            grants = collapse_duplicates(grants);
        }
        validate_grants(&grants, &self.validation_rules())?;
        Ok(grants)
    }
}

fn read_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use console_auth::Role;
    use console_core::Timestamp;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_use_defaults() {
        assert_eq!(SharingPolicy::from_lookup(lookup(&[])).unwrap(), SharingPolicy::default());
    }

    #[test]
    fn parses_flags_case_insensitively() {
        let policy = SharingPolicy::from_lookup(lookup(&[
            (ENV_REJECT_INVALID_WINDOWS, "FALSE"),
            (ENV_REJECT_NONE_ROLES, "0"),
            (ENV_COLLAPSE_DUPLICATES, " True "),
        ]))
        .unwrap();
        assert_eq!(
            policy,
            SharingPolicy {
                reject_invalid_windows: false,
                reject_none_roles: false,
                collapse_duplicates: true,
            }
        );
    }

    #[test]
    fn rejects_garbage_flags() {
        let err = SharingPolicy::from_lookup(lookup(&[(ENV_COLLAPSE_DUPLICATES, "yes")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_COLLAPSE_DUPLICATES,
                value: "yes".to_string()
            }
        );
    }

    #[test]
    fn prepare_normalizes_then_validates() {
        let raw = vec![
            Grant::new(" ", Role::Owner),
            Grant::new("a@x.com", Role::Viewer),
            Grant::new("a@x.com", Role::Editor),
        ];
        assert_eq!(SharingPolicy::default().prepare(raw.clone()).unwrap().len(), 2);

        let collapsing = SharingPolicy {
            collapse_duplicates: true,
            ..SharingPolicy::default()
        };
        assert_eq!(collapsing.prepare(raw).unwrap(), vec![Grant::new("a@x.com", Role::Editor)]);

        let inverted = vec![
            Grant::new("a@x.com", Role::Viewer)
                .not_before(Timestamp::from_unix(9))
                .expires(Timestamp::from_unix(1)),
        ];
        assert!(SharingPolicy::default().prepare(inverted.clone()).is_err());
        assert_eq!(SharingPolicy::permissive().prepare(inverted.clone()).unwrap(), inverted);
    }

    #[test]
    fn deserializes_partial_config() {
        let policy: SharingPolicy = serde_json::from_str(r#"{"collapse_duplicates":true}"#).unwrap();
        assert!(policy.collapse_duplicates);
        assert!(policy.reject_invalid_windows);
    }
}
