use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identity of the requesting principal for sharing decisions.
///
/// `principal_id` is matched against user grants (email or subject) and each
/// entry in `groups` against group grants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrincipalIdentity {
    pub principal_id: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl PrincipalIdentity {
    pub fn new(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            groups: BTreeSet::new(),
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

impl core::fmt::Display for PrincipalIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.principal_id)
    }
}
