use core::cmp::Ordering;
use core::str::FromStr;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Sharing role granted on a resource.
///
/// A closed, totally ordered set: `None < Viewer < Editor < Owner`. The
/// discriminants are the persisted ordinals (0 = unspecified/none), so the
/// derived `Ord` and the wire encoding agree.
///
/// Decoding is lenient: integers outside `0..=3`, unknown names, `null`,
/// floats and any other shape become [`Role::None`]. A corrupted grant
/// therefore grants nothing instead of failing the whole list.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "i32")]
#[repr(i32)]
pub enum Role {
    #[default]
    None = 0,
    Viewer = 1,
    Editor = 2,
    Owner = 3,
}

impl Role {
    /// All roles, lowest first.
    pub const ALL: [Role; 4] = [Role::None, Role::Viewer, Role::Editor, Role::Owner];

    /// Strict ordinal decoding.
    pub fn try_from_ordinal(ordinal: i32) -> Option<Role> {
        match ordinal {
            0 => Some(Role::None),
            1 => Some(Role::Viewer),
            2 => Some(Role::Editor),
            3 => Some(Role::Owner),
            _ => None,
        }
    }

    /// Lenient ordinal decoding (unknown ordinals fail closed to `None`).
    pub fn from_ordinal(ordinal: i32) -> Role {
        Self::try_from_ordinal(ordinal).unwrap_or(Role::None)
    }

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Three-way comparison on the role order.
    pub fn compare(a: Role, b: Role) -> Ordering {
        a.cmp(&b)
    }

    /// The gating primitive: does `self` meet `required`?
    pub fn at_least(self, required: Role) -> bool {
        self >= required
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::None => "None",
            Role::Viewer => "Viewer",
            Role::Editor => "Editor",
            Role::Owner => "Owner",
        }
    }

    /// Label for a raw ordinal as read from storage; never fails.
    pub fn display_name_for_ordinal(ordinal: i32) -> &'static str {
        match Self::try_from_ordinal(ordinal) {
            Some(role) => role.display_name(),
            None => "Unknown",
        }
    }
}

impl From<i32> for Role {
    fn from(value: i32) -> Self {
        Self::from_ordinal(value)
    }
}

impl From<i64> for Role {
    fn from(value: i64) -> Self {
        i32::try_from(value).map(Self::from_ordinal).unwrap_or(Role::None)
    }
}

impl From<u64> for Role {
    fn from(value: u64) -> Self {
        i32::try_from(value).map(Self::from_ordinal).unwrap_or(Role::None)
    }
}

impl From<Role> for i32 {
    fn from(value: Role) -> Self {
        value.ordinal()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Accepts display names and the `ROLE_*` enum names used on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let name = normalized.strip_prefix("role_").unwrap_or(normalized.as_str());
        match name {
            "none" | "unspecified" => Ok(Role::None),
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "owner" => Ok(Role::Owner),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

struct RoleVisitor;

impl<'de> Visitor<'de> for RoleVisitor {
    type Value = Role;

    fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("a role ordinal or role name")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Role, E> {
        Ok(Role::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Role, E> {
        Ok(Role::from(v))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Role, E> {
        Ok(Role::None)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Role, E> {
        Ok(Role::None)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Role, E> {
        Ok(v.parse().unwrap_or(Role::None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Role, E> {
        Ok(Role::None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Role, E> {
        Ok(Role::None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Role, D::Error> {
        deserializer.deserialize_any(self)
    }

    // Nested values are drained so the surrounding row still decodes.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Role, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Role::None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Role, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Role::None)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RoleVisitor)
    }
}
