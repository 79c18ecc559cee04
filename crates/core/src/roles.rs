//! Well-known role keys and role resolution.
//!
//! The constants must match the seed data in the roles migration.
//! Business logic never compares raw role strings: a role key is resolved
//! once per request into a [`RoleKey`] and passed around from there.

use serde::Serialize;

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SELLER: &str = "seller";
pub const ROLE_CUSTOMER: &str = "customer";

/// An opaque, resolved role identifier.
///
/// Only [`resolve_role`] constructs one, so holding a `RoleKey` means the
/// role exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoleKey(String);

impl RoleKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve `requested` against the set of known role keys.
///
/// Matching is exact (case-sensitive). Returns [`CoreError::RoleNotFound`]
/// when the key is not in `known`.
pub fn resolve_role<'a, I>(requested: &str, known: I) -> Result<RoleKey, CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    known
        .into_iter()
        .find(|k| *k == requested)
        .map(|k| RoleKey(k.to_string()))
        .ok_or_else(|| CoreError::RoleNotFound(requested.to_string()))
}
