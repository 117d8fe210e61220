//! Claim → role derivation.

use serde_json::Value;

use super::claims::ClaimSet;

pub const DEFAULT_ROLE_PREFIX: &str = "ROLE_";

pub trait RoleMapper: Send + Sync {
    /// Normalised, de-duplicated roles found in `claim`, in order of first appearance.
    /// Absent or oddly shaped claims yield an empty list.
    fn roles(&self, claims: &ClaimSet, claim: &str) -> Vec<String>;

    /// Normalised form of a bare role name (`admin` → `ROLE_ADMIN`), so callers
    /// can compare against [`roles`](Self::roles) without knowing the prefix.
    fn role(&self, name: &str) -> Option<String> {
        normalize_role(name, DEFAULT_ROLE_PREFIX)
    }
}

/// Upper-cases role values, turns `.` into `_` and adds the prefix once.
///
/// The prefix is stored upper-cased, since roles always are.
#[derive(Debug, Clone)]
pub struct ClaimRoleMapper {
    prefix: String,
}

impl Default for ClaimRoleMapper {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_PREFIX)
    }
}

impl ClaimRoleMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_uppercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl RoleMapper for ClaimRoleMapper {
    fn roles(&self, claims: &ClaimSet, claim: &str) -> Vec<String> {
        let mut roles: Vec<String> = Vec::new();

        for raw in raw_values(claims.get(claim)) {
            let Some(role) = normalize_role(&raw, &self.prefix) else {
                continue;
            };

            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        roles
    }

    fn role(&self, name: &str) -> Option<String> {
        normalize_role(name, &self.prefix)
    }
}

/// `None` for empty or whitespace-only input.
///
/// `prefix` is matched and prepended upper-cased.
pub fn normalize_role(raw: &str, prefix: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let prefix = prefix.to_uppercase();
    let role = raw.to_uppercase().replace('.', "_");
    if role.starts_with(&prefix) {
        Some(role)
    } else {
        Some(format!("{prefix}{role}"))
    }
}

// Arrays are taken element-wise; a plain string is a space-separated list
// (OAuth2 `scope` style).
fn raw_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_owned).collect(),
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
