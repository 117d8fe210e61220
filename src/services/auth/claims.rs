use std::sync::Arc;

use serde_json::{Map, Value};

/// Claims of a verified token.
///
/// Read-only and cheap to clone; the map is shared, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet(Arc<Map<String, Value>>);

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(Arc::new(claims))
    }

    /// `None` unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::new(map)),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// String claim, or the first string of an array claim (`aud` style).
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::String(s) => Some(s),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    /// Numeric date claim (`exp`, `nbf`, `iat`) in whole seconds.
    pub fn timestamp(&self, name: &str) -> Option<i64> {
        let value = self.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs as i64))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_objects_are_claim_sets() {
        assert!(ClaimSet::from_value(json!({"sub": "u"})).is_some());
        assert!(ClaimSet::from_value(json!(["sub"])).is_none());
    }

    #[test]
    fn string_reads_plain_and_array_values() {
        let claims = ClaimSet::from_value(json!({
            "sub": "user",
            "aud": ["client", "other"],
            "n": 1
        }))
        .unwrap();

        assert_eq!(claims.string("sub"), Some("user"));
        assert_eq!(claims.string("aud"), Some("client"));
        assert_eq!(claims.string("n"), None);
        assert_eq!(claims.string("missing"), None);
    }

    #[test]
    fn timestamp_accepts_integers_and_floats() {
        let claims = ClaimSet::from_value(json!({"exp": 10, "nbf": 5.9, "iat": "x"})).unwrap();

        assert_eq!(claims.timestamp("exp"), Some(10));
        assert_eq!(claims.timestamp("nbf"), Some(5));
        assert_eq!(claims.timestamp("iat"), None);
    }
}
