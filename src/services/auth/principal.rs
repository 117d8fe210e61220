//! The authenticated identity built from a verified claim set.

use std::{fmt, sync::Arc, sync::OnceLock};

use serde_json::Value;

use super::claims::ClaimSet;
use super::roles::RoleMapper;

/// Identity of the caller for the lifetime of one request.
///
/// - `roles()` is computed on first use and then reused; the claim set never
///   changes underneath it.
/// - Two principals are equal when their usernames (`sub`) are equal.
#[derive(Clone)]
pub struct Principal {
    claims: ClaimSet,
    roles_claim: Arc<str>,
    mapper: Arc<dyn RoleMapper>,
    roles: OnceLock<Vec<String>>,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username())
            .field("roles_claim", &self.roles_claim)
            .field("roles", &self.roles.get())
            .finish()
    }
}

impl PartialEq for Principal {
    fn eq(&self, other: &Self) -> bool {
        self.username() == other.username()
    }
}

impl Principal {
    pub fn new(
        claims: ClaimSet,
        roles_claim: impl Into<Arc<str>>,
        mapper: Arc<dyn RoleMapper>,
    ) -> Self {
        Self {
            claims,
            roles_claim: roles_claim.into(),
            mapper,
            roles: OnceLock::new(),
        }
    }

    /// `sub`, or `""` when the token has no subject.
    pub fn username(&self) -> &str {
        self.claims.string("sub").unwrap_or_default()
    }

    /// Client application the token was issued to (`aud`).
    pub fn application(&self) -> &str {
        self.claims.string("aud").unwrap_or_default()
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn roles(&self) -> &[String] {
        self.roles
            .get_or_init(|| self.mapper.roles(&self.claims, &self.roles_claim))
            .as_slice()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }

    /// Like [`has_role`](Self::has_role), but takes a bare name (`admin`) and
    /// applies the mapper's prefix.
    pub fn has_named_role(&self, name: &str) -> bool {
        self.mapper
            .role(name)
            .is_some_and(|role| self.has_role(&role))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::services::auth::roles::ClaimRoleMapper;
    use serde_json::json;

    struct CountingMapper {
        calls: AtomicUsize,
        inner: ClaimRoleMapper,
    }

    impl RoleMapper for CountingMapper {
        fn roles(&self, claims: &ClaimSet, claim: &str) -> Vec<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.roles(claims, claim)
        }

        fn role(&self, name: &str) -> Option<String> {
            self.inner.role(name)
        }
    }

    fn claims() -> ClaimSet {
        ClaimSet::from_value(json!({
            "sub": "user",
            "aud": "client",
            "scopes": ["admin", "orders.read", "admin"],
        }))
        .unwrap()
    }

    #[test]
    fn exposes_subject_audience_and_claims() {
        let principal = Principal::new(claims(), "scopes", Arc::new(ClaimRoleMapper::default()));

        assert_eq!(principal.username(), "user");
        assert_eq!(principal.application(), "client");
        assert_eq!(principal.claim("sub"), Some(&json!("user")));
        assert!(principal.claim("missing").is_none());
    }

    #[test]
    fn missing_subject_is_empty_username() {
        let claims = ClaimSet::from_value(json!({"aud": "client"})).unwrap();
        let principal = Principal::new(claims, "scopes", Arc::new(ClaimRoleMapper::default()));

        assert_eq!(principal.username(), "");
    }

    #[test]
    fn roles_come_from_the_configured_claim() {
        let principal = Principal::new(claims(), "scopes", Arc::new(ClaimRoleMapper::default()));

        assert_eq!(principal.roles(), ["ROLE_ADMIN", "ROLE_ORDERS_READ"]);
        assert!(principal.has_role("ROLE_ADMIN"));
        assert!(!principal.has_role("ADMIN"));
    }

    #[test]
    fn named_roles_follow_the_mapper_prefix() {
        let mapper = Arc::new(ClaimRoleMapper::new("SCOPE_"));
        let principal = Principal::new(claims(), "scopes", mapper);

        assert_eq!(principal.roles(), ["SCOPE_ADMIN", "SCOPE_ORDERS_READ"]);
        assert!(principal.has_named_role("admin"));
        assert!(principal.has_named_role("orders.read"));
        assert!(!principal.has_named_role("user"));
        assert!(!principal.has_role("ROLE_ADMIN"));
    }

    #[test]
    fn roles_are_computed_once() {
        let mapper = Arc::new(CountingMapper {
            calls: AtomicUsize::new(0),
            inner: ClaimRoleMapper::default(),
        });
        let principal = Principal::new(claims(), "scopes", mapper.clone());

        let first = principal.roles().to_vec();
        let second = principal.roles().to_vec();

        assert_eq!(first, second);
        assert_eq!(mapper.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn roles_are_computed_once_across_threads() {
        let mapper = Arc::new(CountingMapper {
            calls: AtomicUsize::new(0),
            inner: ClaimRoleMapper::default(),
        });
        let principal = Principal::new(claims(), "scopes", mapper.clone());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert_eq!(principal.roles().len(), 2));
            }
        });

        assert_eq!(mapper.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn principals_with_same_subject_are_equal() {
        let mapper: Arc<dyn RoleMapper> = Arc::new(ClaimRoleMapper::default());
        let other = ClaimSet::from_value(json!({"sub": "user", "scopes": []})).unwrap();
        let stranger = ClaimSet::from_value(json!({"sub": "someone"})).unwrap();

        let a = Principal::new(claims(), "scopes", mapper.clone());
        let b = Principal::new(other, "scopes", mapper.clone());
        let c = Principal::new(stranger, "scopes", mapper);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
