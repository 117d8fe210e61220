use std::sync::Arc;

use super::principal::Principal;
use super::roles::RoleMapper;
use super::verifier::{TokenVerifier, VerifyError};

/// Loads principals straight from tokens; there is no user store behind it.
#[derive(Clone)]
pub struct UserProvider {
    verifier: Arc<dyn TokenVerifier>,
    mapper: Arc<dyn RoleMapper>,
    roles_claim: Arc<str>,
}

impl std::fmt::Debug for UserProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserProvider")
            .field("roles_claim", &self.roles_claim)
            .finish_non_exhaustive()
    }
}

impl UserProvider {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        mapper: Arc<dyn RoleMapper>,
        roles_claim: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            verifier,
            mapper,
            roles_claim: roles_claim.into(),
        }
    }

    pub fn roles_claim(&self) -> &str {
        &self.roles_claim
    }

    /// Verify `token` and wrap its claims in a [`Principal`].
    pub fn load_user(&self, token: &str) -> Result<Principal, VerifyError> {
        let claims = self.verifier.verify(token)?;

        Ok(Principal::new(
            claims,
            self.roles_claim.clone(),
            self.mapper.clone(),
        ))
    }

    // Stateless: nothing to reload between requests.
    pub fn refresh_user(&self, principal: Principal) -> Principal {
        principal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::roles::ClaimRoleMapper;
    use crate::services::auth::testing::{NOW, mint, verifier};
    use serde_json::json;

    fn provider(roles_claim: &str) -> UserProvider {
        UserProvider::new(verifier(), Arc::new(ClaimRoleMapper::default()), roles_claim)
    }

    #[test]
    fn loads_principal_from_token() {
        let token = mint(json!({"sub": "user", "exp": NOW + 1, "scopes": ["admin"]}));

        let principal = provider("scopes").load_user(&token).unwrap();

        assert_eq!(principal.username(), "user");
        assert_eq!(principal.roles(), ["ROLE_ADMIN"]);
    }

    #[test]
    fn roles_claim_is_configurable() {
        let token = mint(json!({"sub": "user", "scopes": ["admin"], "roles": ["editor"]}));

        let principal = provider("roles").load_user(&token).unwrap();

        assert_eq!(principal.roles(), ["ROLE_EDITOR"]);
    }

    #[test]
    fn verification_failure_is_returned() {
        let token = mint(json!({"sub": "user", "exp": NOW - 1}));

        assert!(matches!(
            provider("scopes").load_user(&token),
            Err(VerifyError::Expired)
        ));
    }

    #[test]
    fn refresh_returns_same_principal() {
        let provider = provider("scopes");
        let principal = provider
            .load_user(&mint(json!({"sub": "user"})))
            .unwrap();

        assert_eq!(provider.refresh_user(principal.clone()), principal);
    }
}
