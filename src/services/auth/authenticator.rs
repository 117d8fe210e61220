//! Request guard: find a token, verify it, build the principal.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::principal::Principal;
use super::provider::UserProvider;
use super::token_source::{RequestView, TokenSource};
use super::verifier::VerifyError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT not found")]
    TokenNotFound,
    #[error(transparent)]
    Verification(#[from] VerifyError),
}

#[derive(Clone)]
pub struct Authenticator {
    source: Arc<dyn TokenSource>,
    provider: UserProvider,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(source: Arc<dyn TokenSource>, provider: UserProvider) -> Self {
        Self { source, provider }
    }

    pub fn supports(&self, request: &dyn RequestView) -> bool {
        self.source.supports(request)
    }

    pub fn provider(&self) -> &UserProvider {
        &self.provider
    }

    /// - `Ok(None)`: the request carries no credentials (anonymous)
    /// - `Ok(Some(_))`: a verified principal
    /// - `Err(_)`: credentials were offered but are unusable
    pub fn authenticate(
        &self,
        request: &dyn RequestView,
    ) -> Result<Option<Principal>, AuthError> {
        if !self.source.supports(request) {
            return Ok(None);
        }

        let token = self.source.extract(request);
        if token.is_empty() {
            warn!("JWT not found");
            return Err(AuthError::TokenNotFound);
        }

        match self.provider.load_user(&token) {
            Ok(principal) => {
                debug!(username = %principal.username(), "JWT accepted");
                Ok(Some(principal))
            }
            Err(err) => {
                log_rejection(&err);
                Err(err.into())
            }
        }
    }
}

fn log_rejection(err: &VerifyError) {
    match err {
        VerifyError::InvalidSignature => warn!("JWT signature verification failed"),
        VerifyError::Expired | VerifyError::NotYetValid => warn!(error = %err, "JWT expired"),
        VerifyError::InvalidClaim(claim) => warn!(claim, "JWT claim rejected"),
        VerifyError::Malformed(e) => error!(error = %e, "JWT error"),
    }
}
