pub mod authenticator;
pub mod claims;
pub mod factory;
pub mod principal;
pub mod provider;
pub mod roles;
pub mod token_source;
pub mod verifier;

pub use authenticator::{AuthError, Authenticator};
pub use claims::ClaimSet;
pub use factory::{BuildError, build_authenticator};
pub use principal::Principal;
pub use provider::UserProvider;
pub use roles::{ClaimRoleMapper, RoleMapper};
pub use token_source::{HeaderScheme, RequestView, TokenExtractor, TokenSource};
pub use verifier::{Clock, FixedClock, JwtVerifier, SystemClock, TokenVerifier, VerifyError};
