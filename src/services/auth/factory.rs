//! Factory: build `Authenticator` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    Authenticator, ClaimRoleMapper, JwtVerifier, TokenExtractor, UserProvider, verifier::KeyError,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot read key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Key(#[from] KeyError),
}

pub fn build_authenticator(config: &Config) -> Result<Arc<Authenticator>, BuildError> {
    let material = load_key_material(&config.jwt_public_key)?;

    let mut verifier = JwtVerifier::from_key_material(config.jwt_algorithm, &material)?
        .with_leeway(config.jwt_leeway_seconds);
    if let Some(issuer) = &config.jwt_issuer {
        verifier = verifier.with_issuer(issuer);
    }
    if let Some(audience) = &config.jwt_audience {
        verifier = verifier.with_audience(audience);
    }

    let provider = UserProvider::new(
        Arc::new(verifier),
        Arc::new(ClaimRoleMapper::new(config.role_prefix.as_str())),
        config.roles_claim.as_str(),
    );

    let extractor = TokenExtractor::new(
        config.token_header.as_str(),
        config.token_parameter.as_str(),
    )
    .with_scheme(config.header_scheme);

    tracing::info!(
        algorithm = ?config.jwt_algorithm,
        header = %extractor.header(),
        parameter = %extractor.parameter(),
        scheme = ?extractor.scheme(),
        roles_claim = %config.roles_claim,
        "authenticator configured"
    );

    Ok(Arc::new(Authenticator::new(Arc::new(extractor), provider)))
}

/// Inline key material, or the contents of `file://<path>`.
fn load_key_material(value: &str) -> Result<String, BuildError> {
    match value.strip_prefix("file://") {
        Some(path) => std::fs::read_to_string(path).map_err(|source| BuildError::KeyFile {
            path: path.to_string(),
            source,
        }),
        None => Ok(value.to_string()),
    }
}
