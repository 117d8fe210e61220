//! Token verification, delegated to `jsonwebtoken`.
//!
//! Signature checks are done by the library. The temporal window (`exp`, `nbf`,
//! `iat`) is checked here against an injected [`Clock`] so that callers and tests
//! control "now".

use std::{fmt, sync::Arc};

use jsonwebtoken::{
    Algorithm, DecodingKey, Validation,
    errors::{Error as JwtError, ErrorKind},
};
use serde_json::{Map, Value};

use super::claims::ClaimSet;

/// Source of the current unix time, in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Always returns the wrapped timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    Malformed(#[source] JwtError),
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not valid yet")]
    NotYetValid,
    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
}

impl From<JwtError> for VerifyError {
    fn from(e: JwtError) -> Self {
        classify(e.kind()).unwrap_or_else(|| Self::Malformed(e))
    }
}

// `None` means the token could not be parsed at all.
fn classify(kind: &ErrorKind) -> Option<VerifyError> {
    let error = match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidKeyFormat => {
            VerifyError::InvalidSignature
        }
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        ErrorKind::ImmatureSignature => VerifyError::NotYetValid,
        ErrorKind::InvalidIssuer => VerifyError::InvalidClaim("iss"),
        ErrorKind::InvalidAudience => VerifyError::InvalidClaim("aud"),
        ErrorKind::InvalidSubject => VerifyError::InvalidClaim("sub"),
        ErrorKind::MissingRequiredClaim(name) => match name.as_str() {
            "iss" => VerifyError::InvalidClaim("iss"),
            "aud" => VerifyError::InvalidClaim("aud"),
            "sub" => VerifyError::InvalidClaim("sub"),
            _ => return None,
        },
        _ => return None,
    };

    Some(error)
}

#[derive(Debug, thiserror::Error)]
#[error("invalid {algorithm:?} key: {source}")]
pub struct KeyError {
    algorithm: Algorithm,
    #[source]
    source: JwtError,
}

/// Turns a raw token into a verified claim set.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError>;
}

/// `jsonwebtoken`-backed verifier for a single algorithm and key.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(algorithm: Algorithm, decoding_key: DecodingKey) -> Self {
        let mut validation = Validation::new(algorithm);
        // exp/nbf are checked against the injected clock instead.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key,
            validation,
            leeway_seconds: 0,
            clock: Arc::new(SystemClock),
        }
    }

    /// `material` is a PEM document for asymmetric algorithms and the shared
    /// secret for HMAC ones.
    pub fn from_key_material(algorithm: Algorithm, material: &str) -> Result<Self, KeyError> {
        let bytes = material.as_bytes();
        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(DecodingKey::from_secret(bytes))
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
        }
        .map_err(|source| KeyError { algorithm, source })?;

        Ok(Self::new(algorithm, key))
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn algorithm(&self) -> Option<Algorithm> {
        self.validation.algorithms.first().copied()
    }

    fn check_window(&self, claims: &ClaimSet) -> Result<(), VerifyError> {
        let now = self.clock.now();
        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);

        if let Some(exp) = time_claim(claims, "exp")? {
            if exp < now.saturating_sub(leeway) {
                return Err(VerifyError::Expired);
            }
        }

        for name in ["nbf", "iat"] {
            if let Some(ts) = time_claim(claims, name)? {
                if ts > now.saturating_add(leeway) {
                    return Err(VerifyError::NotYetValid);
                }
            }
        }

        Ok(())
    }
}

// Absent is fine; present but not a number is not.
fn time_claim(claims: &ClaimSet, name: &'static str) -> Result<Option<i64>, VerifyError> {
    if !claims.contains(name) {
        return Ok(None);
    }

    claims
        .timestamp(name)
        .map(Some)
        .ok_or(VerifyError::InvalidClaim(name))
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;

        let claims = ClaimSet::new(data.claims);
        self.check_window(&claims)?;

        Ok(claims)
    }
}
