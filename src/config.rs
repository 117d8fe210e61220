/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, JWT_* など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;

use jsonwebtoken::Algorithm;

use crate::services::auth::HeaderScheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    /// PEM document, HMAC secret, or `file://<path>`.
    pub jwt_public_key: String,
    pub jwt_algorithm: Algorithm,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub jwt_leeway_seconds: u64,

    pub roles_claim: String,
    pub role_prefix: String,

    // An empty name disables the channel.
    pub token_header: String,
    pub token_parameter: String,
    pub header_scheme: HeaderScheme,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let jwt_public_key = lookup("JWT_PUBLIC_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_PUBLIC_KEY"))?
            .replace("\\n", "\n");

        let jwt_algorithm = match lookup("JWT_ALGORITHM") {
            Some(v) => parse_algorithm(&v).ok_or(ConfigError::Invalid("JWT_ALGORITHM"))?,
            None => Algorithm::RS512,
        };

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let jwt_issuer = non_empty("JWT_ISSUER");
        let jwt_audience = non_empty("JWT_AUDIENCE");

        let jwt_leeway_seconds = match lookup("JWT_LEEWAY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let roles_claim = lookup("JWT_ROLES_CLAIM").unwrap_or_else(|| "scopes".to_string());
        let role_prefix = lookup("JWT_ROLE_PREFIX").unwrap_or_else(|| "ROLE_".to_string());

        // Set-but-empty is meaningful here, so no `non_empty`.
        let token_header = lookup("JWT_HEADER").unwrap_or_else(|| "authorization".to_string());
        let token_parameter = lookup("JWT_PARAMETER").unwrap_or_else(|| "token".to_string());

        let header_scheme = match lookup("JWT_REQUIRE_BEARER")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("" | "0" | "false" | "no") => HeaderScheme::Optional,
            Some("1" | "true" | "yes") => HeaderScheme::Required,
            Some(_) => return Err(ConfigError::Invalid("JWT_REQUIRE_BEARER")),
        };

        Ok(Self {
            addr,
            app_env,
            jwt_public_key,
            jwt_algorithm,
            jwt_issuer,
            jwt_audience,
            jwt_leeway_seconds,
            roles_claim,
            role_prefix,
            token_header,
            token_parameter,
            header_scheme,
        })
    }
}

// `jsonwebtoken` spells names as `RS512` / `EdDSA`; accept any casing.
fn parse_algorithm(value: &str) -> Option<Algorithm> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("eddsa") {
        return Some(Algorithm::EdDSA);
    }

    value.to_ascii_uppercase().parse().ok()
}
