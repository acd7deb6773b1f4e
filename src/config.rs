/*
 * Responsibility
 * - Environment loading (PORT, APP_ENV, WEB_SECRET_KEY, WEB_PUBLIC_KEY, VIP_*)
 * - Validation of the values (startup fails when something is malformed)
 * - WebAuthConfig: the read-only snapshot injected into the key resolver
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::ValidationPolicy;

/// Platform configuration key holding the HS256 shared secret.
pub const WEB_SECRET_KEY: &str = "web-secret-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read-only configuration consumed by the key resolver.
///
/// Built once and shared behind an `Arc`. Reloading means building a new
/// snapshot, so a verification never observes a half-updated key.
#[derive(Clone, Default)]
pub struct WebAuthConfig {
    pub web_secret_key: Option<String>,
    pub policy: ValidationPolicy,
}

impl WebAuthConfig {
    pub fn new(web_secret_key: Option<String>) -> Self {
        Self {
            web_secret_key,
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The shared secret, if one is configured and non-empty.
    pub fn shared_secret(&self) -> Option<&str> {
        self.web_secret_key.as_deref().filter(|s| !s.is_empty())
    }
}

impl fmt::Debug for WebAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("WebAuthConfig")
            .field("web_secret_key", &self.shared_secret().map(|_| "[REDACTED]"))
            .field("policy", &self.policy)
            .finish()
    }
}

/// Bus hand-off settings. Only the root is logged.
#[derive(Clone)]
pub struct VipSettings {
    pub address: String,
    pub serverkey: Option<String>,
    pub publickey: Option<String>,
    pub secretkey: Option<String>,
}

impl fmt::Debug for VipSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VipSettings")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub web_secret_key: Option<String>,
    pub web_public_key: Option<String>,
    pub jwt_leeway_seconds: u64,

    pub vip: Option<VipSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let web_secret_key = optional_var("WEB_SECRET_KEY");

        // PEM from a single-line env value
        let web_public_key = optional_var("WEB_PUBLIC_KEY").map(|v| normalize_pem(&v));

        let jwt_leeway_seconds = match std::env::var("JWT_LEEWAY_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            Err(_) => 0,
        };

        let vip = optional_var("VIP_ADDRESS").map(|address| VipSettings {
            address,
            serverkey: optional_var("VIP_SERVERKEY"),
            publickey: optional_var("VIP_PUBLICKEY"),
            secretkey: optional_var("VIP_SECRETKEY"),
        });

        Ok(Self {
            addr,
            app_env,
            web_secret_key,
            web_public_key,
            jwt_leeway_seconds,
            vip,
        })
    }

    pub fn web_auth(&self) -> WebAuthConfig {
        WebAuthConfig::new(self.web_secret_key.clone()).with_policy(ValidationPolicy {
            leeway_seconds: self.jwt_leeway_seconds,
            ..ValidationPolicy::default()
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_pem(value: &str) -> String {
    value.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parses_production_aliases() {
        assert!(AppEnv::parse("PROD").is_production());
        assert!(AppEnv::parse("production").is_production());
        assert!(!AppEnv::parse("staging").is_production());
    }

    #[test]
    fn escaped_newlines_become_real_newlines() {
        let pem = normalize_pem("-----BEGIN PUBLIC KEY-----\\nAAAA\\n-----END PUBLIC KEY-----");
        assert_eq!(pem.lines().count(), 3);
    }

    #[test]
    fn empty_secret_counts_as_unset() {
        assert_eq!(WebAuthConfig::new(Some(String::new())).shared_secret(), None);
        assert_eq!(
            WebAuthConfig::new(Some("s3cret".into())).shared_secret(),
            Some("s3cret")
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = WebAuthConfig::new(Some("s3cret".into()));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("REDACTED"));
    }
}
