/*
 * Responsibility
 * - Decide which algorithm (HS256 / RS256) and which key verify a token
 * - Precedence: a public key forces RS256, otherwise the shared secret (HS256)
 * - Missing / contradictory key material is a ConfigurationError, never Unauthorized
 */
use std::fmt;

use jsonwebtoken::Algorithm;
use tracing::error;

use crate::config::{WEB_SECRET_KEY, WebAuthConfig};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    Hs256,
    Rs256,
}

impl SigningAlgorithm {
    pub fn as_jwt(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Rs256 => Algorithm::RS256,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hs256 => f.write_str("HS256"),
            Self::Rs256 => f.write_str("RS256"),
        }
    }
}

/// Resolved `{algorithm, key material}` pair.
///
/// - HS256: `key` is the shared secret
/// - RS256: `key` is the PEM encoded public key
#[derive(Clone, PartialEq, Eq)]
pub struct KeyConfig {
    algorithm: SigningAlgorithm,
    key: String,
}

impl KeyConfig {
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn hs256(secret: &str) -> Self {
        Self {
            algorithm: SigningAlgorithm::Hs256,
            key: secret.to_string(),
        }
    }

    fn rs256(public_key: &str) -> Self {
        Self {
            algorithm: SigningAlgorithm::Rs256,
            key: public_key.to_string(),
        }
    }
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("KeyConfig")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolve from injected configuration plus an optional out-of-band public key.
pub fn resolve_key(config: &WebAuthConfig, public_key: Option<&str>) -> Result<KeyConfig> {
    if let Some(public_key) = present(public_key) {
        return Ok(KeyConfig::rs256(public_key));
    }

    match config.shared_secret() {
        Some(secret) => Ok(KeyConfig::hs256(secret)),
        None => {
            error!(
                key = WEB_SECRET_KEY,
                "no public key supplied and no shared secret configured"
            );
            Err(AppError::configuration(format!(
                "invalid configuration detected: {WEB_SECRET_KEY} must be set"
            )))
        }
    }
}

/// Resolve from key material the caller already holds. Exactly one of the two
/// must be present.
pub fn resolve_explicit_key(
    shared_secret: Option<&str>,
    public_key: Option<&str>,
) -> Result<KeyConfig> {
    match (present(shared_secret), present(public_key)) {
        (Some(secret), None) => Ok(KeyConfig::hs256(secret)),
        (None, Some(public_key)) => Ok(KeyConfig::rs256(public_key)),
        (Some(_), Some(_)) => Err(AppError::configuration(
            "web secret key or tls public key must be set, not both",
        )),
        (None, None) => Err(AppError::configuration(
            "web secret key or tls public key must be set",
        )),
    }
}
