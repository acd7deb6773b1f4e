//! Token verification and the decoded claims type.
//!
//! `validate_claims` accepts exactly the algorithm carried by the resolved
//! [`KeyConfig`]. Any failure (size, format, algorithm, signature, expiry) is
//! reported as the same `AppError::Unauthorized`; the reason only reaches the
//! logs.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::{AppError, Result};

use super::key_resolver::{KeyConfig, SigningAlgorithm};

/// Tokens longer than this are rejected before any parsing.
pub const MAX_TOKEN_BYTES: usize = 8192;

/// Time-based validation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    // Allowed clock skew for exp/nbf, seconds.
    pub leeway_seconds: u64,
    // If true, tokens without `exp` are rejected. A present `exp` is always checked.
    pub require_exp: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            leeway_seconds: 0,
            require_exp: false,
        }
    }
}

/// Claims decoded from a verified token. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.get("exp")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Hand the mapping over to the caller.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

fn decoding_key(key: &KeyConfig) -> Result<DecodingKey> {
    match key.algorithm() {
        SigningAlgorithm::Hs256 => Ok(DecodingKey::from_secret(key.key().as_bytes())),
        SigningAlgorithm::Rs256 => DecodingKey::from_rsa_pem(key.key().as_bytes()).map_err(|e| {
            // Deployment defect, but the caller still only sees "unauthorized"
            error!(error = %e, "configured RS256 public key is not a valid RSA PEM");
            AppError::Unauthorized
        }),
    }
}

fn validation(algorithm: SigningAlgorithm, policy: &ValidationPolicy) -> Validation {
    let mut validation = Validation::new(algorithm.as_jwt());
    validation.leeway = policy.leeway_seconds;
    validation.validate_nbf = true;
    // No audience is configured, so a token that names one is not for us.
    validation.validate_aud = true;
    if !policy.require_exp {
        validation.required_spec_claims.clear();
    }
    validation
}

/// Verify `token` against the resolved key and return its claims.
pub fn validate_claims(token: &str, key: &KeyConfig, policy: &ValidationPolicy) -> Result<Claims> {
    if token.len() > MAX_TOKEN_BYTES {
        debug!(
            target: "web_auth::claims",
            len = token.len(),
            "token exceeds maximum size"
        );
        return Err(AppError::Unauthorized);
    }

    let decoding_key = decoding_key(key)?;
    let validation = validation(key.algorithm(), policy);

    let data = jsonwebtoken::decode::<Map<String, Value>>(token, &decoding_key, &validation)
        .map_err(|e| {
            debug!(
                target: "web_auth::claims",
                algorithm = %key.algorithm(),
                error = %e,
                "token verification failed"
            );
            AppError::Unauthorized
        })?;

    Ok(Claims(data.claims))
}
