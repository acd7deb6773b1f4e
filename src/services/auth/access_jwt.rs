/*
 * Responsibility
 * - Per-request pipeline: credential extraction -> key resolution -> claims validation
 * - Explicit-key entry point for callers that already hold key material
 * - Holds the injected configuration snapshot (no global lookup)
 */
use std::sync::Arc;

use tracing::{instrument, warn};

use crate::config::WebAuthConfig;
use crate::error::Result;

use super::claims::{Claims, validate_claims};
use super::credential::{RequestContext, extract_bearer};
use super::key_resolver::{KeyConfig, resolve_explicit_key, resolve_key};

/// HS256 / RS256 bearer verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    config: Arc<WebAuthConfig>,
    key: KeyConfig,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .field("key", &self.key)
            .finish()
    }
}

impl AuthService {
    /// `public_key` is the out-of-band RS256 key; when present it takes
    /// precedence over the configured shared secret.
    ///
    /// The key is resolved once here; fails when the combination cannot
    /// verify anything, so a broken deployment is caught at startup.
    pub fn new(config: Arc<WebAuthConfig>, public_key: Option<String>) -> Result<Self> {
        let key = resolve_key(&config, public_key.as_deref())?;
        Ok(Self { config, key })
    }

    pub fn key_config(&self) -> &KeyConfig {
        &self.key
    }

    /// Verify the bearer credential carried by `ctx`.
    #[instrument(skip_all, name = "web_auth.authenticate")]
    pub fn authenticate<C: RequestContext + ?Sized>(&self, ctx: &C) -> Result<Claims> {
        let token = extract_bearer(ctx)?;
        validate_claims(&token, &self.key, &self.config.policy).inspect_err(|_| {
            warn!(algorithm = %self.key.algorithm(), "bearer token rejected");
        })
    }

    /// Verify a raw token against key material the caller supplies.
    /// Exactly one of `shared_secret` / `public_key` must be set.
    pub fn claims_from_bearer(
        &self,
        bearer: &str,
        shared_secret: Option<&str>,
        public_key: Option<&str>,
    ) -> Result<Claims> {
        let key = resolve_explicit_key(shared_secret, public_key)?;
        validate_claims(bearer, &key, &self.config.policy)
    }
}

/// Same as [`AuthService::authenticate`] for callers holding only a config snapshot.
pub fn user_claims<C: RequestContext + ?Sized>(
    ctx: &C,
    config: &WebAuthConfig,
    public_key: Option<&str>,
) -> Result<Claims> {
    let token = extract_bearer(ctx)?;
    let key = resolve_key(config, public_key)?;
    validate_claims(&token, &key, &config.policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::auth::credential::RequestMetadata;
    use crate::services::auth::key_resolver::SigningAlgorithm;
    use chrono::Utc;
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::json;

    const RSA_PRIVATE: &str = include_str!("../../../tests/fixtures/rsa_primary_private.pem");
    const RSA_PUBLIC: &str = include_str!("../../../tests/fixtures/rsa_primary_public.pem");

    fn hs256_token(secret: &str) -> String {
        let claims = json!({"sub": "admin", "exp": Utc::now().timestamp() + 600});
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn rs256_token() -> String {
        let claims = json!({"sub": "agent", "exp": Utc::now().timestamp() + 600});
        jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(RSA_PRIVATE.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    fn shared(secret: &str) -> Arc<WebAuthConfig> {
        Arc::new(WebAuthConfig::new(Some(secret.to_string())))
    }

    #[test]
    fn new_fails_without_any_key_material() {
        let err = AuthService::new(Arc::new(WebAuthConfig::default()), None).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn authenticates_header_token_with_shared_secret() {
        let service = AuthService::new(shared("k1"), None).unwrap();
        let ctx = RequestMetadata::new().with_header("Authorization", format!("Bearer {}", hs256_token("k1")));

        let claims = service.authenticate(&ctx).unwrap();
        assert_eq!(claims.subject(), Some("admin"));
    }

    #[test]
    fn authenticates_cookie_token_with_public_key() {
        let service = AuthService::new(shared("k1"), Some(RSA_PUBLIC.to_string())).unwrap();
        let ctx = RequestMetadata::new().with_cookie("Bearer", rs256_token());

        let claims = service.authenticate(&ctx).unwrap();
        assert_eq!(claims.subject(), Some("agent"));
    }

    #[test]
    fn public_key_precedence_rejects_hs256_tokens() {
        let service = AuthService::new(shared("k1"), Some(RSA_PUBLIC.to_string())).unwrap();
        let ctx = RequestMetadata::new().with_header("Authorization", format!("Bearer {}", hs256_token("k1")));

        assert_eq!(service.authenticate(&ctx), Err(AppError::Unauthorized));
    }

    #[test]
    fn missing_credential_is_unauthorized() {
        let service = AuthService::new(shared("k1"), None).unwrap();
        assert_eq!(
            service.authenticate(&RequestMetadata::new()),
            Err(AppError::Unauthorized)
        );
    }

    #[test]
    fn claims_from_bearer_uses_supplied_key() {
        let service = AuthService::new(shared("platform"), None).unwrap();

        let claims = service
            .claims_from_bearer(&hs256_token("caller"), Some("caller"), None)
            .unwrap();
        assert_eq!(claims.subject(), Some("admin"));

        let claims = service
            .claims_from_bearer(&rs256_token(), None, Some(RSA_PUBLIC))
            .unwrap();
        assert_eq!(claims.subject(), Some("agent"));
    }

    #[test]
    fn claims_from_bearer_rejects_ambiguous_keys() {
        let service = AuthService::new(shared("platform"), None).unwrap();
        let token = hs256_token("caller");

        for (secret, public_key) in [(Some("caller"), Some(RSA_PUBLIC)), (None, None)] {
            let err = service
                .claims_from_bearer(&token, secret, public_key)
                .unwrap_err();
            assert!(matches!(err, AppError::Configuration(_)));
        }
    }

    #[test]
    fn user_claims_surfaces_configuration_error() {
        let ctx = RequestMetadata::new().with_header("Authorization", format!("Bearer {}", hs256_token("k1")));
        let err = user_claims(&ctx, &WebAuthConfig::default(), None).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let claims = user_claims(&ctx, &WebAuthConfig::new(Some("k1".into())), None).unwrap();
        assert_eq!(claims.subject(), Some("admin"));
    }

    #[test]
    fn key_is_resolved_once_at_construction() {
        let service = AuthService::new(shared("k1"), Some(RSA_PUBLIC.to_string())).unwrap();
        assert_eq!(service.key_config().algorithm(), SigningAlgorithm::Rs256);

        let service = AuthService::new(shared("k1"), None).unwrap();
        assert_eq!(service.key_config().algorithm(), SigningAlgorithm::Hs256);
        assert_eq!(service.key_config().key(), "k1");
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let service = AuthService::new(shared("k1"), Some(RSA_PUBLIC.to_string())).unwrap();
        let rendered = format!("{service:?}");
        assert!(!rendered.contains("k1"));
        assert!(!rendered.contains("BEGIN PUBLIC KEY"));
    }
}
