/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::AuthService;

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AppError> {
    let auth = AuthService::new(Arc::new(config.web_auth()), config.web_public_key.clone())?;

    tracing::info!(
        algorithm = %auth.key_config().algorithm(),
        leeway_seconds = config.jwt_leeway_seconds,
        "bearer verification configured"
    );

    Ok(Arc::new(auth))
}
