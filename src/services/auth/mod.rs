pub mod access_jwt;
pub mod claims;
pub mod credential;
pub mod factory;
pub mod key_resolver;

pub use access_jwt::{AuthService, user_claims};
pub use claims::{Claims, MAX_TOKEN_BYTES, ValidationPolicy, validate_claims};
pub use credential::{RequestContext, RequestMetadata, extract_bearer};
pub use factory::build_auth_service;
pub use key_resolver::{KeyConfig, SigningAlgorithm, resolve_explicit_key, resolve_key};
