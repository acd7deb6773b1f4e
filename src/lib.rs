//! Bearer credential verification for the platform web endpoint, plus the
//! VIP address builder used to hand authenticated sessions to the bus.
//!
//! Pipeline per request: [`services::auth::extract_bearer`] →
//! [`services::auth::resolve_key`] → [`services::auth::validate_claims`],
//! wrapped by [`services::auth::AuthService`].

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

pub use error::AppError;
pub use services::auth::{AuthService, Claims, KeyConfig, SigningAlgorithm};
pub use services::vip::build_vip_address;
