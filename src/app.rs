/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (http / security headers / bearer)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{self, http::HttpLimits};
use crate::services::{auth::build_auth_service, vip::build_vip_address};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // RUST_LOG=info,platform_web_auth=debug,web_auth=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting web auth in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    check_bus_handoff(&config)?;

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let auth = build_auth_service(config)?;
    Ok(AppState::new(auth))
}

/// The bus transport is external; the host only makes sure the hand-off
/// address it would publish is well formed.
fn check_bus_handoff(config: &Config) -> Result<(), AppError> {
    let Some(vip) = &config.vip else {
        tracing::info!("VIP_ADDRESS not set, bus hand-off disabled");
        return Ok(());
    };

    build_vip_address(
        &vip.address,
        vip.serverkey.as_deref(),
        vip.publickey.as_deref(),
        vip.secretkey.as_deref(),
    )?;

    tracing::info!(root = %vip.address, "bus hand-off address ready");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, HttpLimits::default())
}
