/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /me は bearer 必須 (route_layer で適用); /health は app.rs でルート直下に置く
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::me::me;
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    access::apply(Router::new().route("/me", get(me)), state)
}
