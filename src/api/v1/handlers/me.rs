/*
 * Responsibility
 * - GET /api/v1/me
 * - 検証済み claims をそのまま返す (呼び出し側の疎通・デバッグ用)
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::services::auth::Claims;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: Option<String>,
    pub claims: Claims,
}

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    tracing::debug!(subject = ?ctx.subject, "claims requested");

    Json(MeResponse {
        subject: ctx.subject.clone(),
        claims: ctx.claims().clone(),
    })
}
