/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */

use crate::services::auth::Claims;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `claims` は検証済みトークンの payload (read-only)
/// - `subject` は `sub` claim のコピー（ログ相関用。無いトークンもある）
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: Option<String>,
    claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self {
            subject: claims.subject().map(str::to_string),
            claims,
        }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
