/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth: bearer 検証, http: request id / limit / timeout / trace, security_headers
 */
pub mod auth;
pub mod http;
pub mod security_headers;
