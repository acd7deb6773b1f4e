/*
 * Responsibility
 * - auth: bearer verification pipeline
 * - vip: bus hand-off address construction
 */
pub mod auth;
pub mod vip;
