//! JWT bearer authentication for axum services.
//!
//! A request is authenticated in three steps:
//! 1. [`services::auth::TokenExtractor`] finds the raw token (header, then query).
//! 2. [`services::auth::JwtVerifier`] checks it with `jsonwebtoken`.
//! 3. [`services::auth::Principal`] exposes the claims and the roles derived by
//!    [`services::auth::ClaimRoleMapper`].
//!
//! [`services::authz`] holds the permission checks used by handlers.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
