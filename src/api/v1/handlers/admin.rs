/*
 * Responsibility
 * - GET /admin (ROLE_ADMIN を持つ主体のみ)
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::extractors::CurrentUser;
use crate::error::AppError;
use crate::services::authz::Permission;

use super::ensure;

pub async fn admin(CurrentUser(principal): CurrentUser) -> Result<Json<Value>, AppError> {
    ensure(&principal, Permission::Admin, None)?;

    Ok(Json(json!({ "status": "ok", "username": principal.username() })))
}
