/*
 * Responsibility
 * - GET /me (認証済み主体の確認用)
 */
use axum::Json;

use crate::api::v1::dto::me::MeResponse;
use crate::api::v1::extractors::CurrentUser;
use crate::error::AppError;
use crate::services::authz::Permission;

use super::ensure;

pub async fn me(CurrentUser(principal): CurrentUser) -> Result<Json<MeResponse>, AppError> {
    ensure(&principal, Permission::User, None)?;

    Ok(Json(MeResponse::from(&principal)))
}
