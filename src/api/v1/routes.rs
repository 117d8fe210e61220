/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証 middleware の適用範囲もここで決める
 */
use axum::{Router, routing::get};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{admin::admin, me::me};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/admin", get(admin));

    middleware::auth::access::apply(protected, state)
}
