//! access token（JWT）検証 → Principal を extensions に入れる
//!
//! - token が無いリクエストは anonymous のまま通す（拒否するかは handler 側の判断）
//! - token があって検証に失敗したら 401
//! - 成功したら `Principal` を request extensions に格納する

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Router 全体に認証を掛ける。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 署名検証 + exp/nbf などは Authenticator (UserProvider → JwtVerifier) 側で実施
    let principal = state.auth.authenticate(&req)?;

    if let Some(principal) = principal {
        // middleware → extractor への受け渡し
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}
