use axum::Json;

use crate::api::v1::dto::auth::MeResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

/// GET /me
///
/// Echo the authenticated context. The extractor rejects with 401 when the
/// auth middleware did not install an AuthCtx.
pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        username: ctx.subject,
        roles: ctx.roles,
        remote_addr: ctx.remote_addr,
    })
}
