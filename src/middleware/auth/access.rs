//! Bearer token（JWT）検証 → AuthCtx を extensions に入れる
//!
//! - リクエストごとに 1 回だけ走る opportunistic な認証 filter。
//! - この filter 自体はリクエストを拒否しない。未認証のまま forward し、
//!   拒否は AuthCtx extractor（下流の認可）の責務。
//!
//! Per-request flow:
//! 1. extensions に AuthCtx が既にあれば no-op（再適用ガード）
//! 2. `Authorization: Bearer <jwt>` が無ければ未認証で forward
//! 3. decode 失敗（malformed / bad signature）は swallow して forward
//! 4. subject を IdentityLookup で Principal に解決。未知の subject だけは
//!    明示的なエラーとして warn ログに出す（それでも forward する）
//! 5. `is_valid(token, principal.username)` が真なら AuthCtx を insert

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::services::identity::IdentityError;
use crate::state::AppState;

/// Router 全体に認証を掛けるための middleware を適用する。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Re-running the filter on an already-authenticated request is a no-op.
    if req.extensions().get::<AuthCtx>().is_none() {
        match try_authenticate(&state, &req).await {
            Ok(Some(ctx)) => {
                // middleware → extractor への受け渡し
                req.extensions_mut().insert(ctx);
            }
            Ok(None) => {
                // No usable bearer token; the request stays unauthenticated.
            }
            Err(err) => {
                // A correctly signed token named a subject the identity store
                // does not know. Surface it, but still forward unauthenticated
                // so the outcome is a downstream 401, not a 500.
                tracing::warn!(error = %err, "identity lookup failed for signed token");
            }
        }
    }

    next.run(req).await
}

/// Run the authentication steps for one request.
///
/// - `Ok(Some(ctx))`: valid token for a known subject
/// - `Ok(None)`: no header / wrong scheme / malformed / bad signature /
///   expired / subject mismatch — all deliberately indistinguishable here
/// - `Err(_)`: identity lookup failed (the one surfaced failure)
fn try_authenticate<'a>(
    state: &'a AppState,
    req: &Request<Body>,
) -> impl Future<Output = Result<Option<AuthCtx>, IdentityError>> + Send + use<'a> {
    // `Body` is not `Sync`, so holding `&Request<Body>` across an await would
    // make the future non-`Send` and the router's middleware bound unsatisfied.
    // Borrow everything from `req` before building the returned future.
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        // Case-sensitive scheme match; `Basic ...` etc. are treated like absence.
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::to_owned);

    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);

    async move {
        let Some(token) = token else {
            return Ok(None);
        };

        let subject = match state.auth.subject(&token) {
            Ok(subject) => subject,
            Err(err) => {
                tracing::debug!(error = %err, "bearer token rejected");
                return Ok(None);
            }
        };

        let principal = state.identities.resolve(&subject).await?;

        // Full check against the independently resolved principal: signature,
        // exact subject match, expiry strictly in the future.
        if !state.auth.is_valid(&token, &principal.username) {
            return Ok(None);
        }

        Ok(Some(AuthCtx::new(
            principal.username,
            principal.roles,
            remote_addr,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::services::auth::JwtService;
    use crate::services::identity::InMemoryIdentityLookup;

    const SECRET: &str = "YWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFh";
    const OTHER_SECRET: &str = "YmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJi";

    fn test_state() -> AppState {
        let auth = Arc::new(JwtService::new(SECRET, 3600).unwrap());
        let identities = Arc::new(InMemoryIdentityLookup::demo());
        AppState::new(auth, identities)
    }

    /// Minimal router mirroring the real layout: one public route, one route
    /// that requires an AuthCtx.
    fn test_router(state: AppState) -> Router {
        async fn public() -> &'static str {
            "public"
        }
        async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
            ctx.subject
        }

        let router = Router::new()
            .route("/public", get(public))
            .route("/whoami", get(whoami));

        apply(router, state.clone()).with_state(state)
    }

    fn get_request(path: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn no_header_forwards_unauthenticated() {
        let app = test_router(test_state());

        let res = app
            .clone()
            .oneshot(get_request("/public", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.oneshot(get_request("/whoami", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_treated_like_absence() {
        let app = test_router(test_state());

        let res = app
            .oneshot(get_request("/whoami", Some("Basic YWxpY2U6cHc=")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_populates_auth_ctx() {
        let state = test_state();
        let token = state.auth.issue("alice", serde_json::Map::new()).unwrap();
        let app = test_router(state);

        let res = app
            .oneshot(get_request("/whoami", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"alice");
    }

    #[tokio::test]
    async fn forged_token_is_rejected_downstream() {
        let state = test_state();
        let forged = JwtService::new(OTHER_SECRET, 3600)
            .unwrap()
            .issue("alice", serde_json::Map::new())
            .unwrap();
        let app = test_router(state);

        let res = app
            .oneshot(get_request("/whoami", Some(&format!("Bearer {forged}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_subject_still_forwards_without_context() {
        let state = test_state();
        // Correctly signed token for a subject the store does not know.
        let token = state.auth.issue("mallory", serde_json::Map::new()).unwrap();
        let app = test_router(state);

        let res = app
            .clone()
            .oneshot(get_request("/public", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(get_request("/whoami", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let state = test_state();
        let token = state.auth.issue("alice", serde_json::Map::new()).unwrap();

        let mut req = get_request("/whoami", Some(&format!("Bearer {token}")));
        let ctx = try_authenticate(&state, &req).await.unwrap().unwrap();
        req.extensions_mut().insert(ctx.clone());

        // With a context already installed the filter never re-runs the
        // lookup; the double-layered router below must behave identically
        // to the single-layered one.
        async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
            ctx.subject
        }
        let router = Router::new().route("/whoami", get(whoami));
        let router = apply(apply(router, state.clone()), state.clone()).with_state(state);

        let res = router.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"alice");
        assert_eq!(ctx.subject, "alice");
        assert_eq!(ctx.roles, vec!["ADMIN", "USER"]);
    }

    #[tokio::test]
    async fn expired_token_leaves_context_empty() {
        use base64::Engine as _;

        let state = test_state();

        // Well-formed, correctly signed, but exp one hour in the past.
        let secret = base64::engine::general_purpose::STANDARD
            .decode(SECRET)
            .unwrap();
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": "alice",
            "iat": now - 7200,
            "exp": now - 3600,
        });
        let expired = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(&secret),
        )
        .unwrap();

        let req = get_request("/whoami", Some(&format!("Bearer {expired}")));
        assert!(try_authenticate(&state, &req).await.unwrap().is_none());

        let app = test_router(state);
        let res = app
            .oneshot(get_request("/whoami", Some(&format!("Bearer {expired}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
