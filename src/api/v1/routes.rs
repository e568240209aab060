/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /auth, /me, /volleyball を nest/merge
 * - 認証が必要な範囲は AuthCtx extractor で handler 側が決める
 *   (auth middleware は app.rs で Router 全体に適用)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::issue_token,
    health::health,
    me::me,
    volleyball::{extras, leagues, live_matches, top_stats},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/token", post(issue_token))
        .route("/me", get(me))
        .route("/volleyball/matches/live", get(live_matches))
        .route("/volleyball/leagues", get(leagues))
        .route("/volleyball/stats/top", get(top_stats))
        .route("/volleyball/extras", get(extras))
}
