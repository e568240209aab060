use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::v1::dto::auth::{TokenRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// POST /auth/token
///
/// Check credentials against the identity store and issue an access token.
/// The principal's roles travel as an extra claim so downstream consumers can
/// read them without another lookup.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let principal = state
        .identities
        .authenticate(&req.username, &req.password)
        .await?;

    let mut extra = serde_json::Map::new();
    extra.insert("roles".to_string(), serde_json::json!(principal.roles));

    let access_token = state.auth.issue(&principal.username, extra)?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.auth.ttl_seconds(),
        }),
    ))
}
