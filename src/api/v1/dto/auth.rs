/*
 * Responsibility
 * - auth 系の request/response DTO
 */
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Request body for `/auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Usually "Bearer"
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}

/// Response body for `/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<SocketAddr>,
}
