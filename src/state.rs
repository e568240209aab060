/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: auth: JwtService, identities: IdentityLookup など
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::JwtService, identity::IdentityLookup};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<JwtService>,
    pub identities: Arc<dyn IdentityLookup>,
}

impl AppState {
    pub fn new(auth: Arc<JwtService>, identities: Arc<dyn IdentityLookup>) -> Self {
        Self { auth, identities }
    }
}
