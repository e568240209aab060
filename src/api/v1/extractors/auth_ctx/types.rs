/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - ここは「型（契約）」として固定化する
 */

use std::net::SocketAddr;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `subject` はトークンの sub（ユーザー名）
/// - `roles` は IdentityLookup が返した authority 情報
/// - `remote_addr` は監査/ログ相関用（取れない構成では None）
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: String,
    pub roles: Vec<String>,
    pub remote_addr: Option<SocketAddr>,
}

impl AuthCtx {
    pub fn new(subject: String, roles: Vec<String>, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            subject,
            roles,
            remote_addr,
        }
    }
}
