/*
 * Responsibility
 * - Principal 解決 (subject → Principal) の collaborator インターフェース
 * - login 用の credential 照合もここ (外部ストア差し替え前提)
 */
use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown subject: {0}")]
    NotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Resolved identity + authority set for an authenticated subject.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

/// External user store. The auth core only ever reads through this trait;
/// it never mutates a Principal.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Resolve a token subject to its principal.
    async fn resolve(&self, subject: &str) -> Result<Principal, IdentityError>;

    /// Check credentials for the login flow.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<Principal, IdentityError>;
}

struct UserRecord {
    password_sha256: String,
    roles: Vec<String>,
}

/// In-memory user store with SHA-256 password digests.
///
/// Stands in for a real directory/database; immutable after startup, so it is
/// safe to share across requests without locking.
#[derive(Default)]
pub struct InMemoryIdentityLookup {
    users: HashMap<String, UserRecord>,
}

impl InMemoryIdentityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str, password: &str, roles: &[&str]) -> Self {
        self.users.insert(
            username.to_string(),
            UserRecord {
                password_sha256: sha256_hex(password),
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
        self
    }

    /// Demo user set for local development.
    pub fn demo() -> Self {
        Self::new()
            .with_user("alice", "alice-password", &["ADMIN", "USER"])
            .with_user("bob", "bob-password", &["USER"])
    }

    fn principal(&self, username: &str, record: &UserRecord) -> Principal {
        Principal {
            username: username.to_string(),
            roles: record.roles.clone(),
        }
    }
}

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[async_trait]
impl IdentityLookup for InMemoryIdentityLookup {
    async fn resolve(&self, subject: &str) -> Result<Principal, IdentityError> {
        self.users
            .get(subject)
            .map(|record| self.principal(subject, record))
            .ok_or_else(|| IdentityError::NotFound(subject.to_string()))
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let record = self
            .users
            .get(username)
            .ok_or(IdentityError::InvalidCredentials)?;

        if record.password_sha256 != sha256_hex(password) {
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(self.principal(username, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_known_subject() {
        let store = InMemoryIdentityLookup::demo();
        let principal = store.resolve("alice").await.unwrap();

        assert_eq!(principal.username, "alice");
        assert_eq!(principal.roles, vec!["ADMIN", "USER"]);
    }

    #[tokio::test]
    async fn resolve_unknown_subject_is_not_found() {
        let store = InMemoryIdentityLookup::demo();
        assert!(matches!(
            store.resolve("mallory").await,
            Err(IdentityError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let store = InMemoryIdentityLookup::demo();

        assert!(store.authenticate("alice", "alice-password").await.is_ok());
        assert!(matches!(
            store.authenticate("alice", "wrong").await,
            Err(IdentityError::InvalidCredentials)
        ));
        // Unknown user and bad password are indistinguishable to the caller
        assert!(matches!(
            store.authenticate("mallory", "whatever").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }
}
