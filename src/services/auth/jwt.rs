use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("subject must not be empty")]
    EmptySubject,

    #[error("ttl must be positive")]
    InvalidTtl,

    #[error("signing secret is not valid base64")]
    InvalidSecret,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Registered + custom claims carried by an access token.
///
/// `extra` is flattened, so caller-supplied claims (e.g. `roles`) sit next to
/// `sub`/`iat`/`exp` in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// HS256 access-token codec.
///
/// The symmetric key is derived once from a base64-encoded secret at startup
/// and never rotated at runtime.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret_base64: &str, ttl_seconds: u64) -> Result<Self, TokenError> {
        let secret = BASE64
            .decode(secret_base64.trim())
            .map_err(|_| TokenError::InvalidSecret)?;

        // `decode` verifies structure + signature only. Expiration is checked
        // separately by `is_valid`, so `exp` must not fail decoding here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a token for `subject` with the given extra claims and ttl.
    ///
    /// `iat` is now, `exp` is now + ttl. Pure apart from the clock read.
    pub fn encode(
        &self,
        subject: &str,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl_seconds: u64,
    ) -> Result<String, TokenError> {
        self.encode_at(subject, extra, ttl_seconds, Utc::now())
    }

    /// Sign a token using the configured ttl. Entry point for the login flow.
    pub fn issue(
        &self,
        subject: &str,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, TokenError> {
        self.encode(subject, extra, self.ttl_seconds)
    }

    fn encode_at(
        &self,
        subject: &str,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }
        if ttl_seconds == 0 {
            return Err(TokenError::InvalidTtl);
        }

        let iat = now.timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat,
            exp: iat + ttl_seconds as i64,
            extra,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify structure and signature, returning the claim set.
    ///
    /// NOTE: expiration is deliberately NOT checked here; callers that care
    /// about liveness go through `is_valid`. A structurally valid but expired
    /// token decodes fine.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed(e),
            })?;

        Ok(data.claims)
    }

    /// Verify and project out the `sub` claim.
    pub fn subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.decode(token)?.sub)
    }

    /// True iff the token decodes, carries exactly `expected_subject`, and is
    /// not yet expired. Any decode failure is "not valid" (fail closed).
    pub fn is_valid(&self, token: &str, expected_subject: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.sub == expected_subject && claims.exp > Utc::now().timestamp(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // 32 bytes of 'a', base64-encoded
    const SECRET: &str = "YWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFh";
    const OTHER_SECRET: &str = "YmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJi";

    fn svc() -> JwtService {
        JwtService::new(SECRET, 3600).unwrap()
    }

    fn role_claims(role: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut extra = serde_json::Map::new();
        extra.insert("role".to_string(), serde_json::json!(role));
        extra
    }

    #[test]
    fn new_rejects_non_base64_secret() {
        assert!(matches!(
            JwtService::new("not base64 !!!", 3600),
            Err(TokenError::InvalidSecret)
        ));
    }

    #[test]
    fn round_trip_preserves_subject_and_claims() {
        let svc = svc();
        let token = svc.encode("alice", role_claims("admin"), 3600).unwrap();

        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.extra["role"], "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn encode_rejects_empty_subject_and_zero_ttl() {
        let svc = svc();
        assert!(matches!(
            svc.encode("", serde_json::Map::new(), 3600),
            Err(TokenError::EmptySubject)
        ));
        assert!(matches!(
            svc.encode("alice", serde_json::Map::new(), 0),
            Err(TokenError::InvalidTtl)
        ));
    }

    #[test]
    fn decode_with_wrong_key_is_signature_invalid() {
        let token = svc().encode("alice", serde_json::Map::new(), 3600).unwrap();

        let other = JwtService::new(OTHER_SECRET, 3600).unwrap();
        assert!(matches!(
            other.decode(&token),
            Err(TokenError::SignatureInvalid)
        ));
        assert!(!other.is_valid(&token, "alice"));
    }

    #[test]
    fn decode_garbage_is_malformed() {
        assert!(matches!(
            svc().decode("not.a.jwt"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn expired_token_decodes_but_is_not_valid() {
        let svc = svc();
        let issued_at = Utc::now() - Duration::hours(2);
        let token = svc
            .encode_at("alice", serde_json::Map::new(), 3600, issued_at)
            .unwrap();

        // decode only checks structure + signature
        assert_eq!(svc.decode(&token).unwrap().sub, "alice");
        assert!(!svc.is_valid(&token, "alice"));
    }

    #[test]
    fn is_valid_requires_exact_subject_match() {
        let svc = svc();
        let token = svc.encode("alice", serde_json::Map::new(), 3600).unwrap();

        assert!(svc.is_valid(&token, "alice"));
        assert!(!svc.is_valid(&token, "bob"));
        assert!(!svc.is_valid(&token, "Alice"));
    }

    #[test]
    fn admin_token_scenario() {
        let svc = svc();
        let token = svc.issue("alice", role_claims("admin")).unwrap();

        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.extra["role"], "admin");
        assert_eq!(claims.exp - claims.iat, 3600);

        assert!(svc.is_valid(&token, "alice"));
        assert!(!svc.is_valid(&token, "bob"));
    }

    #[test]
    fn two_tokens_at_different_instants_are_both_valid() {
        let svc = svc();
        let t1 = svc
            .encode_at("alice", serde_json::Map::new(), 3600, Utc::now())
            .unwrap();
        let t2 = svc
            .encode_at(
                "alice",
                serde_json::Map::new(),
                3600,
                Utc::now() + Duration::seconds(1),
            )
            .unwrap();

        assert_ne!(t1, t2);
        assert!(svc.is_valid(&t1, "alice"));
        assert!(svc.is_valid(&t2, "alice"));
    }
}
