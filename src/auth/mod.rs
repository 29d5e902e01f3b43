use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Tokens are always HS256; anything else is rejected before the signature is checked.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Audience and role stamped on tokens minted by `issue_token`.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// What verification reads back out of a token. `aud` is checked by
/// jsonwebtoken against the raw claims, so it may be a string or an array.
/// `exp` is a NumericDate and may carry a fractional part.
#[derive(Debug, Deserialize)]
struct VerifiedClaims {
    sub: String,
    exp: f64,
}

/// Verified subject of a bearer token. Opaque: usually a UUID, never parsed as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity(String);

impl UserIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unsupported token algorithm")]
    InvalidAlgorithm,

    #[error("Invalid token audience")]
    InvalidAudience,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: missing 'sub' claim")]
    MissingSubject,

    #[error("Signing secret is not configured")]
    MissingSecret,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::InvalidAlgorithm
            }
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => AuthError::MissingSubject,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// Checks bearer tokens against one shared secret.
///
/// Holds only immutable key material, so a single instance is shared by every
/// request task.
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}

impl IdentityVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by hand in `verify_at` so the clock can be injected.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&security.jwt_secret, security.jwt_audience.as_deref())
    }

    pub fn verify(&self, credential: &str) -> Result<UserIdentity, AuthError> {
        self.verify_at(credential, Utc::now().timestamp())
    }

    /// Verify against an explicit `now` (seconds since the epoch). The token is
    /// rejected once `now` reaches `exp`.
    pub fn verify_at(&self, credential: &str, now: i64) -> Result<UserIdentity, AuthError> {
        let token = credential.trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = decode::<VerifiedClaims>(token, &self.key, &self.validation)?.claims;

        if now >= claims.exp.trunc() as i64 {
            return Err(AuthError::Expired);
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(UserIdentity(claims.sub))
    }
}

/// One-shot verification without an audience check.
pub fn verify(credential: &str, trusted_secret: &str) -> Result<UserIdentity, AuthError> {
    IdentityVerifier::new(trusted_secret, None)?.verify(credential)
}

/// Mint a token for local development and tests. Production tokens come from
/// the identity provider.
pub fn issue_token(user_id: &str, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + ttl).timestamp(),
        aud: Some(DEFAULT_AUDIENCE.to_string()),
        role: Some(DEFAULT_AUDIENCE.to_string()),
        iat: Some(now.timestamp()),
    };

    sign(&claims, secret)
}

pub(crate) fn sign(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(ALGORITHM),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Malformed(e.to_string()))
}
