use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::revocation::RevocationRegistry;
use crate::roles::Role;

/// Signing configuration. The secret is process-wide; every token the service
/// issues is signed and verified with it.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_seconds: i64,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds: 86_400,
            leeway_seconds: 30,
        }
    }

    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}

/// Identity a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
}

/// Issues and validates HS256 tokens against the shared revocation registry.
/// Issuance and validation are pure computation; only revocation touches
/// shared state.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    leeway: Duration,
    validation: Validation,
    registry: RevocationRegistry,
}

impl TokenService {
    pub fn new(config: TokenConfig, registry: RevocationRegistry) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::seconds(config.ttl_seconds),
            leeway: Duration::seconds(config.leeway_seconds as i64),
            validation,
            registry,
        }
    }

    pub fn registry(&self) -> &RevocationRegistry {
        &self.registry
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &TokenSubject) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.user_id,
            name: subject.name.clone(),
            email: subject.email.clone(),
            roles: subject.roles.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::from)
    }

    /// Checks run in a fixed order: shape, signature, expiry, revocation.
    pub fn validate(&self, token: &str) -> AuthResult<Claims> {
        let fingerprint = fingerprint(token).ok_or(AuthError::Malformed)?;
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if self.registry.is_revoked(&fingerprint) {
            return Err(AuthError::Revoked);
        }
        if self.registry.is_subject_revoked(claims.sub, claims.issued_at()?) {
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    /// Record the token's fingerprint for as long as validation would still
    /// accept it, which is its natural expiry plus clock-skew leeway.
    /// Idempotent; tokens that no longer verify at all are ignored.
    pub fn revoke(&self, token: &str) {
        let Some(fingerprint) = fingerprint(token) else {
            return;
        };
        let Ok(data) = decode::<Claims>(token, &self.decoding_key, &self.validation) else {
            return;
        };
        let Ok(expires_at) = data.claims.expires_at() else {
            return;
        };
        self.registry.revoke(fingerprint, expires_at + self.leeway);
    }

    /// Revoke every outstanding token for a user, e.g. when the user record
    /// is deleted. The cutoff outlives the longest-lived acceptable token.
    pub fn revoke_subject(&self, user_id: Uuid) {
        self.registry.revoke_subject(user_id, self.ttl + self.leeway);
    }
}

/// Fingerprint of a token's signature segment: SHA-256, hex encoded. Returns
/// `None` unless the token has the three-segment base64url shape.
fn fingerprint(token: &str) -> Option<String> {
    let mut parts = token.split('.');
    let header = parts.next()?;
    let payload = parts.next()?;
    let signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let well_formed = [header, payload, signature].iter().all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    });
    if !well_formed {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(signature.as_bytes());
    Some(hex::encode(hasher.finalize()))
}
