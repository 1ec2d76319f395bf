use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// Payload carried inside every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
    /// Unique token id; keeps two tokens for the same subject distinct even
    /// when minted within the same second.
    pub jti: Uuid,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    pub fn has_franchise(&self, franchise_id: Uuid) -> bool {
        self.roles
            .iter()
            .any(|role| role.franchise_scope() == Some(franchise_id))
    }

    pub fn issued_at(&self) -> AuthResult<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("iat", self.iat.to_string()))
    }

    pub fn expires_at(&self) -> AuthResult<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", self.exp.to_string()))
    }
}
