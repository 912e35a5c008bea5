/// JWT Claims structure
///
/// Payload shared by access and refresh tokens. The `kind` claim tags the
/// token type so one can never be presented in place of the other.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Token type tag
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims for both token kinds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// JWT ID, the revocation key
    pub jti: String,
    pub kind: TokenKind,
    /// Set only on access tokens minted directly from a password login
    pub fresh: bool,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    /// Create new claims for `user_id` with a random jti
    ///
    /// # Arguments
    /// * `user_id` - User's UUID
    /// * `kind` - Access or refresh
    /// * `fresh` - Ignored for refresh tokens, which are never fresh
    /// * `expiry_seconds` - Token lifetime from now
    /// * `issuer` - Issuer identifier
    pub fn new(
        user_id: Uuid,
        kind: TokenKind,
        fresh: bool,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            kind,
            fresh: fresh && kind == TokenKind::Access,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// A signed token whose subject is not a UUID is treated as invalid.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::TokenInvalid))
    }
}
