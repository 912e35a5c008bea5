/// Auth Service
///
/// Validates credentials, issues access/refresh token pairs, authorizes
/// incoming tokens against the blacklist and revokes tokens on logout.
///
/// Token lifecycle: `Issued -> Active -> {Expired | Revoked}`. Expiry is a
/// wall-clock comparison against `exp`; revocation happens only through
/// `logout`. Neither terminal state leads back to `Active`.

use std::sync::Arc;
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::auth::blacklist::RevocationStore;
use crate::auth::claims::{Claims, TokenKind};
use crate::auth::jwt::{decode_token, encode_token};
use crate::auth::password::verify_password;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::repository::UserRepository;

/// Access and refresh token issued together on login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A token that passed signature, expiry, kind and blacklist checks.
///
/// Only `AuthService::authorize` constructs one, so holding an
/// `Authenticated` is proof that the token was usable at that moment.
#[derive(Debug, Clone)]
pub struct Authenticated {
    claims: Claims,
    user_id: Uuid,
}

impl Authenticated {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn jti(&self) -> &str {
        &self.claims.jti
    }

    pub fn kind(&self) -> TokenKind {
        self.claims.kind
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }

    pub fn is_fresh(&self) -> bool {
        self.claims.kind == TokenKind::Access && self.claims.fresh
    }

    /// Gate for operations that need re-proof of password possession
    pub fn require_fresh(&self) -> Result<(), AppError> {
        if self.is_fresh() {
            Ok(())
        } else {
            Err(AppError::Auth(AuthError::FreshTokenRequired))
        }
    }
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    revocations: Arc<dyn RevocationStore>,
    jwt: JwtSettings,
    /// Verified against when the username is unknown, so that path costs
    /// the same as a wrong password.
    dummy_hash: String,
}

impl AuthService {
    /// # Errors
    /// Returns error if the dummy hash cannot be computed (invalid cost)
    pub fn new(
        users: Arc<dyn UserRepository>,
        revocations: Arc<dyn RevocationStore>,
        jwt: JwtSettings,
        hash_cost: u32,
    ) -> Result<Self, AppError> {
        let dummy_hash = bcrypt::hash(Uuid::new_v4().to_string(), hash_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(Self {
            users,
            revocations,
            jwt,
            dummy_hash,
        })
    }

    pub fn settings(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Exchange a username and password for a fresh access token and a
    /// refresh token.
    ///
    /// # Errors
    /// `InvalidCredentials` whether the user is missing or the password is wrong
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self.users.find_by_username(username).await?;

        let (user_id, password_matches) = match &user {
            Some(user) => (Some(user.id), verify_password(password, &user.password_hash)?),
            None => {
                let _ = verify_password(password, &self.dummy_hash)?;
                (None, false)
            }
        };

        let user_id = match (user_id, password_matches) {
            (Some(id), true) => id,
            _ => {
                AuditEvent::failure("LOGIN", "user", "Invalid credentials").emit();
                return Err(AppError::Auth(AuthError::InvalidCredentials));
            }
        };

        let access_token = self.issue(user_id, TokenKind::Access, true)?;
        let refresh_token = self.issue(user_id, TokenKind::Refresh, false)?;

        AuditEvent::success("LOGIN", "user", "User logged in")
            .with_subject(user_id)
            .emit();

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new, non-fresh access token from an authorized refresh token.
    ///
    /// # Errors
    /// `WrongTokenKind` when handed anything but a refresh token
    pub async fn refresh(&self, refresh: &Authenticated) -> Result<String, AppError> {
        if refresh.kind() != TokenKind::Refresh {
            return Err(AppError::Auth(AuthError::WrongTokenKind));
        }
        // May have been revoked since it was authorized.
        self.ensure_not_revoked(refresh.jti()).await?;

        let access_token = self.issue(refresh.user_id(), TokenKind::Access, false)?;

        AuditEvent::success("REFRESH", "token", "Access token refreshed")
            .with_subject(refresh.user_id())
            .emit();

        Ok(access_token)
    }

    /// Revoke the presented access token by its jti. Other tokens of the
    /// same user stay valid. Revoking an already revoked jti succeeds.
    ///
    /// # Errors
    /// `WrongTokenKind` when handed a refresh token
    pub async fn logout(&self, access: &Authenticated) -> Result<(), AppError> {
        if access.kind() != TokenKind::Access {
            return Err(AppError::Auth(AuthError::WrongTokenKind));
        }

        self.revocations.add(access.jti(), access.expires_at()).await?;

        AuditEvent::success("LOGOUT", "token", "Access token revoked")
            .with_subject(access.user_id())
            .with_resource_id(access.jti())
            .emit();

        Ok(())
    }

    /// Validate a raw token of the expected kind.
    ///
    /// A token is usable iff its signature is valid, it is not expired, it
    /// is of the expected kind and its jti is not blacklisted.
    ///
    /// # Errors
    /// Any `AuthError` token variant, all of which answer 401
    pub async fn authorize(&self, token: &str, expected: TokenKind) -> Result<Authenticated, AppError> {
        let claims = decode_token(token, &self.jwt)?;

        if claims.kind != expected {
            tracing::warn!(
                expected = ?expected,
                presented = ?claims.kind,
                "Token of the wrong kind presented"
            );
            return Err(AppError::Auth(AuthError::WrongTokenKind));
        }

        self.ensure_not_revoked(&claims.jti).await?;

        let user_id = claims.user_id()?;
        Ok(Authenticated { claims, user_id })
    }

    async fn ensure_not_revoked(&self, jti: &str) -> Result<(), AppError> {
        if self.revocations.contains(jti).await? {
            tracing::warn!(jti = jti, "Revoked token presented");
            return Err(AppError::Auth(AuthError::TokenRevoked));
        }
        Ok(())
    }

    fn issue(&self, user_id: Uuid, kind: TokenKind, fresh: bool) -> Result<String, AppError> {
        let expiry = match kind {
            TokenKind::Access => self.jwt.access_token_expiry,
            TokenKind::Refresh => self.jwt.refresh_token_expiry,
        };
        let claims = Claims::new(user_id, kind, fresh, expiry, self.jwt.issuer.clone());
        encode_token(&claims, &self.jwt)
    }
}
