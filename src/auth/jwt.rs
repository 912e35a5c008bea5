/// JWT Token Encoding and Decoding
///
/// Signs claims with HS256 and verifies signature, issuer and expiration.
/// Blacklist and token-kind checks live in the auth service.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Sign a set of claims
///
/// # Errors
/// Returns error if token encoding fails
pub fn encode_token(claims: &Claims, config: &JwtSettings) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate signature, issuer and expiration and return the claims
///
/// Leeway is zero: once `exp` has passed the token is rejected, which is
/// what allows blacklist entries to be evicted at that same instant.
///
/// # Errors
/// `TokenExpired` for expired tokens, `TokenInvalid` for everything else
pub fn decode_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation error: {}", e);
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
            _ => AppError::Auth(AuthError::TokenInvalid),
        }
    })
}
