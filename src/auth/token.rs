//! Stateless session tokens.
//!
//! A token is a signed claim set `{ sub, exp }`; validity is purely a
//! function of signature and expiry, re-derived on every request. There is
//! no server-side session store and no revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tokens expire this long after login.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Issue a token for `subject`, expiring [`TOKEN_TTL_DAYS`] from now.
pub fn issue(subject: &str, secret: &str, algo: Algorithm) -> Result<String> {
    let expiry = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
    let claims = Claims {
        sub: subject.to_string(),
        exp: expiry.timestamp() as usize,
    };
    encode(
        &Header::new(algo),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("token encoding failed: {e}")))
}

/// Verify signature and expiry, returning the subject. An expired signature
/// is a distinct failure from a structurally invalid or tampered token.
pub fn decode_subject(token: &str, secret: &str, algo: Algorithm) -> Result<String> {
    let validation = Validation::new(algo);
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims.sub),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(Error::TokenExpired),
        Err(_) => Err(Error::TokenInvalid),
    }
}

/// Extract the token from an `Authorization` header of the exact form
/// `Bearer <token>`. Anything else counts as a missing token.
pub fn from_bearer(header: Option<&str>) -> Result<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(Error::TokenMissing)
}
