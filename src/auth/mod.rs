//! Authentication: pairing handshake, credential login, token validation.

pub mod middleware;
pub mod pairing;
pub mod token;

use sqlx::Row;
use tracing::warn;

use crate::db::{DbError, DbSettings};
use crate::error::{Error, Result};

const CREDENTIALS_SQL: &str = "SELECT id, pass FROM acc_users WHERE id = ?";

/// Check a login against the venue's user table. Inputs are trimmed and must
/// be non-empty; the lookup is a single parameterized query.
///
/// Legacy venue databases store the password in clear text, so verification
/// is hash-aware: a stored value shaped like a bcrypt hash is verified with
/// bcrypt, anything else falls back to exact equality.
pub async fn check_credentials(
    db: &DbSettings,
    userid: &str,
    password: &str,
) -> Result<String> {
    let userid = userid.trim();
    let password = password.trim();
    if userid.is_empty() || password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let rows = db.fetch_all(CREDENTIALS_SQL, &[userid]).await?;
    let Some(row) = rows.first() else {
        warn!("[Auth] no credential row for {userid}");
        return Err(Error::InvalidCredentials);
    };

    let id: String = row
        .try_get(0)
        .map_err(|e| DbError::Query(e.to_string()))?;
    let stored: Option<String> = row
        .try_get(1)
        .map_err(|e| DbError::Query(e.to_string()))?;

    if password_matches(password, stored.as_deref().unwrap_or_default()) {
        Ok(id)
    } else {
        warn!("[Auth] password mismatch for {userid}");
        Err(Error::InvalidCredentials)
    }
}

fn password_matches(submitted: &str, stored: &str) -> bool {
    if stored.starts_with("$2") {
        bcrypt::verify(submitted, stored).unwrap_or(false)
    } else {
        // Clear-text credential row; the venue schema predates hashing.
        submitted == stored
    }
}
