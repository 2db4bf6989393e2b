//! Pairing handshake.
//!
//! A client proves knowledge of the shared pairing secret before it may ask
//! the host to ensure the sync service is running. The check is exact and
//! case-sensitive, nothing more; process supervision lives in
//! [`crate::supervisor`] and the two only meet in the HTTP handler.

use crate::error::{Error, Result};

pub fn verify(submitted: &str, configured: &str) -> Result<()> {
    if submitted == configured {
        Ok(())
    } else {
        Err(Error::InvalidPassword)
    }
}
