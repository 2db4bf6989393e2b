//! Per-request authentication context.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{Error, Result};

/// Identity of the caller, inserted by the auth middleware after the bearer
/// token validates.
#[derive(Clone, Debug)]
pub struct Ctx {
    userid: String,
}

impl Ctx {
    pub fn new(userid: String) -> Self {
        Self { userid }
    }

    pub fn userid(&self) -> &str {
        &self.userid
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::TokenMissing)
    }
}
