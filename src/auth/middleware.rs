//! Token-gate middleware for the query endpoints.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::token;
use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::Result;

/// Requires an `Authorization: Bearer <token>` header, validates the token
/// against the configured secret and stores the subject in the request
/// extensions as [`Ctx`].
pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = token::from_bearer(header)?;
    let userid = token::decode_subject(
        token,
        &state.settings.jwt_secret,
        state.settings.jwt_algo,
    )?;

    req.extensions_mut().insert(Ctx::new(userid));

    Ok(next.run(req).await)
}
