//! Pairing and login endpoints.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{self, pairing, token};
use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::supervisor::{self, LaunchStatus};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PairCheckRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PairCheckResponse {
    pub status: &'static str,
    pub message: String,
    pub pair_successful: bool,
}

/// POST /pair-check
///
/// Verifies the shared pairing secret, then makes sure the sync service
/// process is running. The two steps stay separate operations; this handler
/// is the only place they compose.
pub async fn pair_check(
    State(state): State<AppState>,
    body: core::result::Result<Json<PairCheckRequest>, JsonRejection>,
) -> Result<Json<PairCheckResponse>> {
    let Json(req) = body.map_err(|_| Error::InvalidJson)?;
    info!("[Pair] pair check request");

    pairing::verify(&req.password, &state.settings.pair_password).map_err(|e| {
        warn!("[Pair] invalid pairing password");
        e
    })?;

    let message = match supervisor::ensure_running()? {
        LaunchStatus::AlreadyRunning(_) => "SyncService already running",
        LaunchStatus::Launched => "SyncService launched successfully",
    };

    Ok(Json(PairCheckResponse {
        status: "success",
        message: message.to_string(),
        pair_successful: true,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub userid: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user_id: String,
    pub token: String,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    body: core::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = body.map_err(|_| Error::InvalidJson)?;
    info!("[Auth] login attempt for {}", req.userid.trim());

    let user_id =
        auth::check_credentials(&state.settings.db, &req.userid, &req.password).await?;
    let token = token::issue(&user_id, &state.settings.jwt_secret, state.settings.jwt_algo)?;

    info!("[Auth] login successful for {user_id}");
    Ok(Json(LoginResponse {
        status: "success",
        message: "Login successful",
        user_id,
        token,
    }))
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub status: &'static str,
    pub userid: String,
}

/// GET /verify-token
pub async fn verify_token(ctx: Ctx) -> Json<VerifyTokenResponse> {
    info!("[Auth] token verified for {}", ctx.userid());
    Json(VerifyTokenResponse {
        status: "success",
        userid: ctx.userid().to_string(),
    })
}
