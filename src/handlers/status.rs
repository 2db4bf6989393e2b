//! Operational status endpoint.
//!
//! The one endpoint requiring no token: purely descriptive connection help
//! for the mobile client, no database access.

use axum::{extract::State, Json};
use chrono::Local;
use serde::Serialize;

use crate::config::AppState;

#[derive(Debug, Serialize)]
pub struct Instructions {
    pub mobile_setup: &'static str,
    pub troubleshooting: [&'static str; 4],
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub primary_ip: String,
    pub all_available_ips: Vec<String>,
    pub connection_urls: Vec<String>,
    pub pair_password_hint: String,
    pub server_time: String,
    pub instructions: Instructions,
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let ips: Vec<String> = state
        .bind
        .tried
        .iter()
        .filter(|ip| !ip.is_unspecified())
        .map(ToString::to_string)
        .collect();

    Json(StatusResponse {
        status: "online",
        message: "SyncAnywhere server is running",
        primary_ip: state.bind.chosen.to_string(),
        connection_urls: ips
            .iter()
            .map(|ip| format!("http://{}:{}", ip, state.settings.port))
            .collect(),
        all_available_ips: ips,
        pair_password_hint: password_hint(&state.settings.pair_password),
        server_time: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        instructions: Instructions {
            mobile_setup: "Try connecting to any of the URLs listed in 'connection_urls'",
            troubleshooting: [
                "Ensure both devices are on the same WiFi network",
                "Try each IP address if the first one doesn't work",
                "Check firewall settings on the server computer",
                "Verify port 8000 is not blocked",
            ],
        },
    })
}

fn password_hint(password: &str) -> String {
    let prefix: String = password.chars().take(3).collect();
    format!("Password starts with: {prefix}...")
}
