//! SyncAnywhere server
//!
//! Pairs the IMC mobile POS client with the venue database over the local
//! network: a pairing handshake gated by a shared secret, token-based login
//! against the venue's user table, and read-only catalog queries.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod net;
pub mod supervisor;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{AppState, BindIp, ConfigFile, Settings, DEFAULT_JWT_SECRET, DEFAULT_PAIR_PASSWORD};
use net::BindSelection;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sync_anywhere=debug,info".into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Build the full route table. Query endpoints sit behind the token gate;
/// pairing, login and status stay open.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/verify-token", get(handlers::verify_token))
        .route("/items/", get(handlers::get_items))
        .route("/dine-tables/", get(handlers::get_dine_tables))
        .route("/user-settings/", get(handlers::get_user_settings))
        .route("/dine-categories/", get(handlers::get_dine_categories))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::mw_require_auth,
        ));

    Router::new()
        .route("/pair-check", post(handlers::pair_check))
        .route("/login", post(handlers::login))
        .route("/status", get(handlers::get_status))
        .merge(protected)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("=== SyncAnywhere Server ===");

    let exe_dir = config::exe_dir();
    let cfg = ConfigFile::load(&exe_dir)?;
    let loaded = config::load_env_file(&exe_dir.join(&cfg.env_file));

    info!("Config: {}", exe_dir.join("config.json").display());
    info!(".env loaded: {} value(s)", loaded.len());

    let settings = Arc::new(Settings::resolve(&cfg));
    db::install_drivers();

    if settings.pair_password == DEFAULT_PAIR_PASSWORD
        || settings.jwt_secret == DEFAULT_JWT_SECRET
    {
        warn!(
            "default pairing/signing secrets are in effect; \
             set PAIR_PASSWORD and JWT_SECRET before exposing this service"
        );
    }

    let bind = Arc::new(match settings.bind_ip {
        BindIp::Explicit(ip) => BindSelection {
            chosen: ip,
            tried: vec![ip],
        },
        BindIp::Auto => net::select_bind_ip(settings.port),
    });
    info!(
        "IP selection: tried={:?}, chosen={}",
        bind.tried, bind.chosen
    );

    if let Some(dns) = &settings.dns_name {
        info!("DNS name: {dns}");
        info!("Also via http://{}:{}/", dns, settings.port);
    }

    let state = AppState {
        settings: settings.clone(),
        bind: bind.clone(),
    };
    let app = router(state);

    let addr = SocketAddr::from((bind.chosen, settings.port));
    info!("Starting at http://{addr}/");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
