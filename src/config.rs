//! Startup configuration
//!
//! Merges `config.json` (next to the executable) with a `.env` overlay file
//! into one immutable [`Settings`] snapshot. Everything downstream reads the
//! snapshot; nothing re-reads the environment after startup.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use tracing::warn;

use crate::db::DbSettings;
use crate::net::BindSelection;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PAIR_PASSWORD: &str = "IMC-MOBILE";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

/// Directory the running executable lives in. Config and the `.env` overlay
/// are resolved relative to it so a packaged install is self-contained.
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Everything after a `#` is an inline comment.
pub fn strip_comment(value: &str) -> String {
    value.split('#').next().unwrap_or("").trim().to_string()
}

/// On-disk `config.json` shape. Unknown keys are ignored so configs written
/// for older builds keep loading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// `"auto"` or an explicit IPv4 address to bind.
    pub ip: String,
    pub port: u16,
    pub dsn: Option<String>,
    pub db_uid: Option<String>,
    pub db_pwd: Option<String>,
    /// Legacy field kept so existing deployments parse; not used here.
    pub settings: Option<String>,
    pub env_file: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            ip: "auto".to_string(),
            port: DEFAULT_PORT,
            dsn: None,
            db_uid: None,
            db_pwd: None,
            settings: None,
            env_file: ".env".to_string(),
        }
    }
}

impl ConfigFile {
    /// Load `config.json` from `dir`. A missing file yields the defaults; a
    /// file that exists but does not parse is fatal.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join("config.json");
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mut cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("malformed config file {}", path.display()))?;
        if let Some(dsn) = cfg.dsn.take() {
            let dsn = strip_comment(&dsn);
            cfg.dsn = (!dsn.is_empty()).then_some(dsn);
        }
        Ok(cfg)
    }
}

/// Parse a `KEY=VALUE` overlay file and mirror each pair into the process
/// environment, overwriting whatever was there. Returns the loaded pairs.
/// Blank lines, `#` comments and lines without `=` are skipped; values have
/// inline comments stripped.
pub fn load_env_file(path: &Path) -> Vec<(String, String)> {
    let mut loaded = Vec::new();
    let Ok(raw) = std::fs::read_to_string(path) else {
        return loaded;
    };
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = strip_comment(value);
        std::env::set_var(&key, &value);
        loaded.push((key, value));
    }
    loaded
}

/// How the bind address is picked at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindIp {
    Auto,
    Explicit(Ipv4Addr),
}

/// Immutable configuration snapshot built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_ip: BindIp,
    pub port: u16,
    pub db: DbSettings,
    pub pair_password: String,
    pub jwt_secret: String,
    pub jwt_algo: Algorithm,
    pub dns_name: Option<String>,
}

impl Settings {
    /// Resolve the snapshot. The `.env` overlay must already have been
    /// applied; per key the environment wins over the config file, which
    /// wins over the built-in default.
    pub fn resolve(cfg: &ConfigFile) -> Self {
        let bind_ip = if cfg.ip == "auto" {
            BindIp::Auto
        } else {
            match cfg.ip.parse::<Ipv4Addr>() {
                Ok(ip) => BindIp::Explicit(ip),
                Err(_) => {
                    warn!("config ip {:?} is not an IPv4 address, falling back to auto", cfg.ip);
                    BindIp::Auto
                }
            }
        };

        let jwt_algo_name = env_non_empty("JWT_ALGO").unwrap_or_else(|| "HS256".to_string());
        let jwt_algo = jwt_algo_name.parse::<Algorithm>().unwrap_or_else(|_| {
            warn!("unknown JWT_ALGO {:?}, falling back to HS256", jwt_algo_name);
            Algorithm::HS256
        });

        let dns_name = std::env::var("DNS_NAME")
            .ok()
            .map(|v| strip_comment(&v))
            .filter(|v| !v.is_empty());

        Self {
            bind_ip,
            port: cfg.port,
            db: DbSettings::resolve(cfg),
            pair_password: env_non_empty("PAIR_PASSWORD")
                .unwrap_or_else(|| DEFAULT_PAIR_PASSWORD.to_string()),
            jwt_secret: env_non_empty("JWT_SECRET")
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            jwt_algo,
            dns_name,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub bind: Arc<BindSelection>,
}

#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
