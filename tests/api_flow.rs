//! Integration tests: pairing, login, token gate and catalog queries over a
//! real database file.
//!
//! Each test builds the full router against a temporary SQLite venue
//! database and drives it with in-process requests.

use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::Algorithm;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tower::ServiceExt;

use sync_anywhere::config::{AppState, BindIp, Settings};
use sync_anywhere::db::DbSettings;
use sync_anywhere::net::BindSelection;

const TEST_SECRET: &str = "integration-test-secret";
const TEST_PAIR_PASSWORD: &str = "IMC-MOBILE";

async fn setup_venue_db(path: &Path) -> anyhow::Result<()> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))?
        .create_if_missing(true);
    let mut conn = options.connect().await?;

    for ddl in [
        "CREATE TABLE acc_users (id TEXT PRIMARY KEY, pass TEXT)",
        "CREATE TABLE tb_item_master (
            item_code TEXT, item_name TEXT, rate REAL, rate1 REAL, rate2 REAL,
            kitchen TEXT, activity TEXT, image TEXT, taxper REAL,
            longname TEXT, category TEXT)",
        "CREATE TABLE dine_itemcategory (code TEXT, name TEXT)",
        "CREATE TABLE dine_tables (tableno TEXT, description TEXT, section TEXT)",
        "CREATE TABLE acc_userssettings (uid TEXT, code TEXT)",
        "CREATE TABLE dine_catagory (catagorycode TEXT, name TEXT)",
    ] {
        sqlx::query(ddl).execute(&mut conn).await?;
    }

    sqlx::query("INSERT INTO acc_users (id, pass) VALUES ('MGR01', '1234')")
        .execute(&mut conn)
        .await?;
    let hashed = bcrypt::hash("pw-hash", 4)?;
    sqlx::query("INSERT INTO acc_users (id, pass) VALUES ('HASH01', ?)")
        .bind(&hashed)
        .execute(&mut conn)
        .await?;

    sqlx::query(
        "INSERT INTO tb_item_master
            (item_code, item_name, rate, rate1, rate2, kitchen, activity, image,
             taxper, longname, category)
         VALUES
            ('ITM001', 'Masala Dosa', 120.0, 110.0, 100.0, 'K1', 'A', NULL,
             5.0, 'Masala Dosa (Plain)', 'C1'),
            ('ITM002', 'Filter Coffee', 40.0, 35.0, 30.0, 'K2', 'A', NULL,
             5.0, 'Filter Coffee (Hot)', 'C9')",
    )
    .execute(&mut conn)
    .await?;
    sqlx::query("INSERT INTO dine_itemcategory (code, name) VALUES ('C1', 'South Indian')")
        .execute(&mut conn)
        .await?;

    // Insertion order is deliberately not sorted; responses must keep it.
    sqlx::query(
        "INSERT INTO dine_tables (tableno, description, section)
         VALUES ('T02', 'Window', 'A'), ('T01', 'Corner', 'B')",
    )
    .execute(&mut conn)
    .await?;

    sqlx::query(
        "INSERT INTO acc_userssettings (uid, code) VALUES ('MGR01', 'S01'), ('CASH01', 'S02')",
    )
    .execute(&mut conn)
    .await?;
    sqlx::query(
        "INSERT INTO dine_catagory (catagorycode, name) VALUES ('FD', 'Food'), ('BV', 'Beverages')",
    )
    .execute(&mut conn)
    .await?;

    conn.close().await?;
    Ok(())
}

fn test_state(dsn: String) -> AppState {
    AppState {
        settings: Arc::new(Settings {
            bind_ip: BindIp::Auto,
            port: 8000,
            db: DbSettings {
                dsn,
                uid: String::new(),
                pwd: String::new(),
            },
            pair_password: TEST_PAIR_PASSWORD.to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            jwt_algo: Algorithm::HS256,
            dns_name: None,
        }),
        bind: Arc::new(BindSelection {
            chosen: Ipv4Addr::new(192, 168, 1, 50),
            tried: vec![Ipv4Addr::new(192, 168, 1, 50), Ipv4Addr::new(192, 168, 1, 51)],
        }),
    }
}

async fn test_app() -> anyhow::Result<(Router, tempfile::TempDir)> {
    sync_anywhere::db::install_drivers();
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("venue.db");
    setup_venue_db(&db_path).await?;
    let state = test_state(format!("sqlite://{}", db_path.display()));
    Ok((sync_anywhere::router(state), dir))
}

async fn send(
    app: &Router,
    request: Request<Body>,
) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes)?;
    Ok((status, body))
}

async fn get(
    app: &Router,
    uri: &str,
    token: Option<&str>,
) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty())?).await
}

async fn post_json(
    app: &Router,
    uri: &str,
    body: &str,
) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    send(app, request).await
}

async fn login(app: &Router, userid: &str, password: &str) -> anyhow::Result<String> {
    let body = serde_json::json!({ "userid": userid, "password": password }).to_string();
    let (status, value) = post_json(app, "/login", &body).await?;
    assert_eq!(status, StatusCode::OK, "login failed: {value}");
    assert_eq!(value["status"], "success");
    Ok(value["token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_login_issues_token_that_validates() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;

    let token = login(&app, "MGR01", "1234").await?;
    assert!(!token.is_empty());

    let (status, value) = get(&app, "/verify-token", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "success");
    assert_eq!(value["userid"], "MGR01");
    Ok(())
}

#[tokio::test]
async fn test_login_trims_whitespace() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;
    let body = r#"{"userid": "  MGR01  ", "password": " 1234 "}"#;
    let (status, value) = post_json(&app, "/login", body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["user_id"], "MGR01");
    Ok(())
}

#[tokio::test]
async fn test_login_verifies_bcrypt_rows() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;
    let token = login(&app, "HASH01", "pw-hash").await?;
    assert!(!token.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_login_rejections() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;

    let (status, value) =
        post_json(&app, "/login", r#"{"userid": "MGR01", "password": "wrong"}"#).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Invalid credentials");

    let (status, value) =
        post_json(&app, "/login", r#"{"userid": "NOBODY", "password": "1234"}"#).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Invalid credentials");

    let (status, value) =
        post_json(&app, "/login", r#"{"userid": "  ", "password": "1234"}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["detail"], "userid & password required");

    let (status, value) = post_json(&app, "/login", "{ not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["detail"], "Invalid JSON");
    Ok(())
}

#[tokio::test]
async fn test_token_gate_distinguishes_missing_invalid_expired() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;

    let (status, value) = get(&app, "/items/", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Token missing");

    let (status, value) = get(&app, "/items/", Some("garbage")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Invalid token");

    // Hand-roll a token whose expiry is well in the past.
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS256),
        &serde_json::json!({
            "sub": "MGR01",
            "exp": chrono::Utc::now().timestamp() - 2 * 24 * 60 * 60,
        }),
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )?;
    let (status, value) = get(&app, "/items/", Some(&expired)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Token expired");
    Ok(())
}

#[tokio::test]
async fn test_items_listing_and_filter() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;
    let token = login(&app, "MGR01", "1234").await?;

    let (status, value) = get(&app, "/items/", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "success");
    assert_eq!(value["count"], 2);
    let items = value["items"].as_array().unwrap();
    assert_eq!(items[0]["item_code"], "ITM001");
    assert_eq!(items[0]["category"], "South Indian");
    assert_eq!(items[0]["rate"], 120.0);
    // ITM002's category code has no category row; the LEFT JOIN keeps it.
    assert_eq!(items[1]["item_code"], "ITM002");
    assert!(items[1]["category"].is_null());

    let (status, value) = get(&app, "/items/?item_code=ITM002", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["count"], 1);
    assert_eq!(value["items"][0]["item_name"], "Filter Coffee");

    let (status, value) = get(&app, "/items/?item_code=NOPE", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "success");
    assert_eq!(value["count"], 0);
    assert_eq!(value["items"].as_array().unwrap().len(), 0);
    Ok(())
}

#[tokio::test]
async fn test_dine_tables_preserve_row_order() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;
    let token = login(&app, "MGR01", "1234").await?;

    let (status, value) = get(&app, "/dine-tables/", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["count"], 2);
    let tables = value["tables"].as_array().unwrap();
    assert_eq!(tables[0]["tableno"], "T02");
    assert_eq!(tables[1]["tableno"], "T01");

    let (_, value) = get(&app, "/dine-tables/?tableno=T01", Some(&token)).await?;
    assert_eq!(value["count"], 1);
    assert_eq!(value["tables"][0]["description"], "Corner");
    Ok(())
}

#[tokio::test]
async fn test_user_settings_and_categories() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;
    let token = login(&app, "MGR01", "1234").await?;

    let (_, value) = get(&app, "/user-settings/?uid=MGR01", Some(&token)).await?;
    assert_eq!(value["count"], 1);
    assert_eq!(value["settings"][0]["code"], "S01");

    let (_, value) = get(&app, "/dine-categories/", Some(&token)).await?;
    assert_eq!(value["count"], 2);

    let (_, value) = get(&app, "/dine-categories/?catagorycode=BV", Some(&token)).await?;
    assert_eq!(value["count"], 1);
    assert_eq!(value["categories"][0]["name"], "Beverages");
    Ok(())
}

#[tokio::test]
async fn test_pair_check_rejections() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;

    let (status, value) = post_json(&app, "/pair-check", r#"{"password": "imc-mobile"}"#).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Invalid password");

    let (status, value) = post_json(&app, "/pair-check", "not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["detail"], "Invalid JSON");
    Ok(())
}

#[tokio::test]
async fn test_pair_check_reports_missing_service_binary() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;

    // No SyncService executable ships next to the test binary.
    let body = serde_json::json!({ "password": TEST_PAIR_PASSWORD }).to_string();
    let (status, value) = post_json(&app, "/pair-check", &body).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let detail = value["detail"].as_str().unwrap_or_default();
    assert!(detail.ends_with("not found"), "detail: {detail}");
    Ok(())
}

#[tokio::test]
async fn test_status_needs_no_token() -> anyhow::Result<()> {
    let (app, _dir) = test_app().await?;

    let (status, value) = get(&app, "/status", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "online");
    assert_eq!(value["primary_ip"], "192.168.1.50");
    assert_eq!(
        value["all_available_ips"],
        serde_json::json!(["192.168.1.50", "192.168.1.51"])
    );
    assert_eq!(
        value["connection_urls"],
        serde_json::json!(["http://192.168.1.50:8000", "http://192.168.1.51:8000"])
    );
    assert_eq!(value["pair_password_hint"], "Password starts with: IMC...");
    assert!(value["server_time"].as_str().is_some());
    assert_eq!(
        value["instructions"]["troubleshooting"]
            .as_array()
            .unwrap()
            .len(),
        4
    );
    Ok(())
}

#[tokio::test]
async fn test_database_failure_is_a_contained_500() -> anyhow::Result<()> {
    sync_anywhere::db::install_drivers();
    let state = test_state(String::new());
    let app = sync_anywhere::router(state);

    let token = sync_anywhere::auth::token::issue("MGR01", TEST_SECRET, Algorithm::HS256)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let (status, value) = get(&app, "/items/", Some(&token)).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value["status"], "error");
    assert_eq!(value["detail"], "no DSN configured");
    Ok(())
}
