//! Read-only catalog endpoints over the venue database.
//!
//! Every endpoint follows the same shape: one fixed parameterized SELECT,
//! optionally narrowed by a single filter key, rows mapped positionally into
//! response records in query order. Database failures become a 500 with a
//! `{"status":"error"}` body; the handler never panics.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::any::AnyRow;
use tracing::warn;

use crate::config::AppState;
use crate::db::DbError;
use crate::models::{DineCategory, DineTable, Item, UserSetting};

const ITEMS_SQL: &str = "\
SELECT
    i.item_code,
    i.item_name,
    i.rate,
    i.rate1,
    i.rate2,
    i.kitchen,
    i.activity,
    i.image,
    c.name,
    i.taxper,
    i.longname
FROM tb_item_master i
LEFT JOIN dine_itemcategory c
    ON i.category = c.code";

const DINE_TABLES_SQL: &str = "SELECT tableno, description, section FROM dine_tables";

const USER_SETTINGS_SQL: &str = "SELECT uid, code FROM acc_userssettings";

const DINE_CATEGORIES_SQL: &str = "SELECT catagorycode, name FROM dine_catagory";

#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub item_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub status: &'static str,
    pub count: usize,
    pub items: Vec<Item>,
}

/// GET /items/ with optional `item_code` filter.
pub async fn get_items(
    State(state): State<AppState>,
    Query(query): Query<ItemsQuery>,
) -> Response {
    let rows = match fetch_filtered(&state, ITEMS_SQL, "i.item_code", &query.item_code).await {
        Ok(rows) => rows,
        Err(e) => return db_error(e),
    };
    match map_rows(&rows, Item::from_row) {
        Ok(items) => Json(ItemsResponse {
            status: "success",
            count: items.len(),
            items,
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct DineTablesQuery {
    pub tableno: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DineTablesResponse {
    pub status: &'static str,
    pub count: usize,
    pub tables: Vec<DineTable>,
}

/// GET /dine-tables/ with optional `tableno` filter.
pub async fn get_dine_tables(
    State(state): State<AppState>,
    Query(query): Query<DineTablesQuery>,
) -> Response {
    let rows = match fetch_filtered(&state, DINE_TABLES_SQL, "tableno", &query.tableno).await {
        Ok(rows) => rows,
        Err(e) => return db_error(e),
    };
    match map_rows(&rows, DineTable::from_row) {
        Ok(tables) => Json(DineTablesResponse {
            status: "success",
            count: tables.len(),
            tables,
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UserSettingsQuery {
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserSettingsResponse {
    pub status: &'static str,
    pub count: usize,
    pub settings: Vec<UserSetting>,
}

/// GET /user-settings/ with optional `uid` filter.
pub async fn get_user_settings(
    State(state): State<AppState>,
    Query(query): Query<UserSettingsQuery>,
) -> Response {
    let rows = match fetch_filtered(&state, USER_SETTINGS_SQL, "uid", &query.uid).await {
        Ok(rows) => rows,
        Err(e) => return db_error(e),
    };
    match map_rows(&rows, UserSetting::from_row) {
        Ok(settings) => Json(UserSettingsResponse {
            status: "success",
            count: settings.len(),
            settings,
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct DineCategoriesQuery {
    pub catagorycode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DineCategoriesResponse {
    pub status: &'static str,
    pub count: usize,
    pub categories: Vec<DineCategory>,
}

/// GET /dine-categories/ with optional `catagorycode` filter
/// (historical spelling from the venue schema).
pub async fn get_dine_categories(
    State(state): State<AppState>,
    Query(query): Query<DineCategoriesQuery>,
) -> Response {
    let rows = match fetch_filtered(
        &state,
        DINE_CATEGORIES_SQL,
        "catagorycode",
        &query.catagorycode,
    )
    .await
    {
        Ok(rows) => rows,
        Err(e) => return db_error(e),
    };
    match map_rows(&rows, DineCategory::from_row) {
        Ok(categories) => Json(DineCategoriesResponse {
            status: "success",
            count: categories.len(),
            categories,
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

/// Run `base_sql`, appending `WHERE <column> = ?` when a filter value is
/// present. The column name is a compile-time constant from this module;
/// only the value is ever bound.
async fn fetch_filtered(
    state: &AppState,
    base_sql: &str,
    column: &str,
    filter: &Option<String>,
) -> Result<Vec<AnyRow>, DbError> {
    match filter {
        Some(value) => {
            let sql = format!("{base_sql}\nWHERE {column} = ?");
            state.settings.db.fetch_all(&sql, &[value.as_str()]).await
        }
        None => state.settings.db.fetch_all(base_sql, &[]).await,
    }
}

fn map_rows<T>(
    rows: &[AnyRow],
    map: impl Fn(&AnyRow) -> Result<T, sqlx::Error>,
) -> Result<Vec<T>, DbError> {
    rows.iter()
        .map(|row| map(row).map_err(|e| DbError::Query(e.to_string())))
        .collect()
}

fn db_error(err: DbError) -> Response {
    warn!("[Catalog] database failure: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "detail": err.to_string() })),
    )
        .into_response()
}
