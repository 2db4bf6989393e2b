//! Response records for the venue catalog.
//!
//! Flat projections of relational rows; each record maps its query's columns
//! positionally, so row order and column order both follow the SQL.

use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

/// One menu item joined with its category name.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub rate: Option<f64>,
    pub rate1: Option<f64>,
    pub rate2: Option<f64>,
    pub kitchen: Option<String>,
    pub activity: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub taxper: Option<f64>,
    pub longname: Option<String>,
}

impl Item {
    pub fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            item_code: row.try_get(0)?,
            item_name: row.try_get(1)?,
            rate: row.try_get(2)?,
            rate1: row.try_get(3)?,
            rate2: row.try_get(4)?,
            kitchen: row.try_get(5)?,
            activity: row.try_get(6)?,
            image: row.try_get(7)?,
            category: row.try_get(8)?,
            taxper: row.try_get(9)?,
            longname: row.try_get(10)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DineTable {
    pub tableno: Option<String>,
    pub description: Option<String>,
    pub section: Option<String>,
}

impl DineTable {
    pub fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tableno: row.try_get(0)?,
            description: row.try_get(1)?,
            section: row.try_get(2)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSetting {
    pub uid: Option<String>,
    pub code: Option<String>,
}

impl UserSetting {
    pub fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get(0)?,
            code: row.try_get(1)?,
        })
    }
}

/// Category code keeps its historical spelling; it is the venue schema's
/// column name and the mobile client filters by it verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct DineCategory {
    pub catagorycode: Option<String>,
    pub name: Option<String>,
}

impl DineCategory {
    pub fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            catagorycode: row.try_get(0)?,
            name: row.try_get(1)?,
        })
    }
}
