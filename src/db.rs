// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dates::{self, DateRange};
use crate::errors::Error;
use crate::models::TransactionRecord;
use crate::summary::WINDOW_MONTHS;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tallybook", "tallybook"));

/// Default database location inside the platform data dir.
pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tallybook.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL,
        category_type TEXT NOT NULL CHECK(category_type IN ('EXPENSE','INCOME','SAVING')),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS sub_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        UNIQUE(category_id, name),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        description TEXT NOT NULL,
        txn_date TEXT NOT NULL,
        txn_type TEXT NOT NULL CHECK(txn_type IN ('EXPENSE','INCOME')),
        category_id INTEGER NOT NULL,
        sub_category_id INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE,
        FOREIGN KEY(sub_category_id) REFERENCES sub_categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(txn_date);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        amount TEXT NOT NULL,
        period TEXT NOT NULL CHECK(period IN ('DAILY','WEEKLY','MONTHLY','YEARLY')),
        is_default INTEGER NOT NULL DEFAULT 0
    );
    "#,
    )?;
    Ok(())
}

/// Inclusive date span of the trailing twelve calendar months ending with
/// the month containing `today`.
pub fn window_range(today: NaiveDate) -> Result<DateRange, Error> {
    let start = dates::shift_months(today, -(WINDOW_MONTHS as i32 - 1))?;
    Ok(DateRange::new(start, dates::last_day_of_month(today)?))
}

/// Loads every transaction inside the dashboard window, newest first.
pub fn load_window_records(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Vec<TransactionRecord>, Error> {
    let range = window_range(today)?;
    let mut stmt = conn.prepare(
        "SELECT t.amount, t.txn_date, t.txn_type, c.name, c.category_type
         FROM transactions t
         JOIN categories c ON c.id = t.category_id
         WHERE t.txn_date BETWEEN ?1 AND ?2
         ORDER BY t.txn_date DESC, t.id DESC",
    )?;
    let mut rows = stmt.query(params![range.start.to_string(), range.end.to_string()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(0)?;
        let date: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let kind_of_category: String = r.get(4)?;
        out.push(TransactionRecord {
            amount: amount.parse::<Decimal>()?,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
            kind: kind.parse()?,
            category_name: r.get(3)?,
            category_kind: kind_of_category.parse()?,
        });
    }
    debug!(from = %range.start, to = %range.end, rows = out.len(), "loaded dashboard window");
    Ok(out)
}
