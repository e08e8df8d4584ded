// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::errors::Error;
use crate::models::CategoryKind;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Largest amount a single transaction or budget may carry (999,999,999,999.99).
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Parses an amount between one cent and [`max_amount`].
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d < Decimal::new(1, 2) {
        return Err(Error::invalid(format!("Amount must be at least 0.01, got {}", d)).into());
    }
    if d > max_amount() {
        return Err(Error::invalid(format!("Amount must be at most {}", max_amount())).into());
    }
    Ok(d)
}

/// Trims `s` and rejects it when nothing is left.
pub fn required(field: &str, s: &str) -> Result<String> {
    let t = s.trim();
    if t.is_empty() {
        return Err(Error::invalid(format!("{} must not be empty", field)).into());
    }
    Ok(t.to_string())
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<(i64, CategoryKind)> {
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, category_type FROM categories WHERE name=?1",
            params![name.trim()],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let (id, kind) =
        row.ok_or_else(|| Error::NotFound(format!("Category '{}' not found", name.trim())))?;
    Ok((id, kind.parse()?))
}

/// Resolves a sub-category by name under `category_id`.
pub fn id_for_sub_category(conn: &Connection, category_id: i64, name: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM sub_categories WHERE category_id=?1 AND name=?2",
            params![category_id, name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = id {
        return Ok(id);
    }
    let elsewhere: Option<i64> = conn
        .query_row(
            "SELECT id FROM sub_categories WHERE name=?1 LIMIT 1",
            params![name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    match elsewhere {
        Some(_) => Err(Error::invalid(format!(
            "Sub-category '{}' does not belong to selected category",
            name.trim()
        ))
        .into()),
        None => Err(Error::NotFound(format!("Sub-category '{}' not found", name.trim())).into()),
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
