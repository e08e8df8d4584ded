// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::categories::list_sub_categories;
use crate::errors::Error;
use crate::models::SubCategory;
use crate::utils::{id_for_category, maybe_print_json, pretty_table, required};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let s = add(conn, sub)?;
            println!(
                "Added sub-category #{} '{}' under '{}'",
                s.id, s.name, s.category_name
            );
        }
        Some(("update", sub)) => {
            let s = update(conn, sub)?;
            println!(
                "Updated sub-category #{} '{}' under '{}'",
                s.id, s.name, s.category_name
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let n = conn.execute("DELETE FROM sub_categories WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(Error::NotFound("Sub-category not found".into()).into());
            }
            println!("Removed sub-category #{}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<SubCategory> {
    let name = required("name", sub.get_one::<String>("name").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let (category_id, _) = id_for_category(conn, &category)?;
    let exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM sub_categories WHERE category_id=?1 AND name=?2",
            params![category_id, name],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_some() {
        return Err(Error::Conflict(format!(
            "Sub-category '{}' already exists under '{}'",
            name, category
        ))
        .into());
    }
    conn.execute(
        "INSERT INTO sub_categories(name, category_id) VALUES (?1, ?2)",
        params![name, category_id],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, sub_category = %name, category = %category, "sub-category added");
    Ok(SubCategory {
        id,
        name,
        category_id,
        category_name: category,
    })
}

/// Renames a sub-category or moves it under another category. A sub-category
/// that already has transactions stays with its category.
pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<SubCategory> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let name = required("name", sub.get_one::<String>("name").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let (category_id, _) = id_for_category(conn, &category)?;

    let current: Option<i64> = conn
        .query_row(
            "SELECT category_id FROM sub_categories WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(current_category) = current else {
        return Err(Error::NotFound("Sub-category not found".into()).into());
    };

    let clash: Option<i64> = conn
        .query_row(
            "SELECT id FROM sub_categories WHERE category_id=?1 AND name=?2 AND id<>?3",
            params![category_id, name, id],
            |r| r.get(0),
        )
        .optional()?;
    if clash.is_some() {
        return Err(Error::Conflict(format!(
            "Sub-category '{}' already exists under '{}'",
            name, category
        ))
        .into());
    }

    if current_category != category_id {
        let used: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE sub_category_id=?1",
            params![id],
            |r| r.get(0),
        )?;
        if used > 0 {
            return Err(Error::Conflict(format!(
                "Sub-category has {} transactions and cannot move to another category",
                used
            ))
            .into());
        }
    }

    conn.execute(
        "UPDATE sub_categories SET name=?1, category_id=?2 WHERE id=?3",
        params![name, category_id, id],
    )?;
    info!(id, sub_category = %name, category = %category, "sub-category updated");
    Ok(SubCategory {
        id,
        name,
        category_id,
        category_name: category,
    })
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = match sub.get_one::<String>("category") {
        Some(name) => Some(id_for_category(conn, name)?.0),
        None => None,
    };
    let data = list_sub_categories(conn, filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| vec![s.id.to_string(), s.category_name.clone(), s.name.clone()])
            .collect();
        println!("{}", pretty_table(&["Id", "Category", "Sub-category"], rows));
    }
    Ok(())
}
