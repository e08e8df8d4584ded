// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{self, Error};
use crate::models::{Category, CategoryKind, SubCategory, TransactionKind};
use crate::utils::{maybe_print_json, pretty_table, required};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let c = add(conn, sub)?;
            println!("Added category '{}' ({})", c.name, c.kind);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => {
            let c = update(conn, sub)?;
            println!("Updated category #{} '{}' ({})", c.id, c.name, c.kind);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let n = conn.execute("DELETE FROM categories WHERE name=?1", params![name.trim()])?;
            if n == 0 {
                return Err(Error::NotFound(format!("Category '{}' not found", name.trim())).into());
            }
            info!(category = %name.trim(), "category removed");
            println!("Removed category '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}

fn read_fields(sub: &clap::ArgMatches) -> Result<(String, String, Option<CategoryKind>)> {
    let name = required("name", sub.get_one::<String>("name").unwrap())?;
    let description = required("description", sub.get_one::<String>("description").unwrap())?;
    let kind = sub
        .get_one::<String>("kind")
        .map(|k| k.parse::<CategoryKind>())
        .transpose()?;
    Ok((name, description, kind))
}

fn name_taken(conn: &Connection, name: &str, except: Option<i64>) -> Result<bool> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE LOWER(name)=LOWER(?1)",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(matches!(id, Some(id) if Some(id) != except))
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<Category> {
    let (name, description, kind) = read_fields(sub)?;
    let kind = kind.unwrap_or(CategoryKind::Expense);
    if name_taken(conn, &name, None)? {
        return Err(Error::Conflict("Category already exists".into()).into());
    }
    conn.execute(
        "INSERT INTO categories(name, description, category_type) VALUES (?1, ?2, ?3)",
        params![name, description, kind.as_str()],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, category = %name, kind = %kind, "category added");
    Ok(Category {
        id,
        name,
        description,
        kind,
        sub_categories: Vec::new(),
    })
}

pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<Category> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let (name, description, kind) = read_fields(sub)?;
    let current: Option<String> = conn
        .query_row(
            "SELECT category_type FROM categories WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(current) = current else {
        return Err(Error::NotFound("Category not found".into()).into());
    };
    let current: CategoryKind = current.parse()?;
    let kind = kind.unwrap_or(current);
    if name_taken(conn, &name, Some(id))? {
        return Err(Error::Conflict("Category already exists".into()).into());
    }
    if kind != current && !transactions_fit(conn, id, kind)? {
        return Err(Error::Conflict(format!(
            "Category has transactions that cannot be booked against type {}",
            kind
        ))
        .into());
    }
    conn.execute(
        "UPDATE categories SET name=?1, description=?2, category_type=?3 WHERE id=?4",
        params![name, description, kind.as_str(), id],
    )?;
    info!(id, category = %name, "category updated");
    Ok(Category {
        id,
        name,
        description,
        kind,
        sub_categories: list_sub_categories(conn, Some(id))?,
    })
}

/// Whether every transaction booked against category `id` is still valid for `kind`.
fn transactions_fit(conn: &Connection, id: i64, kind: CategoryKind) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT DISTINCT txn_type FROM transactions WHERE category_id=?1")?;
    let rows = stmt.query_map(params![id], |r| r.get::<_, String>(0))?;
    for row in rows {
        let txn_kind: TransactionKind = row?.parse()?;
        if !txn_kind.accepts(kind) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = list_categories(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.kind.to_string(),
                    c.description.clone(),
                    c.sub_categories
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Category", "Type", "Description", "Sub-categories"], rows)
        );
    }
    Ok(())
}

/// All categories ordered by name, each with its sub-categories.
pub fn list_categories(conn: &Connection) -> errors::Result<Vec<Category>> {
    let mut by_category: HashMap<i64, Vec<SubCategory>> = HashMap::new();
    for s in list_sub_categories(conn, None)? {
        by_category.entry(s.category_id).or_default().push(s);
    }
    let mut stmt =
        conn.prepare("SELECT id, name, description, category_type FROM categories ORDER BY name")?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let kind: String = r.get(3)?;
        out.push(Category {
            id,
            name: r.get(1)?,
            description: r.get(2)?,
            kind: kind.parse()?,
            sub_categories: by_category.remove(&id).unwrap_or_default(),
        });
    }
    Ok(out)
}

pub fn list_sub_categories(
    conn: &Connection,
    category_id: Option<i64>,
) -> errors::Result<Vec<SubCategory>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.category_id, c.name
         FROM sub_categories s JOIN categories c ON c.id = s.category_id
         WHERE ?1 IS NULL OR s.category_id = ?1
         ORDER BY c.name, s.name",
    )?;
    let rows = stmt.query_map(params![category_id], |r| {
        Ok(SubCategory {
            id: r.get(0)?,
            name: r.get(1)?,
            category_id: r.get(2)?,
            category_name: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
