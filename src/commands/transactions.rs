// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{self, Error};
use crate::models::{Transaction, TransactionKind};
use crate::utils::{
    fmt_money, id_for_category, id_for_sub_category, maybe_print_json, parse_amount, parse_date,
    parse_decimal, pretty_table, required,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;

pub const MAX_PAGE_SIZE: usize = 200;

const SELECT_TRANSACTION: &str = "SELECT t.id, t.amount, t.description, t.txn_date, t.txn_type, t.category_id, c.name, t.sub_category_id, s.name
     FROM transactions t
     JOIN categories c ON c.id = t.category_id
     JOIN sub_categories s ON s.id = t.sub_category_id";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let t = add(conn, sub)?;
            println!(
                "Recorded {} {} on {} ({} / {})",
                t.kind,
                fmt_money(&t.amount),
                t.date,
                t.category_name,
                t.sub_category_name
            );
        }
        Some(("update", sub)) => {
            let t = update(conn, sub)?;
            println!(
                "Updated transaction #{}: {} {} on {} ({} / {})",
                t.id,
                t.kind,
                fmt_money(&t.amount),
                t.date,
                t.category_name,
                t.sub_category_name
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => {
            let t = fetch(conn, *sub.get_one::<i64>("id").unwrap())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
                println!("{}", pretty_table(&HEADERS, vec![table_row(&t)]));
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(Error::NotFound("Transaction not found".into()).into());
            }
            info!(id, "transaction removed");
            println!("Removed transaction #{}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Reads and validates the writable fields of a transaction of `kind`.
fn read_fields(
    conn: &Connection,
    sub: &clap::ArgMatches,
    id: i64,
    kind: TransactionKind,
) -> Result<Transaction> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let description = required("description", sub.get_one::<String>("description").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let sub_category = sub.get_one::<String>("subcategory").unwrap().trim().to_string();

    let (category_id, category_kind) = id_for_category(conn, &category)?;
    let sub_category_id = id_for_sub_category(conn, category_id, &sub_category)?;
    if !kind.accepts(category_kind) {
        let expected = match kind {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE or SAVING",
        };
        return Err(Error::invalid(format!(
            "Category type must be {} for {} transactions",
            expected,
            kind.as_str().to_lowercase()
        ))
        .into());
    }

    Ok(Transaction {
        id,
        amount,
        description,
        date,
        kind,
        category_id,
        category_name: category,
        sub_category_id,
        sub_category_name: sub_category,
    })
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<Transaction> {
    let kind: TransactionKind = sub.get_one::<String>("kind").unwrap().parse()?;
    let mut t = read_fields(conn, sub, 0, kind)?;
    conn.execute(
        "INSERT INTO transactions(amount, description, txn_date, txn_type, category_id, sub_category_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            t.amount.to_string(),
            t.description,
            t.date.to_string(),
            t.kind.as_str(),
            t.category_id,
            t.sub_category_id
        ],
    )?;
    t.id = conn.last_insert_rowid();
    info!(
        id = t.id,
        date = %t.date,
        amount = %t.amount,
        kind = %t.kind,
        category = %t.category_name,
        "transaction recorded"
    );
    Ok(t)
}

/// Replaces the fields of an existing transaction. Its type cannot change.
pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<Transaction> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let existing = fetch(conn, id)?;
    if let Some(kind) = sub.get_one::<String>("kind") {
        let kind: TransactionKind = kind.parse()?;
        if kind != existing.kind {
            return Err(
                Error::invalid("Changing transaction type is not allowed for updates").into(),
            );
        }
    }
    let t = read_fields(conn, sub, id, existing.kind)?;
    conn.execute(
        "UPDATE transactions SET amount=?1, description=?2, txn_date=?3, category_id=?4, sub_category_id=?5
         WHERE id=?6",
        params![
            t.amount.to_string(),
            t.description,
            t.date.to_string(),
            t.category_id,
            t.sub_category_id,
            id
        ],
    )?;
    info!(
        id,
        date = %t.date,
        amount = %t.amount,
        category = %t.category_name,
        "transaction updated"
    );
    Ok(t)
}

fn from_row(r: &Row<'_>) -> errors::Result<Transaction> {
    let amount: String = r.get(1)?;
    let date: String = r.get(3)?;
    let kind: String = r.get(4)?;
    Ok(Transaction {
        id: r.get(0)?,
        amount: amount.parse()?,
        description: r.get(2)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
        kind: kind.parse()?,
        category_id: r.get(5)?,
        category_name: r.get(6)?,
        sub_category_id: r.get(7)?,
        sub_category_name: r.get(8)?,
    })
}

pub fn fetch(conn: &Connection, id: i64) -> errors::Result<Transaction> {
    let sql = format!("{} WHERE t.id = ?1", SELECT_TRANSACTION);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => from_row(r),
        None => Err(Error::NotFound("Transaction not found".into())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

const HEADERS: [&str; 7] = [
    "Id",
    "Date",
    "Type",
    "Amount",
    "Category",
    "Sub-category",
    "Description",
];

fn table_row(t: &Transaction) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.date.to_string(),
        t.kind.to_string(),
        fmt_money(&t.amount),
        t.category_name.clone(),
        t.sub_category_name.clone(),
        t.description.clone(),
    ]
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let page = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &page)? {
        let rows = page.items.iter().map(table_row).collect();
        println!("{}", pretty_table(&HEADERS, rows));
        println!(
            "page {} of {} ({} transactions)",
            page.page + 1,
            page.total_pages.max(1),
            page.total_elements
        );
    }
    Ok(())
}

fn sort_column(key: &str) -> Result<&'static str> {
    match key {
        "date" => Ok("t.txn_date"),
        "amount" => Ok("CAST(t.amount AS REAL)"),
        "category" => Ok("c.name"),
        "subcategory" => Ok("s.name"),
        _ => Err(Error::invalid(
            "sort must be one of: date, amount, category, subcategory",
        )
        .into()),
    }
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Page<Transaction>> {
    let page = *sub.get_one::<usize>("page").unwrap_or(&0);
    let size = *sub.get_one::<usize>("size").unwrap_or(&10);
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(Error::invalid(format!("size must be between 1 and {}", MAX_PAGE_SIZE)).into());
    }

    let mut filter = String::from(" WHERE 1=1");
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(kind) = sub.get_one::<String>("kind") {
        let kind: TransactionKind = kind.parse()?;
        filter.push_str(" AND t.txn_type=?");
        params_vec.push(kind.as_str().into());
    }
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(Error::invalid("from cannot be after to").into());
        }
    }
    if let Some(f) = from {
        filter.push_str(" AND t.txn_date>=?");
        params_vec.push(f.to_string());
    }
    if let Some(t) = to {
        filter.push_str(" AND t.txn_date<=?");
        params_vec.push(t.to_string());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        filter.push_str(" AND c.name=?");
        params_vec.push(cat.trim().into());
    }
    if let Some(s) = sub.get_one::<String>("subcategory") {
        filter.push_str(" AND s.name=?");
        params_vec.push(s.trim().into());
    }
    if let Some(min) = sub.get_one::<String>("min") {
        filter.push_str(" AND CAST(t.amount AS REAL)>=CAST(? AS REAL)");
        params_vec.push(parse_decimal(min)?.to_string());
    }
    if let Some(max) = sub.get_one::<String>("max") {
        filter.push_str(" AND CAST(t.amount AS REAL)<=CAST(? AS REAL)");
        params_vec.push(parse_decimal(max)?.to_string());
    }

    let sort = sort_column(
        sub.get_one::<String>("sort")
            .map(String::as_str)
            .unwrap_or("date"),
    )?;
    let dir = if sub.get_flag("asc") { "ASC" } else { "DESC" };

    let count_sql = format!(
        "SELECT COUNT(*) FROM transactions t
         JOIN categories c ON c.id = t.category_id
         JOIN sub_categories s ON s.id = t.sub_category_id{}",
        filter
    );
    let total_elements: i64 = conn
        .query_row(
            &count_sql,
            rusqlite::params_from_iter(params_vec.iter()),
            |r| r.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let total_elements = total_elements as usize;
    let total_pages = total_elements.div_ceil(size);
    let offset = page
        .checked_mul(size)
        .filter(|o| *o <= i64::MAX as usize)
        .ok_or_else(|| Error::invalid("page out of range"))?;

    let sql = format!(
        "{}{} ORDER BY {} {}, t.txn_date DESC, t.id DESC LIMIT {} OFFSET {}",
        SELECT_TRANSACTION,
        filter,
        sort,
        dir,
        size,
        offset
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut items = Vec::new();
    while let Some(r) = rows.next()? {
        items.push(from_row(r)?);
    }

    Ok(Page {
        items,
        page,
        size,
        total_elements,
        total_pages,
    })
}
