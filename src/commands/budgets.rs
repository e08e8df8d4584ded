// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{self, Error};
use crate::models::{Budget, BudgetPeriod};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table, required};
use anyhow::Result;
use rusqlite::{params, Connection};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let b = set(conn, sub)?;
            println!(
                "Budget '{}' set to {} ({})",
                b.name,
                fmt_money(&b.amount),
                b.period
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let n = conn.execute(
                "DELETE FROM budgets WHERE LOWER(name)=LOWER(?1)",
                params![name],
            )?;
            if n == 0 {
                return Err(Error::NotFound("Budget not found".into()).into());
            }
            println!("Removed budget '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

/// Creates the budget or replaces amount and period of the one with the same name.
pub fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<Budget> {
    let name = required("name", sub.get_one::<String>("name").unwrap())?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let period: BudgetPeriod = sub.get_one::<String>("period").unwrap().parse()?;
    let make_default = sub.get_flag("default");

    let tx = conn.unchecked_transaction()?;
    if make_default {
        tx.execute("UPDATE budgets SET is_default=0", [])?;
    }
    tx.execute(
        "INSERT INTO budgets(name, amount, period, is_default) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET amount=excluded.amount, period=excluded.period,
             is_default=MAX(budgets.is_default, excluded.is_default)",
        params![name, amount.to_string(), period.as_str(), make_default],
    )?;
    tx.commit()?;
    info!(budget = %name, %amount, period = %period, "budget set");

    list_budgets(conn)?
        .into_iter()
        .find(|b| b.name == name)
        .ok_or_else(|| Error::NotFound("Budget not found".into()).into())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = list_budgets(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.name.clone(),
                    fmt_money(&b.amount),
                    b.period.to_string(),
                    if b.default_budget { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Budget", "Amount", "Period", "Default"], rows)
        );
    }
    Ok(())
}

/// Budgets with the default one first, then by name ignoring case.
pub fn list_budgets(conn: &Connection) -> errors::Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, amount, period, is_default FROM budgets
         ORDER BY is_default DESC, name COLLATE NOCASE",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(2)?;
        let period: String = r.get(3)?;
        out.push(Budget {
            id: r.get(0)?,
            name: r.get(1)?,
            amount: amount.parse()?,
            period: period.parse()?,
            default_budget: r.get(4)?,
        });
    }
    Ok(out)
}
