// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_window_records;
use crate::summary::{compute_summary, PeriodSummary, SummaryResponse};
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches, default_top_n: i64) -> Result<()> {
    if let Some(("summary", sub)) = m.subcommand() {
        let summary = summary(conn, sub, default_top_n)?;
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
            print_summary(&summary);
        }
    }
    Ok(())
}

pub fn summary(
    conn: &Connection,
    sub: &clap::ArgMatches,
    default_top_n: i64,
) -> Result<SummaryResponse> {
    let top_n = sub.get_one::<i64>("top-n").copied().unwrap_or(default_top_n);
    let today: NaiveDate = match sub.get_one::<String>("today") {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let records = load_window_records(conn, today).context("Load dashboard window")?;
    let summary = compute_summary(&records, today, top_n)?;
    info!(%today, top_n, records = records.len(), "dashboard summary computed");
    Ok(summary)
}

fn period_row(label: &str, p: &PeriodSummary) -> Vec<String> {
    vec![
        label.to_string(),
        fmt_money(&p.expense_total),
        fmt_money(&p.income_total),
        fmt_money(&p.net_amount),
        fmt_money(&p.saving_amount),
        format!("{}%", fmt_money(&p.saving_rate_percent)),
    ]
}

fn print_summary(s: &SummaryResponse) {
    let periods = vec![
        period_row("Current month", &s.current_month_summary),
        period_row("Same period last month", &s.same_period_last_month_summary),
        period_row("Last 30 days", &s.last30_days_summary),
        period_row("Last month", &s.last_month_summary),
        period_row("Last quarter", &s.last_quarter_summary),
        period_row("Last year", &s.last_year_summary),
    ];
    println!(
        "{}",
        pretty_table(
            &["Period", "Expense", "Income", "Net", "Saving", "Saving rate"],
            periods
        )
    );

    let months = s
        .monthly_totals
        .iter()
        .zip(&s.monthly_income_expense_points)
        .zip(&s.monthly_saving_rate_points)
        .map(|((t, ie), sr)| {
            vec![
                t.year_month.clone(),
                fmt_money(&ie.expense_total),
                fmt_money(&ie.income_total),
                fmt_money(&ie.net_amount),
                format!("{}%", fmt_money(&sr.saving_rate_percent)),
                t.count.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Month", "Expense", "Income", "Net", "Saving rate", "Entries"],
            months
        )
    );

    let cats = s
        .current_month_category_totals
        .iter()
        .map(|c| vec![c.category_name.clone(), fmt_money(&c.total), c.count.to_string()])
        .collect();
    println!(
        "{}",
        pretty_table(&["Category (this month)", "Spent", "Entries"], cats)
    );

    let trends = s
        .top_yearly_category_trends
        .iter()
        .map(|t| {
            let spark = t
                .monthly_trend
                .iter()
                .map(|m| fmt_money(&m.total))
                .collect::<Vec<_>>()
                .join(" ");
            vec![t.category_name.clone(), fmt_money(&t.year_total), spark]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Top category (12 months)", "Total", "Monthly"], trends)
    );
}
