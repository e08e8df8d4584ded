// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use rusqlite::{params, Connection};
use tallybook::commands::dashboard;
use tallybook::models::{CategoryKind, TransactionKind};
use tallybook::{cli, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO categories(id, name, description, category_type) VALUES
            (1, 'Food', 'Eating', 'EXPENSE'),
            (2, 'Salary', 'Pay', 'INCOME'),
            (3, 'Pension', 'Later', 'SAVING');
        INSERT INTO sub_categories(id, name, category_id) VALUES
            (1, 'Groceries', 1), (2, 'Payroll', 2), (3, 'Fund', 3);
        "#,
    )
    .unwrap();
    let rows = [
        ("100.00", "2024-03-01", "EXPENSE", 1, 1),
        ("2000.00", "2024-03-05", "INCOME", 2, 2),
        ("250.00", "2024-03-06", "EXPENSE", 3, 3),
        ("50.00", "2024-02-10", "EXPENSE", 1, 1),
        ("70.00", "2023-04-01", "EXPENSE", 1, 1),
        // outside the window on both sides
        ("999.00", "2023-03-31", "EXPENSE", 1, 1),
        ("999.00", "2024-04-01", "EXPENSE", 1, 1),
    ];
    for (amount, date, kind, cat, sub) in rows {
        conn.execute(
            "INSERT INTO transactions(amount, description, txn_date, txn_type, category_id, sub_category_id)
             VALUES (?1, 'seed', ?2, ?3, ?4, ?5)",
            params![amount, date, kind, cat, sub],
        )
        .unwrap();
    }
    conn
}

#[test]
fn window_loader_keeps_twelve_months_newest_first() {
    let conn = setup();
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let range = db::window_range(today).unwrap();
    assert_eq!(range.start.to_string(), "2023-04-01");
    assert_eq!(range.end.to_string(), "2024-03-31");

    let records = db::load_window_records(&conn, today).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[0].date.to_string(), "2024-03-06");
    assert_eq!(records[0].category_kind, CategoryKind::Saving);
    assert_eq!(records[0].kind, TransactionKind::Expense);
    assert_eq!(records.last().unwrap().date.to_string(), "2023-04-01");
}

#[test]
fn summary_command_uses_reference_date_and_top_n() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "tallybook", "dashboard", "summary", "--today", "2024-03-15", "--top-n", "1",
    ]);
    let (_, dash_m) = matches.subcommand().unwrap();
    let (_, summary_m) = dash_m.subcommand().unwrap();
    let s = dashboard::summary(&conn, summary_m, 5).unwrap();

    assert_eq!(s.current_month_summary.expense_total, dec!(350.00));
    assert_eq!(s.current_month_summary.income_total, dec!(2000.00));
    assert_eq!(s.current_month_summary.saving_amount, dec!(250.00));
    assert_eq!(s.current_month_summary.saving_rate_percent, dec!(12.50));
    assert_eq!(s.last_month_total, dec!(50.00));
    assert_eq!(s.monthly_totals[0].total, dec!(70.00));
    assert_eq!(s.monthly_totals[11].count, 3);
    assert_eq!(s.top_yearly_category_trends.len(), 1);
    assert_eq!(s.top_yearly_category_trends[0].category_name, "Pension");
    assert_eq!(s.current_month_category_totals[0].category_name, "Pension");
    assert_eq!(s.current_month_category_totals[1].total, dec!(100.00));
}

#[test]
fn summary_command_rejects_out_of_range_top_n() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "tallybook", "dashboard", "summary", "--today", "2024-03-15", "--top-n", "11",
    ]);
    let (_, dash_m) = matches.subcommand().unwrap();
    let (_, summary_m) = dash_m.subcommand().unwrap();
    let err = dashboard::summary(&conn, summary_m, 5).unwrap_err();
    assert_eq!(err.to_string(), "topN must be between 1 and 10");
}
