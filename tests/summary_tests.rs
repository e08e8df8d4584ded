// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tallybook::errors::Error;
use tallybook::models::{CategoryKind, TransactionKind, TransactionRecord};
use tallybook::summary::compute_summary;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn expense(amount: Decimal, date: NaiveDate, name: &str) -> TransactionRecord {
    TransactionRecord {
        amount,
        date,
        kind: TransactionKind::Expense,
        category_name: name.into(),
        category_kind: CategoryKind::Expense,
    }
}

fn income(amount: Decimal, date: NaiveDate, name: &str) -> TransactionRecord {
    TransactionRecord {
        amount,
        date,
        kind: TransactionKind::Income,
        category_name: name.into(),
        category_kind: CategoryKind::Income,
    }
}

fn saving(amount: Decimal, date: NaiveDate, name: &str) -> TransactionRecord {
    TransactionRecord {
        amount,
        date,
        kind: TransactionKind::Expense,
        category_name: name.into(),
        category_kind: CategoryKind::Saving,
    }
}

fn sample_year() -> Vec<TransactionRecord> {
    vec![
        expense(dec!(42.10), d(2024, 3, 14), "Food"),
        expense(dec!(300.00), d(2024, 3, 2), "Rent"),
        saving(dec!(200.00), d(2024, 3, 3), "Pension"),
        income(dec!(2500.00), d(2024, 3, 1), "Salary"),
        expense(dec!(18.35), d(2024, 2, 20), "Food"),
        expense(dec!(300.00), d(2024, 2, 2), "Rent"),
        income(dec!(2500.00), d(2024, 2, 1), "Salary"),
        expense(dec!(75.00), d(2023, 12, 24), "Gifts"),
        expense(dec!(300.00), d(2023, 12, 2), "Rent"),
        expense(dec!(12.00), d(2023, 9, 9), "Transport"),
        expense(dec!(300.00), d(2023, 4, 2), "Rent"),
        income(dec!(2400.00), d(2023, 4, 1), "Salary"),
    ]
}

#[test]
fn current_and_last_month_scenario() {
    let records = vec![
        expense(dec!(100.00), d(2024, 3, 1), "Food"),
        income(dec!(2000.00), d(2024, 3, 5), "Salary"),
        expense(dec!(50.00), d(2024, 2, 10), "Food"),
    ];
    let s = compute_summary(&records, d(2024, 3, 15), 5).unwrap();

    assert_eq!(s.current_month_summary.expense_total, dec!(100.00));
    assert_eq!(s.current_month_summary.income_total, dec!(2000.00));
    assert_eq!(s.current_month_summary.net_amount, dec!(1900.00));
    assert_eq!(s.current_month_summary.saving_amount, Decimal::ZERO);
    assert_eq!(s.current_month_summary.saving_rate_percent, Decimal::ZERO);
    assert_eq!(s.last_month_summary.expense_total, dec!(50.00));
    assert_eq!(s.current_month_total, dec!(100.00));
    assert_eq!(s.last_month_total, dec!(50.00));

    let march = s
        .monthly_totals
        .iter()
        .find(|m| m.year_month == "2024-03")
        .unwrap();
    assert_eq!(march.total, dec!(100.00));
    // income rows count towards the month's entries
    assert_eq!(march.count, 2);
}

#[test]
fn monthly_series_always_has_twelve_chronological_months() {
    let s = compute_summary(&[], d(2024, 3, 15), 3).unwrap();
    let expected: Vec<String> = [
        "2023-04", "2023-05", "2023-06", "2023-07", "2023-08", "2023-09", "2023-10", "2023-11",
        "2023-12", "2024-01", "2024-02", "2024-03",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let totals: Vec<String> = s.monthly_totals.iter().map(|m| m.year_month.clone()).collect();
    let points: Vec<String> = s
        .monthly_income_expense_points
        .iter()
        .map(|m| m.year_month.clone())
        .collect();
    let rates: Vec<String> = s
        .monthly_saving_rate_points
        .iter()
        .map(|m| m.year_month.clone())
        .collect();
    assert_eq!(totals, expected);
    assert_eq!(points, expected);
    assert_eq!(rates, expected);
    assert!(s.monthly_totals.iter().all(|m| m.total.is_zero() && m.count == 0));
    assert!(s.current_month_category_totals.is_empty());
    assert!(s.top_yearly_category_trends.is_empty());
}

#[test]
fn window_wraps_over_new_year() {
    let s = compute_summary(&[], d(2025, 1, 1), 1).unwrap();
    assert_eq!(s.monthly_totals.first().unwrap().year_month, "2024-02");
    assert_eq!(s.monthly_totals.last().unwrap().year_month, "2025-01");
}

#[test]
fn net_and_saving_rate_hold_for_every_period() {
    let s = compute_summary(&sample_year(), d(2024, 3, 15), 5).unwrap();
    let periods = [
        &s.current_month_summary,
        &s.same_period_last_month_summary,
        &s.last30_days_summary,
        &s.last_month_summary,
        &s.last_quarter_summary,
        &s.last_year_summary,
    ];
    for p in periods {
        assert!((p.net_amount - (p.income_total - p.expense_total)).abs() <= dec!(0.01));
        if p.income_total.is_zero() {
            assert!(p.saving_rate_percent.is_zero());
        }
    }
    for point in &s.monthly_income_expense_points {
        assert_eq!(point.net_amount, point.income_total - point.expense_total);
    }
    for point in &s.monthly_saving_rate_points {
        if point.income_total.is_zero() {
            assert!(point.saving_rate_percent.is_zero());
        }
    }
    // 200 pension out of 2500 salary
    assert_eq!(s.current_month_summary.saving_amount, dec!(200.00));
    assert_eq!(s.current_month_summary.saving_rate_percent, dec!(8.00));
    assert_eq!(s.monthly_saving_rate_points[11].saving_rate_percent, dec!(8.00));
}

#[test]
fn named_periods_cover_their_ranges() {
    let s = compute_summary(&sample_year(), d(2024, 3, 15), 5).unwrap();
    // 2024-02-01..=2024-02-15: rent and salary, not the 20th
    assert_eq!(s.same_period_last_month_summary.expense_total, dec!(300.00));
    assert_eq!(s.same_period_last_month_summary.income_total, dec!(2500.00));
    // 2024-02-15..=2024-03-15
    assert_eq!(s.last30_days_total, dec!(560.45));
    // Dec, Jan, Feb
    assert_eq!(s.last_quarter_total, dec!(693.35));
    // 2023-03-17..=2024-03-15 covers everything in the sample
    assert_eq!(s.last_year_total, dec!(1547.45));
    assert_eq!(s.last_year_summary.income_total, dec!(7400.00));
}

#[test]
fn same_period_last_month_clamps_to_month_end() {
    let records = vec![
        expense(dec!(10.00), d(2024, 2, 29), "Food"),
        expense(dec!(99.00), d(2024, 3, 1), "Food"),
    ];
    let s = compute_summary(&records, d(2024, 3, 31), 5).unwrap();
    assert_eq!(s.same_period_last_month_summary.expense_total, dec!(10.00));

    let s = compute_summary(&records, d(2024, 3, 28), 5).unwrap();
    assert!(s.same_period_last_month_summary.expense_total.is_zero());
}

#[test]
fn current_month_categories_rank_descending_with_stable_ties() {
    let records = vec![
        expense(dec!(20.00), d(2024, 3, 10), "Books"),
        expense(dec!(50.00), d(2024, 3, 9), "Food"),
        expense(dec!(20.00), d(2024, 3, 8), "Games"),
        expense(dec!(5.00), d(2024, 3, 7), "Food"),
        income(dec!(900.00), d(2024, 3, 6), "Salary"),
        expense(dec!(500.00), d(2024, 2, 6), "Travel"),
    ];
    let s = compute_summary(&records, d(2024, 3, 15), 5).unwrap();
    let names: Vec<&str> = s
        .current_month_category_totals
        .iter()
        .map(|c| c.category_name.as_str())
        .collect();
    assert_eq!(names, ["Food", "Books", "Games"]);
    assert_eq!(s.current_month_category_totals[0].total, dec!(55.00));
    assert_eq!(s.current_month_category_totals[0].count, 2);
    let sum: Decimal = s.current_month_category_totals.iter().map(|c| c.total).sum();
    assert_eq!(sum, s.current_month_summary.expense_total);
}

#[test]
fn top_yearly_trends_are_ranked_and_truncated() {
    let s = compute_summary(&sample_year(), d(2024, 3, 15), 3).unwrap();
    let names: Vec<&str> = s
        .top_yearly_category_trends
        .iter()
        .map(|t| t.category_name.as_str())
        .collect();
    assert_eq!(names, ["Rent", "Pension", "Gifts"]);
    for t in &s.top_yearly_category_trends {
        assert_eq!(t.monthly_trend.len(), 12);
        let sum: Decimal = t.monthly_trend.iter().map(|m| m.total).sum();
        assert!((sum - t.year_total).abs() <= dec!(0.01));
    }
    let rent = &s.top_yearly_category_trends[0];
    assert_eq!(rent.year_total, dec!(1200.00));
    assert_eq!(rent.monthly_trend[0].year_month, "2023-04");
    assert_eq!(rent.monthly_trend[0].total, dec!(300.00));
    assert_eq!(rent.monthly_trend[0].count, 1);
    assert!(rent.monthly_trend[1].total.is_zero());

    // five distinct expense categories: topN larger than that keeps all
    let all = compute_summary(&sample_year(), d(2024, 3, 15), 10).unwrap();
    assert_eq!(all.top_yearly_category_trends.len(), 5);
    assert!(all
        .top_yearly_category_trends
        .windows(2)
        .all(|w| w[0].year_total >= w[1].year_total));
}

#[test]
fn records_outside_the_window_are_ignored_by_buckets() {
    let records = vec![
        expense(dec!(10.00), d(2023, 3, 31), "Old"),
        expense(dec!(10.00), d(2024, 4, 1), "Future"),
        expense(dec!(1.00), d(2024, 3, 1), "Now"),
    ];
    let s = compute_summary(&records, d(2024, 3, 15), 10).unwrap();
    let counted: usize = s.monthly_totals.iter().map(|m| m.count).sum();
    assert_eq!(counted, 1);
    assert_eq!(s.top_yearly_category_trends.len(), 1);
}

#[test]
fn top_n_outside_range_is_invalid_argument() {
    for n in [0, 11, -3] {
        let err = compute_summary(&sample_year(), d(2024, 3, 15), n).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "topN={}", n);
        assert_eq!(err.to_string(), "topN must be between 1 and 10");
    }
}

#[test]
fn totals_beyond_decimal_range_are_rejected() {
    let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    let records = vec![
        saving(huge, d(2024, 3, 3), "Pension"),
        income(dec!(1), d(2024, 3, 1), "Salary"),
    ];
    let err = compute_summary(&records, d(2024, 3, 15), 5).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let records = vec![
        expense(Decimal::MAX, d(2024, 3, 1), "Rent"),
        expense(Decimal::MAX, d(2024, 3, 2), "Rent"),
    ];
    let err = compute_summary(&records, d(2024, 3, 15), 5).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn repeated_calls_are_identical() {
    let records = sample_year();
    let a = compute_summary(&records, d(2024, 3, 15), 4).unwrap();
    let b = compute_summary(&records, d(2024, 3, 15), 4).unwrap();
    assert_eq!(a, b);
}

#[test]
fn payload_uses_contract_field_names() {
    let s = compute_summary(&sample_year(), d(2024, 3, 15), 2).unwrap();
    let v = serde_json::to_value(&s).unwrap();
    for key in [
        "currentMonthTotal",
        "last30DaysTotal",
        "lastMonthTotal",
        "lastQuarterTotal",
        "lastYearTotal",
        "currentMonthSummary",
        "samePeriodLastMonthSummary",
        "last30DaysSummary",
        "lastMonthSummary",
        "lastQuarterSummary",
        "lastYearSummary",
        "monthlyTotals",
        "monthlyIncomeExpensePoints",
        "monthlySavingRatePoints",
        "currentMonthCategoryTotals",
        "topYearlyCategoryTrends",
    ] {
        assert!(v.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(v["currentMonthSummary"]["savingRatePercent"], 8.0);
    assert_eq!(v["monthlyTotals"][11]["yearMonth"], "2024-03");
    assert!(v["topYearlyCategoryTrends"][0]["monthlyTrend"].is_array());
}
