// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rolling 12-month dashboard summary.
//!
//! [`compute_summary`] is a pure function over a snapshot of transaction
//! records: it buckets them into the twelve calendar months ending at
//! `today`, reduces six named comparison periods, ranks the current month's
//! expense categories and picks the top categories of the trailing year
//! together with their monthly trend.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

use crate::dates::{self, DateRange};
use crate::errors::{Error, Result};
use crate::models::{CategoryKind, TransactionKind, TransactionRecord};

pub const WINDOW_MONTHS: usize = 12;
pub const MIN_TOP_N: i64 = 1;
pub const MAX_TOP_N: i64 = 10;
pub const DEFAULT_TOP_N: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub expense_total: Decimal,
    pub income_total: Decimal,
    pub net_amount: Decimal,
    pub saving_amount: Decimal,
    pub saving_rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub year_month: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeExpensePoint {
    pub year_month: String,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingRatePoint {
    pub year_month: String,
    pub saving_amount: Decimal,
    pub income_total: Decimal,
    pub saving_rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_name: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryYearTrend {
    pub category_name: String,
    pub year_total: Decimal,
    pub monthly_trend: Vec<MonthlyTotal>,
}

/// Dashboard payload. Field names are part of the HTTP contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub current_month_total: Decimal,
    pub last30_days_total: Decimal,
    pub last_month_total: Decimal,
    pub last_quarter_total: Decimal,
    pub last_year_total: Decimal,
    pub current_month_summary: PeriodSummary,
    pub same_period_last_month_summary: PeriodSummary,
    pub last30_days_summary: PeriodSummary,
    pub last_month_summary: PeriodSummary,
    pub last_quarter_summary: PeriodSummary,
    pub last_year_summary: PeriodSummary,
    pub monthly_totals: Vec<MonthlyTotal>,
    pub monthly_income_expense_points: Vec<IncomeExpensePoint>,
    pub monthly_saving_rate_points: Vec<SavingRatePoint>,
    pub current_month_category_totals: Vec<CategoryTotal>,
    pub top_yearly_category_trends: Vec<CategoryYearTrend>,
}

/// Rounds an accumulated currency figure to cents, half away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn validate_top_n(top_n: i64) -> Result<usize> {
    if !(MIN_TOP_N..=MAX_TOP_N).contains(&top_n) {
        return Err(Error::invalid(format!(
            "topN must be between {} and {}",
            MIN_TOP_N, MAX_TOP_N
        )));
    }
    Ok(top_n as usize)
}

fn out_of_range() -> Error {
    Error::invalid("Amount totals exceed the supported range")
}

fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal> {
    total.checked_add(amount).ok_or_else(out_of_range)
}

/// Unrounded sums over a set of records.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    expense: Decimal,
    income: Decimal,
    saving: Decimal,
    count: usize,
}

impl Totals {
    fn of<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        records.into_iter().try_fold(Totals::default(), Totals::add)
    }

    fn add(self, r: &TransactionRecord) -> Result<Self> {
        let mut next = self;
        match r.kind {
            TransactionKind::Expense => next.expense = checked_sum(next.expense, r.amount)?,
            TransactionKind::Income => next.income = checked_sum(next.income, r.amount)?,
        }
        // Saving is keyed on the category, independent of the transaction kind.
        if r.category_kind == CategoryKind::Saving {
            next.saving = checked_sum(next.saving, r.amount)?;
        }
        next.count += 1;
        Ok(next)
    }

    fn saving_rate(&self) -> Result<Decimal> {
        if self.income <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        self.saving
            .checked_div(self.income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(out_of_range)
    }

    fn summary(&self) -> Result<PeriodSummary> {
        let net = self.income.checked_sub(self.expense).ok_or_else(out_of_range)?;
        Ok(PeriodSummary {
            expense_total: round_currency(self.expense),
            income_total: round_currency(self.income),
            net_amount: round_currency(net),
            saving_amount: round_currency(self.saving),
            saving_rate_percent: round_currency(self.saving_rate()?),
        })
    }
}

/// The twelve calendar months ending with the month containing `today`.
struct MonthWindow {
    first_index: i32,
    keys: Vec<String>,
}

impl MonthWindow {
    fn ending_at(today: NaiveDate) -> Result<Self> {
        let start = dates::shift_months(today, -(WINDOW_MONTHS as i32 - 1))?;
        let keys = (0..WINDOW_MONTHS as i32)
            .map(|i| dates::shift_months(start, i).map(dates::month_key))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            first_index: month_index(start),
            keys,
        })
    }

    fn slot(&self, date: NaiveDate) -> Option<usize> {
        let offset = month_index(date) - self.first_index;
        (0..WINDOW_MONTHS as i32)
            .contains(&offset)
            .then_some(offset as usize)
    }

    /// Assigns every record to its month; records outside the window are dropped.
    fn bucket<'a>(&self, records: &'a [TransactionRecord]) -> Vec<Vec<&'a TransactionRecord>> {
        records.iter().fold(
            vec![Vec::new(); WINDOW_MONTHS],
            |mut buckets, r| {
                if let Some(slot) = self.slot(r.date) {
                    buckets[slot].push(r);
                }
                buckets
            },
        )
    }
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// The six named comparison periods, anchored at `today`.
#[derive(Debug, Clone, Copy)]
struct Periods {
    current_month: DateRange,
    same_period_last_month: DateRange,
    last_30_days: DateRange,
    last_month: DateRange,
    last_quarter: DateRange,
    last_year: DateRange,
}

impl Periods {
    fn anchored_at(today: NaiveDate) -> Result<Self> {
        let current = dates::first_day_of_month(today);
        let previous = dates::shift_months(current, -1)?;
        Ok(Self {
            current_month: DateRange::month(current)?,
            same_period_last_month: DateRange::new(
                previous,
                dates::clamp_day(previous, today.day())?,
            ),
            last_30_days: DateRange::new(today - Duration::days(29), today),
            last_month: DateRange::month(previous)?,
            last_quarter: DateRange::new(
                dates::shift_months(current, -3)?,
                dates::last_day_of_month(previous)?,
            ),
            last_year: DateRange::new(today - Duration::days(364), today),
        })
    }
}

fn summarize(records: &[TransactionRecord], range: DateRange) -> Result<PeriodSummary> {
    Totals::of(records.iter().filter(|r| range.contains(r.date)))?.summary()
}

/// Expense totals per category name, in order of first appearance.
#[derive(Debug, Clone)]
struct CategoryGroup<'a> {
    name: &'a str,
    total: Decimal,
    count: usize,
    monthly: [(Decimal, usize); WINDOW_MONTHS],
}

impl<'a> CategoryGroup<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            total: Decimal::ZERO,
            count: 0,
            monthly: [(Decimal::ZERO, 0); WINDOW_MONTHS],
        }
    }
}

/// Groups `EXPENSE` records by category name, preserving encounter order.
fn group_expenses<'a, I>(records: I) -> Result<Vec<CategoryGroup<'a>>>
where
    I: IntoIterator<Item = (usize, &'a TransactionRecord)>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for (slot, r) in records {
        if r.kind != TransactionKind::Expense {
            continue;
        }
        let name = r.category_name.as_str();
        let pos = *index.entry(name).or_insert_with(|| {
            groups.push(CategoryGroup::new(name));
            groups.len() - 1
        });
        let group = &mut groups[pos];
        group.total = checked_sum(group.total, r.amount)?;
        group.count += 1;
        group.monthly[slot].0 = checked_sum(group.monthly[slot].0, r.amount)?;
        group.monthly[slot].1 += 1;
    }
    Ok(groups)
}

pub fn compute_summary(
    records: &[TransactionRecord],
    today: NaiveDate,
    top_n: i64,
) -> Result<SummaryResponse> {
    let top_n = validate_top_n(top_n)?;
    debug!(records = records.len(), %today, top_n, "computing dashboard summary");

    let window = MonthWindow::ending_at(today)?;
    let buckets = window.bucket(records);
    let periods = Periods::anchored_at(today)?;

    let monthly: Vec<Totals> = buckets
        .iter()
        .map(|b| Totals::of(b.iter().copied()))
        .collect::<Result<_>>()?;
    let monthly_summaries: Vec<PeriodSummary> =
        monthly.iter().map(Totals::summary).collect::<Result<_>>()?;

    let monthly_totals = window
        .keys
        .iter()
        .zip(&monthly)
        .map(|(key, t)| MonthlyTotal {
            year_month: key.clone(),
            total: round_currency(t.expense),
            // Counts every record in the month, income included.
            count: t.count,
        })
        .collect();

    let monthly_income_expense_points = window
        .keys
        .iter()
        .zip(&monthly_summaries)
        .map(|(key, s)| IncomeExpensePoint {
            year_month: key.clone(),
            income_total: s.income_total,
            expense_total: s.expense_total,
            net_amount: s.net_amount,
        })
        .collect();

    let monthly_saving_rate_points = window
        .keys
        .iter()
        .zip(&monthly_summaries)
        .map(|(key, s)| SavingRatePoint {
            year_month: key.clone(),
            saving_amount: s.saving_amount,
            income_total: s.income_total,
            saving_rate_percent: s.saving_rate_percent,
        })
        .collect();

    let current_month_summary = summarize(records, periods.current_month)?;
    let same_period_last_month_summary = summarize(records, periods.same_period_last_month)?;
    let last30_days_summary = summarize(records, periods.last_30_days)?;
    let last_month_summary = summarize(records, periods.last_month)?;
    let last_quarter_summary = summarize(records, periods.last_quarter)?;
    let last_year_summary = summarize(records, periods.last_year)?;

    let current_slot = WINDOW_MONTHS - 1;
    let mut current_month_category_totals: Vec<CategoryTotal> =
        group_expenses(buckets[current_slot].iter().map(|r| (current_slot, *r)))?
            .into_iter()
            .map(|g| CategoryTotal {
                category_name: g.name.to_string(),
                total: round_currency(g.total),
                count: g.count,
            })
            .collect();
    // sort_by is stable: ties keep first-appearance order.
    current_month_category_totals.sort_by(|a, b| b.total.cmp(&a.total));

    let mut top_yearly_category_trends: Vec<CategoryYearTrend> = group_expenses(
        buckets
            .iter()
            .enumerate()
            .flat_map(|(slot, b)| b.iter().map(move |r| (slot, *r))),
    )?
    .into_iter()
    .map(|g| CategoryYearTrend {
        category_name: g.name.to_string(),
        year_total: round_currency(g.total),
        monthly_trend: window
            .keys
            .iter()
            .zip(g.monthly.iter())
            .map(|(key, (sum, count))| MonthlyTotal {
                year_month: key.clone(),
                total: round_currency(*sum),
                count: *count,
            })
            .collect(),
    })
    .collect();
    top_yearly_category_trends.sort_by(|a, b| b.year_total.cmp(&a.year_total));
    top_yearly_category_trends.truncate(top_n);

    Ok(SummaryResponse {
        current_month_total: current_month_summary.expense_total,
        last30_days_total: last30_days_summary.expense_total,
        last_month_total: last_month_summary.expense_total,
        last_quarter_total: last_quarter_summary.expense_total,
        last_year_total: last_year_summary.expense_total,
        current_month_summary,
        same_period_last_month_summary,
        last30_days_summary,
        last_month_summary,
        last_quarter_summary,
        last_year_summary,
        monthly_totals,
        monthly_income_expense_points,
        monthly_saving_rate_points,
        current_month_category_totals,
        top_yearly_category_trends,
    })
}
