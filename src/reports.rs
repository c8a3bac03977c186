//! Read-only aggregations, recomputed from the store on every call.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PosResult;
use crate::models::{Expense, Sale, Shift};
use crate::shifts;
use crate::store::{keys, Store};

const MS_IN_DAY: i64 = 24 * 60 * 60 * 1000;

/// Rolling windows measured back from "now", not calendar-aligned.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    #[serde(alias = "today")]
    Day,
    Week,
    Month,
    All,
}

impl TimeRange {
    pub fn contains(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let diff_days = (now - date).num_milliseconds().div_euclid(MS_IN_DAY);
        match self {
            TimeRange::Day => diff_days < 1,
            TimeRange::Week => diff_days < 7,
            TimeRange::Month => diff_days < 30,
            TimeRange::All => true,
        }
    }
}

pub fn format_money(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn payment_breakdown(sales: &[Sale]) -> BTreeMap<String, f64> {
    let mut breakdown = BTreeMap::new();
    for sale in sales {
        let method = sale
            .payment_method
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        *breakdown.entry(method).or_insert(0.0) += sale.total;
    }
    breakdown
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub total: f64,
    pub count: usize,
    pub by_payment_method: BTreeMap<String, f64>,
}

pub fn sales_totals(sales: &[Sale]) -> SalesTotals {
    SalesTotals {
        total: sales.iter().map(|s| s.total).sum(),
        count: sales.len(),
        by_payment_method: payment_breakdown(sales),
    }
}

pub fn sales_history(store: &Store, range: TimeRange, now: DateTime<Utc>) -> PosResult<Vec<Sale>> {
    let sales: Vec<Sale> = store.view(keys::SALES)?;
    let mut filtered: Vec<Sale> = sales
        .into_iter()
        .filter(|s| range.contains(s.date, now))
        .collect();
    filtered.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(filtered)
}

pub fn expense_history(
    store: &Store,
    range: TimeRange,
    now: DateTime<Utc>,
) -> PosResult<Vec<Expense>> {
    let expenses: Vec<Expense> = store.view(keys::EXPENSES)?;
    let mut filtered: Vec<Expense> = expenses
        .into_iter()
        .filter(|e| range.contains(e.date, now))
        .collect();
    filtered.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(filtered)
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReport {
    pub shift: Shift,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
    pub payment_breakdown: BTreeMap<String, f64>,
    pub total_sales: f64,
    pub total_expenses: f64,
}

/// Every shift, newest first, with its sales and expenses.
pub fn shift_history(store: &Store) -> PosResult<Vec<ShiftReport>> {
    let sales: Vec<Sale> = store.view(keys::SALES)?;
    let expenses: Vec<Expense> = store.view(keys::EXPENSES)?;

    let reports = shifts::list_shifts(store)?
        .into_iter()
        .map(|shift| {
            let shift_sales: Vec<Sale> = sales
                .iter()
                .filter(|s| s.shift_id == shift.id)
                .cloned()
                .collect();
            let summary = shifts::summarize(&sales, &expenses, shift.id);
            ShiftReport {
                shift,
                sales: shift_sales,
                payment_breakdown: summary.payment_breakdown,
                total_sales: summary.total_sales,
                total_expenses: summary.total_expenses,
                expenses: summary.expenses,
            }
        })
        .collect();

    Ok(reports)
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

/// Bucket amounts by calendar date in `tz`, oldest day first.
pub fn daily_totals<Tz, I>(entries: I, tz: &Tz) -> Vec<DailyTotal>
where
    Tz: TimeZone,
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, amount) in entries {
        *days.entry(date.with_timezone(tz).date_naive()).or_insert(0.0) += amount;
    }
    days.into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_sales: f64,
    pub total_expenses: f64,
    pub net: f64,
    pub daily_sales: Vec<DailyTotal>,
    pub daily_expenses: Vec<DailyTotal>,
}

pub fn statistics<Tz: TimeZone>(store: &Store, tz: &Tz) -> PosResult<Statistics> {
    let sales: Vec<Sale> = store.view(keys::SALES)?;
    let expenses: Vec<Expense> = store.view(keys::EXPENSES)?;

    let total_sales: f64 = sales.iter().map(|s| s.total).sum();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();

    Ok(Statistics {
        total_sales,
        total_expenses,
        net: total_sales - total_expenses,
        daily_sales: daily_totals(sales.iter().map(|s| (s.date, s.total)), tz),
        daily_expenses: daily_totals(expenses.iter().map(|e| (e.date, e.amount)), tz),
    })
}
