//! Shift lifecycle: at most one open shift, closed by an administrator.
//!
//! Sales and expenses belong to a shift through their `shiftId`; totals are
//! always computed by matching that id, never by comparing timestamps.

use chrono::Utc;
use tracing::{info, warn};

use crate::auth::require_admin;
use crate::error::{PosError, PosResult};
use crate::models::{ActiveShift, Expense, Sale, Shift, ShiftClosing, ShiftSummary, User};
use crate::reports;
use crate::store::{keys, Store};

pub fn active_shift(store: &Store) -> PosResult<Option<ActiveShift>> {
    store.load(keys::ACTIVE_SHIFT)
}

pub fn require_active_shift(store: &Store) -> PosResult<ActiveShift> {
    active_shift(store)?.ok_or(PosError::NoActiveShift)
}

pub fn list_shifts(store: &Store) -> PosResult<Vec<Shift>> {
    let mut shifts: Vec<Shift> = store.view(keys::SHIFTS)?;
    shifts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    Ok(shifts)
}

pub fn start_shift(store: &Store, actor: &User, initial_cash: f64) -> PosResult<Shift> {
    if !initial_cash.is_finite() || initial_cash < 0.0 {
        return Err(PosError::Validation(
            "initial cash must be a number greater than or equal to 0".to_string(),
        ));
    }

    if active_shift(store)?.is_some() {
        return Err(PosError::ShiftAlreadyActive);
    }

    let mut shifts: Vec<Shift> = store.load_or_default(keys::SHIFTS)?;
    if let Some(open) = shifts.iter().find(|s| s.is_open()) {
        warn!(shift_id = open.id, "shift list has an open shift but no active pointer");
        return Err(PosError::ShiftAlreadyActive);
    }

    let shift = Shift {
        id: store.next_id()?,
        start_time: Utc::now(),
        end_time: None,
        initial_cash,
        total_sales: 0.0,
        number_of_transactions: 0,
        started_by: Some(actor.username.clone()),
    };
    shifts.push(shift.clone());

    store
        .batch()
        .put(keys::SHIFTS, &shifts)?
        .put(keys::ACTIVE_SHIFT, &ActiveShift::from(&shift))?
        .commit()?;

    info!(shift_id = shift.id, initial_cash, started_by = %actor.username, "shift started");
    Ok(shift)
}

/// Close the active shift. Parked sales and the in-progress cart are left as
/// they are.
pub fn end_shift(store: &Store, actor: &User) -> PosResult<ShiftClosing> {
    require_admin(actor, "end a shift")?;
    let active = require_active_shift(store)?;

    let sales: Vec<Sale> = store.load_or_default(keys::SALES)?;
    let expenses: Vec<Expense> = store.load_or_default(keys::EXPENSES)?;
    let summary = summarize(&sales, &expenses, active.id);
    let number_of_transactions = sales.iter().filter(|s| s.shift_id == active.id).count() as u32;

    let mut shifts: Vec<Shift> = store.load_or_default(keys::SHIFTS)?;
    let index = match shifts.iter().position(|s| s.id == active.id) {
        Some(index) => index,
        None => {
            warn!(shift_id = active.id, "active shift missing from shift list, restoring it");
            shifts.push(Shift {
                id: active.id,
                start_time: active.start_time,
                end_time: None,
                initial_cash: active.initial_cash,
                total_sales: 0.0,
                number_of_transactions: 0,
                started_by: active.started_by.clone(),
            });
            shifts.len() - 1
        }
    };

    let shift = &mut shifts[index];
    shift.end_time = Some(Utc::now());
    shift.total_sales = summary.total_sales;
    shift.number_of_transactions = number_of_transactions;
    let closed = shift.clone();

    store
        .batch()
        .put(keys::SHIFTS, &shifts)?
        .delete(keys::ACTIVE_SHIFT)
        .commit()?;

    info!(
        shift_id = closed.id,
        total_sales = closed.total_sales,
        transactions = closed.number_of_transactions,
        ended_by = %actor.username,
        "shift ended"
    );

    Ok(ShiftClosing {
        shift: closed,
        summary,
    })
}

/// Remove a closed shift together with its sales and expenses.
pub fn delete_shift(store: &Store, actor: &User, shift_id: i64) -> PosResult<()> {
    require_admin(actor, "delete a shift")?;

    let mut shifts: Vec<Shift> = store.load_or_default(keys::SHIFTS)?;
    let shift = shifts
        .iter()
        .find(|s| s.id == shift_id)
        .ok_or_else(|| PosError::NotFound(format!("shift {shift_id}")))?;
    if shift.is_open() {
        return Err(PosError::Conflict(
            "cannot delete a shift that is still open".to_string(),
        ));
    }
    shifts.retain(|s| s.id != shift_id);

    let mut sales: Vec<Sale> = store.load_or_default(keys::SALES)?;
    let mut expenses: Vec<Expense> = store.load_or_default(keys::EXPENSES)?;
    let sales_before = sales.len();
    let expenses_before = expenses.len();
    sales.retain(|s| s.shift_id != shift_id);
    expenses.retain(|e| e.shift_id != shift_id);

    store
        .batch()
        .put(keys::SHIFTS, &shifts)?
        .put(keys::SALES, &sales)?
        .put(keys::EXPENSES, &expenses)?
        .commit()?;

    info!(
        shift_id,
        sales_removed = sales_before - sales.len(),
        expenses_removed = expenses_before - expenses.len(),
        "shift deleted"
    );
    Ok(())
}

pub fn shift_summary(store: &Store, shift_id: i64) -> PosResult<ShiftSummary> {
    let sales: Vec<Sale> = store.view(keys::SALES)?;
    let expenses: Vec<Expense> = store.view(keys::EXPENSES)?;
    Ok(summarize(&sales, &expenses, shift_id))
}

pub(crate) fn summarize(sales: &[Sale], expenses: &[Expense], shift_id: i64) -> ShiftSummary {
    let shift_sales: Vec<Sale> = sales
        .iter()
        .filter(|s| s.shift_id == shift_id)
        .cloned()
        .collect();
    let shift_expenses: Vec<Expense> = expenses
        .iter()
        .filter(|e| e.shift_id == shift_id)
        .cloned()
        .collect();

    let total_sales: f64 = shift_sales.iter().map(|s| s.total).sum();
    let total_expenses: f64 = shift_expenses.iter().map(|e| e.amount).sum();

    ShiftSummary {
        total_sales,
        total_expenses,
        net_total: total_sales - total_expenses,
        payment_breakdown: reports::payment_breakdown(&shift_sales),
        expenses: shift_expenses,
    }
}
