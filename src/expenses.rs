use chrono::Utc;
use tracing::info;

use crate::error::{PosError, PosResult};
use crate::models::{CreateFixedExpense, Expense, FixedExpense};
use crate::shifts::require_active_shift;
use crate::store::{keys, Store};

fn validate_amount(amount: f64) -> PosResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(PosError::Validation(
            "amount must be a number greater than 0".to_string(),
        ))
    }
}

/// Record an expense against the active shift.
pub fn record_expense(store: &Store, description: &str, amount: f64) -> PosResult<Expense> {
    let description = description.trim();
    if description.is_empty() {
        return Err(PosError::Validation("description is required".to_string()));
    }
    validate_amount(amount)?;
    let shift = require_active_shift(store)?;

    let expense = Expense {
        id: store.next_id()?,
        description: description.to_string(),
        amount,
        shift_id: shift.id,
        date: Utc::now(),
    };

    let mut expenses: Vec<Expense> = store.load_or_default(keys::EXPENSES)?;
    expenses.push(expense.clone());
    store.save(keys::EXPENSES, &expenses)?;

    info!(expense_id = expense.id, shift_id = shift.id, amount, "expense recorded");
    Ok(expense)
}

pub fn list_expenses(store: &Store) -> PosResult<Vec<Expense>> {
    store.view(keys::EXPENSES)
}

// ---------------------------------------------------------------------------
// Fixed expenses
// ---------------------------------------------------------------------------

pub fn list_fixed_expenses(store: &Store) -> PosResult<Vec<FixedExpense>> {
    let mut fixed: Vec<FixedExpense> = store.view(keys::FIXED_EXPENSES)?;
    fixed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(fixed)
}

pub fn add_fixed_expense(store: &Store, input: CreateFixedExpense) -> PosResult<FixedExpense> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(PosError::Validation("name is required".to_string()));
    }
    validate_amount(input.amount)?;

    let fixed = FixedExpense {
        id: store.next_id()?,
        name: name.to_string(),
        amount: input.amount,
        frequency: input.frequency,
        due_date: input.due_date,
        created_at: Utc::now(),
    };

    let mut all: Vec<FixedExpense> = store.load_or_default(keys::FIXED_EXPENSES)?;
    all.push(fixed.clone());
    store.save(keys::FIXED_EXPENSES, &all)?;

    info!(id = fixed.id, frequency = ?fixed.frequency, "fixed expense added");
    Ok(fixed)
}

pub fn delete_fixed_expense(store: &Store, id: i64) -> PosResult<()> {
    let mut all: Vec<FixedExpense> = store.load_or_default(keys::FIXED_EXPENSES)?;
    let before = all.len();
    all.retain(|f| f.id != id);
    if all.len() == before {
        return Err(PosError::NotFound(format!("fixed expense {id}")));
    }
    store.save(keys::FIXED_EXPENSES, &all)?;

    info!(id, "fixed expense deleted");
    Ok(())
}
