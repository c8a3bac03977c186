use super::StateExt;
use crate::expenses;
use crate::models::{
    ActiveShift, CreateFixedExpense, Expense, FixedExpense, Shift, ShiftClosing, ShiftSummary,
};
use crate::shifts;
use tauri::AppHandle;

#[tauri::command]
pub fn get_active_shift(app: AppHandle) -> Result<Option<ActiveShift>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(shifts::active_shift(&state.store)?)
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn start_shift(app: AppHandle, initialCash: f64) -> Result<Shift, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(shifts::start_shift(&state.store, &actor, initialCash)?)
}

#[tauri::command]
pub fn end_shift(app: AppHandle) -> Result<ShiftClosing, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(shifts::end_shift(&state.store, &actor)?)
}

#[tauri::command]
pub fn delete_shift(app: AppHandle, id: i64) -> Result<(), String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(shifts::delete_shift(&state.store, &actor, id)?)
}

#[tauri::command]
pub fn get_shifts(app: AppHandle) -> Result<Vec<Shift>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(shifts::list_shifts(&state.store)?)
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn get_shift_summary(app: AppHandle, shiftId: i64) -> Result<ShiftSummary, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(shifts::shift_summary(&state.store, shiftId)?)
}

#[tauri::command]
pub fn record_expense(app: AppHandle, description: String, amount: f64) -> Result<Expense, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(expenses::record_expense(&state.store, &description, amount)?)
}

#[tauri::command]
pub fn get_expenses(app: AppHandle) -> Result<Vec<Expense>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(expenses::list_expenses(&state.store)?)
}

#[tauri::command]
pub fn get_fixed_expenses(app: AppHandle) -> Result<Vec<FixedExpense>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(expenses::list_fixed_expenses(&state.store)?)
}

#[tauri::command]
pub fn add_fixed_expense(app: AppHandle, expense: CreateFixedExpense) -> Result<FixedExpense, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(expenses::add_fixed_expense(&state.store, expense)?)
}

#[tauri::command]
pub fn delete_fixed_expense(app: AppHandle, id: i64) -> Result<(), String> {
    let state = app.pos();
    state.require_user()?;
    Ok(expenses::delete_fixed_expense(&state.store, id)?)
}
