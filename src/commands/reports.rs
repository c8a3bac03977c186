use super::StateExt;
use crate::models::{Expense, Sale};
use crate::reports::{self, SalesTotals, ShiftReport, Statistics, TimeRange};
use chrono::{Local, Utc};
use tauri::AppHandle;

#[tauri::command]
pub fn get_sales_history(app: AppHandle, range: Option<TimeRange>) -> Result<Vec<Sale>, String> {
    let state = app.pos();
    state.require_user()?;
    let range = range.unwrap_or_default();
    Ok(reports::sales_history(&state.store, range, Utc::now())?)
}

#[tauri::command]
pub fn get_sales_totals(app: AppHandle, range: Option<TimeRange>) -> Result<SalesTotals, String> {
    let state = app.pos();
    state.require_user()?;
    let range = range.unwrap_or_default();
    let sales = reports::sales_history(&state.store, range, Utc::now())?;
    Ok(reports::sales_totals(&sales))
}

#[tauri::command]
pub fn get_expense_history(app: AppHandle, range: Option<TimeRange>) -> Result<Vec<Expense>, String> {
    let state = app.pos();
    state.require_user()?;
    let range = range.unwrap_or_default();
    Ok(reports::expense_history(&state.store, range, Utc::now())?)
}

#[tauri::command]
pub fn get_shift_history(app: AppHandle) -> Result<Vec<ShiftReport>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(reports::shift_history(&state.store)?)
}

#[tauri::command]
pub fn get_statistics(app: AppHandle) -> Result<Statistics, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(reports::statistics(&state.store, &Local)?)
}
