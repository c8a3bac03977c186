use super::StateExt;
use crate::inventory;
use crate::models::Category;
use tauri::AppHandle;

#[tauri::command]
pub fn get_categories(app: AppHandle) -> Result<Vec<Category>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::get_categories(&state.store)?)
}

#[tauri::command]
pub fn create_category(app: AppHandle, name: String) -> Result<Category, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::create_category(&state.store, &name)?)
}

#[tauri::command]
pub fn delete_category(app: AppHandle, id: i64) -> Result<(), String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::delete_category(&state.store, id)?)
}
