use super::StateExt;
use crate::preferences::{self, Colors, Direction};
use tauri::AppHandle;

// Appearance reads stay open so the login screen can be themed.

#[tauri::command]
pub fn get_menu_order(app: AppHandle) -> Result<Vec<String>, String> {
    Ok(preferences::menu_order(&app.pos().store)?)
}

#[tauri::command]
pub fn move_menu_item(app: AppHandle, id: String, direction: Direction) -> Result<Vec<String>, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(preferences::move_menu_item(&state.store, &actor, &id, direction)?)
}

#[tauri::command]
pub fn get_selected_palette(app: AppHandle) -> Result<String, String> {
    Ok(preferences::selected_palette(&app.pos().store)?)
}

#[tauri::command]
pub fn select_palette(app: AppHandle, name: String) -> Result<Colors, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(preferences::select_palette(&state.store, &actor, &name)?)
}

#[tauri::command]
pub fn get_custom_colors(app: AppHandle) -> Result<Colors, String> {
    Ok(preferences::custom_colors(&app.pos().store)?)
}

#[tauri::command]
pub fn save_custom_colors(app: AppHandle, colors: Colors) -> Result<(), String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(preferences::save_custom_colors(&state.store, &actor, &colors)?)
}

#[tauri::command]
pub fn reset_custom_colors(app: AppHandle) -> Result<Colors, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(preferences::reset_custom_colors(&state.store, &actor)?)
}
