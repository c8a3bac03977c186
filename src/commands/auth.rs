use super::StateExt;
use crate::models::{CreateUser, UpdateUser, User};
use tauri::AppHandle;

#[tauri::command]
pub fn login(app: AppHandle, username: String, password: String) -> Result<User, String> {
    Ok(app.pos().identity.login(&username, &password)?)
}

#[tauri::command]
pub fn logout(app: AppHandle) -> Result<(), String> {
    let state = app.pos();
    state.identity.logout()?;
    state.cart.lock().map_err(|e| e.to_string())?.clear();
    Ok(())
}

#[tauri::command]
pub fn get_current_user(app: AppHandle) -> Result<Option<User>, String> {
    Ok(app.pos().identity.current_user()?)
}

#[tauri::command]
pub fn get_users(app: AppHandle) -> Result<Vec<User>, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(state.identity.list_users(&actor)?)
}

#[tauri::command]
pub fn create_user(app: AppHandle, user: CreateUser) -> Result<User, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(state.identity.create_user(&actor, user)?)
}

#[tauri::command]
pub fn update_user(app: AppHandle, username: String, update: UpdateUser) -> Result<User, String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(state.identity.update_user(&actor, &username, update)?)
}

#[tauri::command]
pub fn delete_user(app: AppHandle, username: String) -> Result<(), String> {
    let state = app.pos();
    let actor = state.require_user()?;
    Ok(state.identity.delete_user(&actor, &username)?)
}
