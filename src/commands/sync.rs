use super::StateExt;
use crate::sync::{self, SyncReport};
use chrono::{DateTime, Utc};
use tauri::AppHandle;

/// Runs on a blocking thread so the HTTP calls never stall the UI.
#[tauri::command]
pub async fn sync_now(app: AppHandle) -> Result<SyncReport, String> {
    tauri::async_runtime::spawn_blocking(move || app.pos().sync_now().map_err(String::from))
        .await
        .map_err(|e| e.to_string())?
}

#[tauri::command]
pub fn get_last_sync_time(app: AppHandle) -> Result<Option<DateTime<Utc>>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(sync::last_sync_time(&state.store)?)
}
