pub mod auth;
pub mod categories;
pub mod pos;
pub mod preferences;
pub mod products;
pub mod reports;
pub mod shifts;
pub mod sync;

use tauri::{AppHandle, Manager};

use crate::state::AppState;

pub trait StateExt {
    fn pos(&self) -> &AppState;
}

impl StateExt for AppHandle {
    fn pos(&self) -> &AppState {
        self.state::<AppState>().inner()
    }
}
