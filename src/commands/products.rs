use super::StateExt;
use crate::inventory::{self, ImportReport};
use crate::models::{CreateProduct, Product, UpdateProduct};
use std::path::PathBuf;
use tauri::AppHandle;

#[tauri::command]
pub fn get_products(app: AppHandle) -> Result<Vec<Product>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::get_products(&state.store)?)
}

#[tauri::command]
pub fn create_product(app: AppHandle, product: CreateProduct) -> Result<Product, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::create_product(&state.store, product)?)
}

#[tauri::command]
pub fn update_product(app: AppHandle, product: UpdateProduct) -> Result<Product, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::update_product(&state.store, product)?)
}

#[tauri::command]
pub fn delete_product(app: AppHandle, id: i64) -> Result<(), String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::delete_product(&state.store, id)?)
}

#[tauri::command]
pub fn get_low_stock(app: AppHandle) -> Result<Vec<Product>, String> {
    let state = app.pos();
    state.require_user()?;
    let products = inventory::get_products(&state.store)?;
    Ok(inventory::low_stock(&products))
}

/// The frontend picks the file through the dialog plugin and passes its path.
#[tauri::command]
pub fn import_inventory_file(app: AppHandle, path: PathBuf) -> Result<ImportReport, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(inventory::import_csv_file(&state.store, &path)?)
}
