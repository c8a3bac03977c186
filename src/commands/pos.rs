use super::StateExt;
use crate::cart::{self, Cart};
use crate::inventory;
use crate::models::{CartItem, PaymentMethod, Sale, SavedSale};
use serde::Serialize;
use std::sync::MutexGuard;
use tauri::AppHandle;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: f64,
    pub current_saved_sale_id: Option<i64>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            items: cart.items().to_vec(),
            total: cart.total(),
            current_saved_sale_id: cart.current_saved_sale_id(),
        }
    }
}

fn lock_cart(app: &AppHandle) -> Result<MutexGuard<'_, Cart>, String> {
    app.pos().cart.lock().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_cart(app: AppHandle) -> Result<CartView, String> {
    app.pos().require_user()?;
    let cart = lock_cart(&app)?;
    Ok(CartView::from(&*cart))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn add_to_cart(app: AppHandle, productId: i64) -> Result<CartView, String> {
    let state = app.pos();
    state.require_user()?;
    let store = &state.store;
    let product = inventory::get_products(store)?
        .into_iter()
        .find(|p| p.id == productId)
        .ok_or_else(|| format!("product {} not found", productId))?;

    let mut cart = lock_cart(&app)?;
    cart.add_item(store, &product)?;
    Ok(CartView::from(&*cart))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn remove_from_cart(app: AppHandle, productId: i64) -> Result<CartView, String> {
    app.pos().require_user()?;
    let mut cart = lock_cart(&app)?;
    cart.remove_item(productId);
    Ok(CartView::from(&*cart))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn update_cart_quantity(app: AppHandle, productId: i64, delta: i32) -> Result<CartView, String> {
    app.pos().require_user()?;
    let mut cart = lock_cart(&app)?;
    cart.update_quantity(productId, delta);
    Ok(CartView::from(&*cart))
}

#[tauri::command]
pub fn new_sale(app: AppHandle) -> Result<CartView, String> {
    app.pos().require_user()?;
    let mut cart = lock_cart(&app)?;
    cart.clear();
    Ok(CartView::from(&*cart))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn checkout(app: AppHandle, paymentMethod: String) -> Result<Sale, String> {
    let state = app.pos();
    state.require_user()?;
    let method: PaymentMethod = paymentMethod.parse()?;
    let mut cart = lock_cart(&app)?;
    Ok(cart.checkout(&state.store, method)?)
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn park_sale(app: AppHandle, clientName: String) -> Result<SavedSale, String> {
    let state = app.pos();
    state.require_user()?;
    let mut cart = lock_cart(&app)?;
    Ok(cart.park(&state.store, &clientName)?)
}

#[tauri::command]
pub fn load_parked_sale(app: AppHandle, id: i64) -> Result<CartView, String> {
    let state = app.pos();
    state.require_user()?;
    let mut cart = lock_cart(&app)?;
    cart.load_parked(&state.store, id)?;
    Ok(CartView::from(&*cart))
}

#[tauri::command]
pub fn delete_parked_sale(app: AppHandle, id: i64) -> Result<(), String> {
    let state = app.pos();
    let actor = state.require_user()?;
    let mut cart = lock_cart(&app)?;
    Ok(cart.delete_parked(&state.store, &actor, id)?)
}

#[tauri::command]
pub fn get_parked_sales(app: AppHandle) -> Result<Vec<SavedSale>, String> {
    let state = app.pos();
    state.require_user()?;
    Ok(cart::list_parked_sales(&state.store)?)
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn record_custom_sale(
    app: AppHandle,
    total: f64,
    paymentMethod: String,
    clientName: Option<String>,
) -> Result<Sale, String> {
    let state = app.pos();
    state.require_user()?;
    let method: PaymentMethod = paymentMethod.parse()?;
    Ok(cart::record_custom_sale(
        &state.store,
        total,
        method,
        clientName.as_deref(),
    )?)
}
