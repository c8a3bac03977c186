pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod expenses;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod reports;
pub mod shifts;
pub mod state;
pub mod store;
pub mod sync;

#[cfg(feature = "desktop")]
mod commands;


pub use error::{PosError, PosResult};
pub use state::AppState;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{auth, categories, pos, preferences, products, reports, shifts, sync};
    use config::Config;
    use tauri::Manager;

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let mut config = Config::from_env();
            if std::env::var_os("POS_DATA_DIR").is_none() {
                config = config.with_data_dir(app.path().app_data_dir()?);
            }
            logging::init(&config);
            tracing::info!("Starting Pub POS v{}", env!("CARGO_PKG_VERSION"));

            let state = AppState::open(config)?;
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Auth
            auth::login,
            auth::logout,
            auth::get_current_user,
            auth::get_users,
            auth::create_user,
            auth::update_user,
            auth::delete_user,
            // Categories
            categories::get_categories,
            categories::create_category,
            categories::delete_category,
            // Products
            products::get_products,
            products::create_product,
            products::update_product,
            products::delete_product,
            products::get_low_stock,
            products::import_inventory_file,
            // Shifts and expenses
            shifts::get_active_shift,
            shifts::start_shift,
            shifts::end_shift,
            shifts::delete_shift,
            shifts::get_shifts,
            shifts::get_shift_summary,
            shifts::record_expense,
            shifts::get_expenses,
            shifts::get_fixed_expenses,
            shifts::add_fixed_expense,
            shifts::delete_fixed_expense,
            // Cart and sales
            pos::get_cart,
            pos::add_to_cart,
            pos::remove_from_cart,
            pos::update_cart_quantity,
            pos::new_sale,
            pos::checkout,
            pos::park_sale,
            pos::load_parked_sale,
            pos::delete_parked_sale,
            pos::get_parked_sales,
            pos::record_custom_sale,
            // Reports
            reports::get_sales_history,
            reports::get_sales_totals,
            reports::get_expense_history,
            reports::get_shift_history,
            reports::get_statistics,
            // Sync
            sync::sync_now,
            sync::get_last_sync_time,
            // Preferences
            preferences::get_menu_order,
            preferences::move_menu_item,
            preferences::get_selected_palette,
            preferences::select_palette,
            preferences::get_custom_colors,
            preferences::save_custom_colors,
            preferences::reset_custom_colors,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
