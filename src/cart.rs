//! The in-progress transaction and its conversion into sales.
//!
//! The cart itself lives in memory. It reaches the store only when it is
//! parked under a client name or checked out; checkout writes the new sale
//! and the removal of the parked copy in a single batch.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::require_admin;
use crate::error::{PosError, PosResult};
use crate::models::{CartItem, PaymentMethod, Product, Sale, SavedSale, User};
use crate::shifts::require_active_shift;
use crate::store::{keys, Store};

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    current_saved_sale_id: Option<i64>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Id of the parked sale this cart was loaded from, if any.
    pub fn current_saved_sale_id(&self) -> Option<i64> {
        self.current_saved_sale_id
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `product`. Stock is not checked.
    pub fn add_item(&mut self, store: &Store, product: &Product) -> PosResult<()> {
        require_active_shift(store)?;

        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem::from_product(product)),
        }
        debug!(product_id = product.id, "added to cart");
        Ok(())
    }

    /// Drop the whole line. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != product_id);
        self.items.len() != before
    }

    /// Apply `delta` to a line. Refused (line untouched) when the result would
    /// be zero or less. Returns whether the quantity changed.
    pub fn update_quantity(&mut self, product_id: i64, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) else {
            return false;
        };
        match item.quantity.checked_add(delta) {
            Some(quantity) if quantity > 0 => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Start a new sale: empty the cart and forget the loaded parked sale.
    pub fn clear(&mut self) {
        self.items.clear();
        self.current_saved_sale_id = None;
    }

    pub fn checkout(&mut self, store: &Store, payment_method: PaymentMethod) -> PosResult<Sale> {
        let shift = require_active_shift(store)?;
        if self.items.is_empty() {
            return Err(PosError::EmptyCart);
        }

        let mut saved_sales: Vec<SavedSale> = store.load_or_default(keys::SAVED_SALES)?;
        let parked = self
            .current_saved_sale_id
            .and_then(|id| saved_sales.iter().position(|s| s.id == id))
            .map(|index| saved_sales.remove(index));

        let sale = Sale {
            id: store.next_id()?,
            items: self.items.clone(),
            total: self.total(),
            date: Utc::now(),
            shift_id: shift.id,
            payment_method: Some(payment_method),
            client_name: parked.as_ref().map(|p| p.client_name.clone()),
        };

        let mut sales: Vec<Sale> = store.load_or_default(keys::SALES)?;
        sales.push(sale.clone());

        let mut batch = store.batch().put(keys::SALES, &sales)?;
        if parked.is_some() {
            batch = batch.put(keys::SAVED_SALES, &saved_sales)?;
        }
        batch.commit()?;

        self.clear();
        info!(
            sale_id = sale.id,
            shift_id = sale.shift_id,
            total = sale.total,
            payment_method = %payment_method,
            parked_sale_id = parked.as_ref().map(|p| p.id),
            "checkout completed"
        );
        Ok(sale)
    }

    /// Save the cart under a client name. A cart loaded from a parked sale
    /// updates that record instead of creating another one. The cart is kept.
    pub fn park(&mut self, store: &Store, client_name: &str) -> PosResult<SavedSale> {
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return Err(PosError::Validation("client name is required".to_string()));
        }
        let shift = require_active_shift(store)?;

        let mut saved_sales: Vec<SavedSale> = store.load_or_default(keys::SAVED_SALES)?;
        let existing = self
            .current_saved_sale_id
            .and_then(|id| saved_sales.iter().position(|s| s.id == id));

        let saved = match existing {
            Some(index) => {
                let record = &mut saved_sales[index];
                record.client_name = client_name.to_string();
                record.items = self.items.clone();
                record.total = self.total();
                record.date = Utc::now();
                record.shift_id = shift.id;
                record.clone()
            }
            None => {
                let record = SavedSale {
                    id: store.next_id()?,
                    client_name: client_name.to_string(),
                    items: self.items.clone(),
                    total: self.total(),
                    date: Utc::now(),
                    shift_id: shift.id,
                };
                saved_sales.push(record.clone());
                record
            }
        };

        store.save(keys::SAVED_SALES, &saved_sales)?;
        self.current_saved_sale_id = Some(saved.id);

        info!(
            saved_sale_id = saved.id,
            client = %saved.client_name,
            updated = existing.is_some(),
            "sale parked"
        );
        Ok(saved)
    }

    /// Replace the cart with a parked sale's items.
    pub fn load_parked(&mut self, store: &Store, saved_sale_id: i64) -> PosResult<SavedSale> {
        let saved_sales: Vec<SavedSale> = store.load_or_default(keys::SAVED_SALES)?;
        let saved = saved_sales
            .into_iter()
            .find(|s| s.id == saved_sale_id)
            .ok_or_else(|| PosError::NotFound(format!("saved sale {saved_sale_id}")))?;

        self.items = saved.items.clone();
        self.current_saved_sale_id = Some(saved.id);

        info!(saved_sale_id, client = %saved.client_name, "parked sale loaded");
        Ok(saved)
    }

    pub fn delete_parked(&mut self, store: &Store, actor: &User, saved_sale_id: i64) -> PosResult<()> {
        require_admin(actor, "delete saved sales")?;

        let mut saved_sales: Vec<SavedSale> = store.load_or_default(keys::SAVED_SALES)?;
        let before = saved_sales.len();
        saved_sales.retain(|s| s.id != saved_sale_id);
        if saved_sales.len() == before {
            return Err(PosError::NotFound(format!("saved sale {saved_sale_id}")));
        }
        store.save(keys::SAVED_SALES, &saved_sales)?;

        if self.current_saved_sale_id == Some(saved_sale_id) {
            self.clear();
        }

        info!(saved_sale_id, "parked sale deleted");
        Ok(())
    }
}

pub fn list_parked_sales(store: &Store) -> PosResult<Vec<SavedSale>> {
    store.view(keys::SAVED_SALES)
}

/// A manually entered sale with no line items, bound to the active shift.
pub fn record_custom_sale(
    store: &Store,
    total: f64,
    payment_method: PaymentMethod,
    client_name: Option<&str>,
) -> PosResult<Sale> {
    if !total.is_finite() || total <= 0.0 {
        return Err(PosError::Validation(
            "total must be a number greater than 0".to_string(),
        ));
    }
    let shift = require_active_shift(store)?;

    let sale = Sale {
        id: store.next_id()?,
        items: Vec::new(),
        total,
        date: Utc::now(),
        shift_id: shift.id,
        payment_method: Some(payment_method),
        client_name: client_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    };

    let mut sales: Vec<Sale> = store.load_or_default(keys::SALES)?;
    sales.push(sale.clone());
    store.save(keys::SALES, &sales)?;

    info!(sale_id = sale.id, shift_id = shift.id, total, "custom sale recorded");
    Ok(sale)
}
