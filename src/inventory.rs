//! Product catalog, categories and spreadsheet import.

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{PosError, PosResult};
use crate::models::{Category, CreateProduct, Product, UpdateProduct, DEFAULT_THRESHOLD};
use crate::store::{keys, Store};

fn validate_product(name: &str, price: f64, quantity: i32, threshold: i32) -> PosResult<()> {
    if name.trim().is_empty() {
        return Err(PosError::Validation("product name is required".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(PosError::Validation("price must be a valid number".to_string()));
    }
    if quantity < 0 || threshold < 0 {
        return Err(PosError::Validation(
            "quantity and threshold must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub fn get_products(store: &Store) -> PosResult<Vec<Product>> {
    store.view(keys::INVENTORY)
}

fn load_products(store: &Store) -> PosResult<Vec<Product>> {
    store.load_or_default(keys::INVENTORY)
}

pub fn create_product(store: &Store, product: CreateProduct) -> PosResult<Product> {
    let threshold = product.threshold.unwrap_or(DEFAULT_THRESHOLD);
    validate_product(&product.name, product.price, product.quantity, threshold)?;

    let created = Product {
        id: store.next_id()?,
        name: product.name.trim().to_string(),
        category: product.category.trim().to_string(),
        quantity: product.quantity,
        threshold,
        price: product.price,
        image_url: product.image_url.filter(|url| !url.is_empty()),
    };

    let mut products = load_products(store)?;
    products.push(created.clone());
    store.save(keys::INVENTORY, &products)?;

    info!(product_id = created.id, name = %created.name, "product created");
    Ok(created)
}

pub fn update_product(store: &Store, product: UpdateProduct) -> PosResult<Product> {
    validate_product(&product.name, product.price, product.quantity, product.threshold)?;

    let mut products = load_products(store)?;
    let existing = products
        .iter_mut()
        .find(|p| p.id == product.id)
        .ok_or_else(|| PosError::NotFound(format!("product {}", product.id)))?;

    existing.name = product.name.trim().to_string();
    existing.category = product.category.trim().to_string();
    existing.quantity = product.quantity;
    existing.threshold = product.threshold;
    existing.price = product.price;
    existing.image_url = product.image_url.filter(|url| !url.is_empty());
    let updated = existing.clone();

    store.save(keys::INVENTORY, &products)?;

    info!(product_id = updated.id, "product updated");
    Ok(updated)
}

pub fn delete_product(store: &Store, id: i64) -> PosResult<()> {
    let mut products = load_products(store)?;
    let before = products.len();
    products.retain(|p| p.id != id);
    if products.len() == before {
        return Err(PosError::NotFound(format!("product {id}")));
    }
    store.save(keys::INVENTORY, &products)?;

    info!(product_id = id, "product deleted");
    Ok(())
}

/// Products at or below their threshold, lowest quantity first.
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|p| p.quantity <= p.threshold)
        .cloned()
        .collect();
    low.sort_by_key(|p| p.quantity);
    low
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub fn get_categories(store: &Store) -> PosResult<Vec<Category>> {
    let mut categories: Vec<Category> = store.view(keys::CATEGORIES)?;
    categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(categories)
}

pub fn create_category(store: &Store, name: &str) -> PosResult<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PosError::Validation("category name is required".to_string()));
    }

    let mut categories: Vec<Category> = store.load_or_default(keys::CATEGORIES)?;
    if categories.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
        return Err(PosError::Conflict(format!("category {name} already exists")));
    }

    let category = Category {
        id: store.next_id()?,
        name: name.to_string(),
    };
    categories.push(category.clone());
    store.save(keys::CATEGORIES, &categories)?;

    info!(category_id = category.id, name, "category created");
    Ok(category)
}

/// Delete a category and clear it from the products that used it.
pub fn delete_category(store: &Store, id: i64) -> PosResult<()> {
    let mut categories: Vec<Category> = store.load_or_default(keys::CATEGORIES)?;
    let index = categories
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| PosError::NotFound(format!("category {id}")))?;
    let removed = categories.remove(index);

    let mut products = load_products(store)?;
    for product in products.iter_mut().filter(|p| p.category == removed.name) {
        product.category.clear();
    }

    store
        .batch()
        .put(keys::CATEGORIES, &categories)?
        .put(keys::INVENTORY, &products)?
        .commit()?;

    info!(category_id = id, name = %removed.name, "category deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: Vec<Product>,
    pub skipped: usize,
    pub new_categories: Vec<String>,
}

/// Case-insensitive column lookup.
fn field<'a>(row: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    row.iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn text_field(row: &Map<String, Value>, name: &str) -> String {
    match field(row, name) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Spreadsheet semantics: a missing, empty, unparseable or zero cell takes
/// the default.
fn number_field(row: &Map<String, Value>, name: &str, default: f64) -> f64 {
    let parsed = match field(row, name) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => default,
    }
}

/// Append one product per row. Rows are never merged with existing
/// products, so importing the same sheet twice duplicates it.
pub fn bulk_import(store: &Store, rows: &[Map<String, Value>]) -> PosResult<ImportReport> {
    let mut products = load_products(store)?;
    let mut categories: Vec<Category> = store.load_or_default(keys::CATEGORIES)?;
    let mut imported = Vec::new();
    let mut new_categories: Vec<String> = Vec::new();
    let mut skipped = 0;

    for (index, row) in rows.iter().enumerate() {
        let name = text_field(row, "name");
        if name.is_empty() {
            warn!(row = index + 1, "skipping import row without a name");
            skipped += 1;
            continue;
        }

        let category = text_field(row, "category");
        if !category.is_empty() && !categories.iter().any(|c| c.name.eq_ignore_ascii_case(&category)) {
            categories.push(Category {
                id: store.next_id()?,
                name: category.clone(),
            });
            new_categories.push(category.clone());
        }

        let product = Product {
            id: store.next_id()?,
            name,
            category,
            quantity: number_field(row, "quantity", 0.0).max(0.0) as i32,
            threshold: number_field(row, "threshold", DEFAULT_THRESHOLD as f64).max(0.0) as i32,
            price: number_field(row, "price", 0.0).max(0.0),
            image_url: None,
        };
        products.push(product.clone());
        imported.push(product);
    }

    store
        .batch()
        .put(keys::INVENTORY, &products)?
        .put(keys::CATEGORIES, &categories)?
        .commit()?;

    info!(
        imported = imported.len(),
        skipped,
        new_categories = ?new_categories,
        "inventory import finished"
    );
    Ok(ImportReport {
        imported,
        skipped,
        new_categories,
    })
}

/// Import a CSV sheet with a header row.
pub fn import_csv<R: Read>(store: &Store, reader: R) -> PosResult<ImportReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    bulk_import(store, &rows)
}

pub fn import_csv_file(store: &Store, path: &Path) -> PosResult<ImportReport> {
    let file = std::fs::File::open(path)?;
    info!(path = %path.display(), "importing inventory sheet");
    import_csv(store, file)
}
