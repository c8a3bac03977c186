//! One-way pull of reference data from the remote database.
//!
//! Every table is fetched and decoded before anything is written; the local
//! copies and `lastSyncTime` are then replaced in one batch, so a failed sync
//! leaves the store exactly as it was.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::RemoteConfig;
use crate::error::{PosError, PosResult};
use crate::store::{keys, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteTable {
    Products,
    ProductCategories,
    ExpenseCategories,
    Sales,
    Expenses,
    FixedExpenses,
    Shifts,
}

impl RemoteTable {
    pub const ALL: [RemoteTable; 7] = [
        RemoteTable::Products,
        RemoteTable::ProductCategories,
        RemoteTable::ExpenseCategories,
        RemoteTable::Sales,
        RemoteTable::Expenses,
        RemoteTable::FixedExpenses,
        RemoteTable::Shifts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RemoteTable::Products => "products",
            RemoteTable::ProductCategories => "product_categories",
            RemoteTable::ExpenseCategories => "expense_categories",
            RemoteTable::Sales => "sales",
            RemoteTable::Expenses => "expenses",
            RemoteTable::FixedExpenses => "fixed_expenses",
            RemoteTable::Shifts => "shifts",
        }
    }

    pub fn select(&self) -> &'static str {
        match self {
            RemoteTable::Sales => "*,sale_items(*)",
            _ => "*",
        }
    }

    pub fn local_key(&self) -> &'static str {
        match self {
            RemoteTable::Products => "syncedProducts",
            RemoteTable::ProductCategories => "syncedProductCategories",
            RemoteTable::ExpenseCategories => "syncedExpenseCategories",
            RemoteTable::Sales => "syncedSales",
            RemoteTable::Expenses => "syncedExpenses",
            RemoteTable::FixedExpenses => "syncedFixedExpenses",
            RemoteTable::Shifts => "syncedShifts",
        }
    }
}

// ---------------------------------------------------------------------------
// Remote row shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub threshold: i64,
    pub category_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteSaleItem {
    pub id: String,
    pub sale_id: Option<String>,
    pub product_id: Option<String>,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteSale {
    pub id: String,
    pub total: f64,
    pub payment_method: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub shift_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sale_items: Vec<RemoteSaleItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub shift_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteFixedExpense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub frequency: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteShift {
    pub id: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub initial_cash: f64,
    #[serde(default)]
    pub final_cash: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

pub trait RemoteSource {
    fn fetch(&self, table: RemoteTable) -> PosResult<Vec<Value>>;
}

/// PostgREST-style HTTP source (`{url}/rest/v1/{table}`).
pub struct RestSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestSource {
    pub fn new(config: &RemoteConfig) -> PosResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PosError::Sync(format!("could not build HTTP client: {e}")))?;

        Ok(RestSource {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach remote database at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    format!("Network error communicating with {url}: {err}")
}

impl RemoteSource for RestSource {
    fn fetch(&self, table: RemoteTable) -> PosResult<Vec<Value>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table.name());

        let response = self
            .client
            .get(&url)
            .query(&[("select", table.select())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| PosError::Sync(friendly_error(&url, &e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PosError::Sync(format!(
                "{} returned {status}: {body}",
                table.name()
            )));
        }

        response
            .json::<Vec<Value>>()
            .map_err(|e| PosError::Sync(format!("{}: invalid response: {e}", table.name())))
    }
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced_at: DateTime<Utc>,
    pub rows: BTreeMap<String, usize>,
}

fn decode<T: DeserializeOwned + Serialize>(
    table: RemoteTable,
    rows: Vec<Value>,
) -> PosResult<(usize, String)> {
    let typed: Vec<T> = serde_json::from_value(Value::Array(rows))
        .map_err(|e| PosError::Sync(format!("{}: unexpected row shape: {e}", table.name())))?;
    Ok((typed.len(), serde_json::to_string(&typed)?))
}

fn fetch_table(source: &dyn RemoteSource, table: RemoteTable) -> PosResult<(usize, String)> {
    let rows = source.fetch(table)?;
    match table {
        RemoteTable::Products => decode::<RemoteProduct>(table, rows),
        RemoteTable::ProductCategories | RemoteTable::ExpenseCategories => {
            decode::<RemoteCategory>(table, rows)
        }
        RemoteTable::Sales => decode::<RemoteSale>(table, rows),
        RemoteTable::Expenses => decode::<RemoteExpense>(table, rows),
        RemoteTable::FixedExpenses => decode::<RemoteFixedExpense>(table, rows),
        RemoteTable::Shifts => decode::<RemoteShift>(table, rows),
    }
}

pub fn sync_all(store: &Store, source: &dyn RemoteSource) -> PosResult<SyncReport> {
    let mut fetched = Vec::with_capacity(RemoteTable::ALL.len());
    for table in RemoteTable::ALL {
        match fetch_table(source, table) {
            Ok((count, json)) => fetched.push((table, count, json)),
            Err(e) => {
                warn!(table = table.name(), error = %e, "sync aborted, local data untouched");
                return Err(e);
            }
        }
    }

    let synced_at = Utc::now();
    let mut rows = BTreeMap::new();
    let mut batch = store.batch();
    for (table, count, json) in fetched {
        rows.insert(table.name().to_string(), count);
        batch = batch.put_raw(table.local_key(), json);
    }
    batch.put(keys::LAST_SYNC_TIME, &synced_at)?.commit()?;

    info!(rows = ?rows, "remote sync completed");
    Ok(SyncReport { synced_at, rows })
}

pub fn last_sync_time(store: &Store) -> PosResult<Option<DateTime<Utc>>> {
    store.view(keys::LAST_SYNC_TIME)
}
