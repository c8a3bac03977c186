//! Key-value persistence for every POS collection.
//!
//! Values are whole JSON documents stored under string keys. Every mutation
//! rewrites the full value; multi-key mutations go through [`Batch`] so they
//! land together or not at all.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::{PosError, PosResult};

pub mod keys {
    pub const USER: &str = "user";
    pub const USERS: &str = "users";
    pub const INVENTORY: &str = "inventory";
    pub const CATEGORIES: &str = "categories";
    pub const SALES: &str = "sales";
    pub const SAVED_SALES: &str = "savedSales";
    pub const EXPENSES: &str = "expenses";
    pub const FIXED_EXPENSES: &str = "fixedExpenses";
    pub const SHIFTS: &str = "shifts";
    pub const ACTIVE_SHIFT: &str = "activeShift";
    pub const MENU_ORDER: &str = "menuOrder";
    pub const CUSTOM_COLORS: &str = "customColors";
    pub const SELECTED_PALETTE: &str = "selectedPalette";
    pub const LAST_SYNC_TIME: &str = "lastSyncTime";
    pub const ID_SEQUENCE: &str = "idSequence";
}

/// One write inside a batch. `value: None` deletes the key.
#[derive(Debug, Clone)]
pub struct WriteOp {
    pub key: String,
    pub value: Option<String>,
}

pub type Listener = Box<dyn Fn(&str, Option<&str>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> PosResult<Option<String>>;

    /// Apply all ops or none of them.
    fn write_batch(&self, ops: Vec<WriteOp>) -> PosResult<()>;

    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Default)]
struct Listeners {
    next: AtomicU64,
    entries: Mutex<BTreeMap<SubscriptionId, Arc<Listener>>>,
}

impl Listeners {
    fn add(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id, Arc::new(listener));
        }
        id
    }

    fn remove(&self, id: SubscriptionId) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&id);
        }
    }

    fn notify(&self, ops: &[WriteOp]) {
        // Snapshot so a listener may subscribe/unsubscribe without deadlocking.
        let listeners: Vec<Arc<Listener>> = match self.entries.lock() {
            Ok(entries) => entries.values().cloned().collect(),
            Err(_) => return,
        };
        for op in ops {
            for listener in &listeners {
                listener(&op.key, op.value.as_deref());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    conn: Mutex<Connection>,
    listeners: Listeners,
}

impl SqliteStore {
    pub fn open(path: &Path) -> PosResult<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> PosResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> PosResult<Self> {
        let store = SqliteStore {
            conn: Mutex::new(conn),
            listeners: Listeners::default(),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> PosResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;

        Ok(())
    }

    fn lock(&self) -> PosResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PosError::Conflict(format!("store lock poisoned: {e}")))
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> PosResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> PosResult<()> {
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            for op in &ops {
                match &op.value {
                    Some(value) => {
                        tx.execute(
                            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                            rusqlite::params![op.key, value],
                        )?;
                    }
                    None => {
                        tx.execute("DELETE FROM kv WHERE key = ?1", [&op.key])?;
                    }
                }
            }
            tx.commit()?;
        }

        self.listeners.notify(&ops);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id)
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
    listeners: Listeners,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> PosResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| PosError::Conflict(format!("store lock poisoned: {e}")))?;
        Ok(values.get(key).cloned())
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> PosResult<()> {
        {
            let mut values = self
                .values
                .lock()
                .map_err(|e| PosError::Conflict(format!("store lock poisoned: {e}")))?;
            for op in &ops {
                match &op.value {
                    Some(value) => {
                        values.insert(op.key.clone(), value.clone());
                    }
                    None => {
                        values.remove(&op.key);
                    }
                }
            }
        }

        self.listeners.notify(&ops);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id)
    }
}

// ---------------------------------------------------------------------------
// Typed facade
// ---------------------------------------------------------------------------

/// Typed access to a [`KvStore`]. Cloning shares the same backend.
#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KvStore>,
    id_lock: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Store {
            kv,
            id_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn sqlite(path: &Path) -> PosResult<Self> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?)))
    }

    pub fn raw(&self, key: &str) -> PosResult<Option<String>> {
        self.kv.get(key)
    }

    /// An absent key is `None`; a value that no longer decodes is an error,
    /// so read-modify-write callers never overwrite data they could not read.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> PosResult<Option<T>> {
        let Some(text) = self.kv.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text).map(Some).map_err(|e| {
            warn!(key, error = %e, "stored value is not valid for its schema");
            PosError::Serialization(e)
        })
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> PosResult<T> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Read-only access: an unreadable value is logged and shown as empty.
    /// The stored text is left as it is.
    pub fn view<T: DeserializeOwned + Default>(&self, key: &str) -> PosResult<T> {
        match self.load(key) {
            Err(PosError::Serialization(_)) => Ok(T::default()),
            other => other.map(Option::unwrap_or_default),
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PosResult<()> {
        self.batch().put(key, value)?.commit()
    }

    pub fn remove(&self, key: &str) -> PosResult<()> {
        self.batch().delete(key).commit()
    }

    pub fn batch(&self) -> Batch<'_> {
        Batch {
            store: self,
            ops: Vec::new(),
        }
    }

    /// Next entity id: strictly increasing, at least the current epoch millis.
    pub fn next_id(&self) -> PosResult<i64> {
        let _guard = self
            .id_lock
            .lock()
            .map_err(|e| PosError::Conflict(format!("id lock poisoned: {e}")))?;

        let last: i64 = self.load(keys::ID_SEQUENCE)?.unwrap_or(0);
        let id = (last + 1).max(Utc::now().timestamp_millis());
        self.save(keys::ID_SEQUENCE, &id)?;
        Ok(id)
    }

    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.kv.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.kv.unsubscribe(id)
    }
}

pub struct Batch<'a> {
    store: &'a Store,
    ops: Vec<WriteOp>,
}

impl<'a> Batch<'a> {
    pub fn put<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> PosResult<Self> {
        let text = serde_json::to_string(value)?;
        self.ops.push(WriteOp {
            key: key.to_string(),
            value: Some(text),
        });
        Ok(self)
    }

    /// Queue an already-serialized JSON document.
    pub fn put_raw(mut self, key: &str, json: String) -> Self {
        self.ops.push(WriteOp {
            key: key.to_string(),
            value: Some(json),
        });
        self
    }

    pub fn delete(mut self, key: &str) -> Self {
        self.ops.push(WriteOp {
            key: key.to_string(),
            value: None,
        });
        self
    }

    pub fn commit(self) -> PosResult<()> {
        if self.ops.is_empty() {
            return Ok(());
        }
        debug!(keys = ?self.ops.iter().map(|op| op.key.as_str()).collect::<Vec<_>>(), "committing batch");
        self.store.kv.write_batch(self.ops)
    }
}
