use std::sync::Mutex;
use tracing::info;

use crate::auth::{self, Identity};
use crate::cart::Cart;
use crate::config::Config;
use crate::error::{PosError, PosResult};
use crate::models::User;
use crate::store::Store;
use crate::sync::{self, RestSource, SyncReport};

/// Everything the app shares between calls: the store, the identity
/// directory and the in-progress cart.
pub struct AppState {
    pub store: Store,
    pub identity: Identity,
    pub cart: Mutex<Cart>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        AppState {
            identity: Identity::new(store.clone(), config.bcrypt_cost),
            store,
            cart: Mutex::new(Cart::new()),
            config,
        }
    }

    /// Open the SQLite store at the configured path.
    pub fn open(config: Config) -> PosResult<Self> {
        let path = config.db_path();
        let store = Store::sqlite(&path)?;
        info!(path = %path.display(), "store opened");
        Ok(Self::new(store, config))
    }

    /// The logged-in user, required for any role-gated operation.
    pub fn require_user(&self) -> PosResult<User> {
        self.identity
            .current_user()?
            .ok_or_else(|| PosError::Forbidden("please log in first".to_string()))
    }

    pub fn require_admin(&self, action: &str) -> PosResult<User> {
        let user = self.require_user()?;
        auth::require_admin(&user, action)?;
        Ok(user)
    }

    /// Pull the remote tables. Administrators only.
    pub fn sync_now(&self) -> PosResult<SyncReport> {
        self.require_admin("run a remote sync")?;
        let remote = self
            .config
            .remote()
            .ok_or_else(|| PosError::Sync("remote sync is not configured".to_string()))?;
        let source = RestSource::new(remote)?;
        sync::sync_all(&self.store, &source)
    }
}
