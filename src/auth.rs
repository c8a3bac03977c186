//! Username/password authentication with bcrypt-hashed credentials.
//!
//! Users live in the `users` collection; the logged-in user (never the hash)
//! lives under `user`. An empty collection is seeded with the two default
//! accounts so a fresh install can log in.

use tracing::{info, warn};

use crate::error::{PosError, PosResult};
use crate::models::{CreateUser, Role, StoredUser, UpdateUser, User};
use crate::store::{keys, Store};

const DEFAULT_USERS: &[(&str, &str, Role)] = &[
    ("admin", "852456", Role::Admin),
    ("cajero", "1000", Role::Cashier),
];

/// Reject unless `user` is an admin.
pub fn require_admin(user: &User, action: &str) -> PosResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        warn!(username = %user.username, action, "admin-only action rejected");
        Err(PosError::Forbidden(format!("only administrators can {action}")))
    }
}

pub struct Identity {
    store: Store,
    bcrypt_cost: u32,
}

impl Identity {
    pub fn new(store: Store, bcrypt_cost: u32) -> Self {
        Identity { store, bcrypt_cost }
    }

    fn hash(&self, password: &str) -> PosResult<String> {
        bcrypt::hash(password, self.bcrypt_cost)
            .map_err(|e| PosError::Validation(format!("could not hash password: {e}")))
    }

    fn stored_users(&self) -> PosResult<Vec<StoredUser>> {
        let users: Vec<StoredUser> = self.store.load_or_default(keys::USERS)?;
        if !users.is_empty() {
            return Ok(users);
        }

        let mut seeded = Vec::with_capacity(DEFAULT_USERS.len());
        for (username, password, role) in DEFAULT_USERS {
            seeded.push(StoredUser {
                username: username.to_string(),
                password_hash: self.hash(password)?,
                role: *role,
            });
        }
        self.store.save(keys::USERS, &seeded)?;
        info!(count = seeded.len(), "seeded default users");
        Ok(seeded)
    }

    /// Exact username match plus password verification. Unknown user and
    /// wrong password are indistinguishable.
    pub fn authenticate(&self, username: &str, password: &str) -> PosResult<Option<User>> {
        let users = self.stored_users()?;
        let Some(stored) = users.iter().find(|u| u.username == username) else {
            return Ok(None);
        };

        match bcrypt::verify(password, &stored.password_hash) {
            Ok(true) => Ok(Some(stored.user())),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!(username, error = %e, "stored password hash is unreadable");
                Ok(None)
            }
        }
    }

    pub fn login(&self, username: &str, password: &str) -> PosResult<User> {
        match self.authenticate(username, password)? {
            Some(user) => {
                self.store.save(keys::USER, &user)?;
                info!(username = %user.username, role = ?user.role, "user logged in");
                Ok(user)
            }
            None => {
                warn!(username, "rejected login");
                Err(PosError::InvalidCredentials)
            }
        }
    }

    pub fn logout(&self) -> PosResult<()> {
        self.store.remove(keys::USER)
    }

    pub fn current_user(&self) -> PosResult<Option<User>> {
        self.store.load(keys::USER)
    }

    pub fn list_users(&self, actor: &User) -> PosResult<Vec<User>> {
        require_admin(actor, "manage users")?;
        Ok(self.stored_users()?.iter().map(StoredUser::user).collect())
    }

    pub fn create_user(&self, actor: &User, new_user: CreateUser) -> PosResult<User> {
        require_admin(actor, "manage users")?;

        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(PosError::Validation("username is required".to_string()));
        }
        if new_user.password.is_empty() {
            return Err(PosError::Validation("password is required".to_string()));
        }

        let mut users = self.stored_users()?;
        if users.iter().any(|u| u.username == username) {
            return Err(PosError::Conflict(format!("user {username} already exists")));
        }

        let stored = StoredUser {
            username,
            password_hash: self.hash(&new_user.password)?,
            role: new_user.role,
        };
        let user = stored.user();
        users.push(stored);
        self.store.save(keys::USERS, &users)?;

        info!(username = %user.username, role = ?user.role, "user created");
        Ok(user)
    }

    pub fn update_user(&self, actor: &User, username: &str, update: UpdateUser) -> PosResult<User> {
        require_admin(actor, "manage users")?;

        let mut users = self.stored_users()?;
        let index = users
            .iter()
            .position(|u| u.username == username)
            .ok_or_else(|| PosError::NotFound(format!("user {username}")))?;

        if users[index].role == Role::Admin
            && update.role != Role::Admin
            && admin_count(&users) == 1
        {
            return Err(PosError::Conflict(
                "cannot demote the last administrator".to_string(),
            ));
        }

        if let Some(password) = update.password.filter(|p| !p.is_empty()) {
            users[index].password_hash = self.hash(&password)?;
        }
        users[index].role = update.role;
        let user = users[index].user();
        self.store.save(keys::USERS, &users)?;

        info!(username, role = ?user.role, "user updated");
        Ok(user)
    }

    pub fn delete_user(&self, actor: &User, username: &str) -> PosResult<()> {
        require_admin(actor, "manage users")?;

        let mut users = self.stored_users()?;
        let index = users
            .iter()
            .position(|u| u.username == username)
            .ok_or_else(|| PosError::NotFound(format!("user {username}")))?;

        if users[index].role == Role::Admin && admin_count(&users) == 1 {
            return Err(PosError::Conflict(
                "cannot delete the last administrator".to_string(),
            ));
        }

        users.remove(index);
        self.store.save(keys::USERS, &users)?;

        info!(username, "user deleted");
        Ok(())
    }
}

fn admin_count(users: &[StoredUser]) -> usize {
    users.iter().filter(|u| u.role == Role::Admin).count()
}
