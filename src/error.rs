use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("No active shift. Please start a shift before making sales.")]
    NoActiveShift,
    #[error("A shift is already active")]
    ShiftAlreadyActive,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("not allowed: {0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("import failed: {0}")]
    Import(String),
    #[error("sync failed: {0}")]
    Sync(String),
}

impl From<PosError> for String {
    fn from(value: PosError) -> Self {
        value.to_string()
    }
}

impl From<csv::Error> for PosError {
    fn from(value: csv::Error) -> Self {
        PosError::Import(value.to_string())
    }
}

pub type PosResult<T> = Result<T, PosError>;
