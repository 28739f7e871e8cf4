use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database path is a directory: {path}")]
    InvalidPath { path: String },

    #[error("blocking storage task failed: {reason}")]
    Task { reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;
