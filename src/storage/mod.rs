pub mod local;

pub use local::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No blob stored under key {key}")]
    BlobMissing { key: String },

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },
}
