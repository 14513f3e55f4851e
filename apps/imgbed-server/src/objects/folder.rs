//! Pseudo-folders
//!
//! A folder is a zero-byte marker object whose key is the folder name
//! followed by `/`.

use axum::body::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::StorageError;
use crate::storage::{ObjectStore, PutOptions};

static FOLDER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]+$").expect("valid folder name pattern"));

#[derive(Error, Debug)]
pub enum FolderError {
    #[error("Folder name error")]
    InvalidName(String),

    #[error("Create folder fail")]
    Storage(#[from] StorageError),
}

pub fn is_valid_folder_name(name: &str) -> bool {
    FOLDER_NAME.is_match(name)
}

/// Create the marker object for `name`, returning its key
pub async fn create_folder(store: &dyn ObjectStore, name: &str) -> Result<String, FolderError> {
    if !is_valid_folder_name(name) {
        return Err(FolderError::InvalidName(name.to_string()));
    }

    let key = format!("{}/", name);
    store.put(&key, Bytes::new(), PutOptions::default()).await?;

    tracing::info!(key = %key, "Folder created");
    Ok(key)
}
