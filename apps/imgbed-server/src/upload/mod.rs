//! Image upload
//!
//! Multipart batches are validated against a media-type allow-list and
//! written to the store one file at a time.

mod service;
mod types;

pub use service::UploadService;
pub use types::*;
