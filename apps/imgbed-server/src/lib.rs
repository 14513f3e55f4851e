//! Imgbed Server
//!
//! A small image bed over S3-compatible object storage: page-numbered
//! listing, multipart upload, pseudo-folders, deletion and range-aware
//! retrieval, plus static hosting for the browser UI.
//!
//! # Modules
//!
//! - `storage`: the `ObjectStore` contract with S3 and in-memory backends
//! - `listing`: page-number pagination over cursor-only listing
//! - `routes`: axum handlers and router assembly

pub mod auth;
pub mod config;
pub mod error;
pub mod listing;
pub mod objects;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

pub use routes::app;
