//! Page-numbered listing over a cursor-only object store

pub mod cursor;
mod service;
mod types;

pub use cursor::{PageCursorResolver, PageStart, SCAN_BATCH};
pub use service::ListingService;
pub use types::*;
