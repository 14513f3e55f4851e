//! Static hosting for the browser UI
//!
//! Files under the UI directory are served as-is; any other path gets
//! `index.html` so the UI's history-mode router can take over.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

pub fn service(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}
