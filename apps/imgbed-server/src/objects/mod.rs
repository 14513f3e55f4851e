//! Admin operations on stored objects: folders, deletion and byte-serving

mod delete;
mod fetch;
mod folder;

pub use delete::{split_keys, DeletePolicy, Deleter};
pub use fetch::{fetch_object, ObjectResponse};
pub use folder::{create_folder, is_valid_folder_name, FolderError};
