//! File-backed store implementation.

mod paths;
mod store;


pub use paths::{StoreLayout, default_user_dir};
pub use store::FileStore;
