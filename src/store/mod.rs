//! Configuration store abstraction.
//!
//! Provides trait-based access to layered configuration components,
//! allowing different backends (file-based, in-memory) to be swapped
//! without changing business logic.
//!
//! # Architecture
//!
//! - `error`: Backend-agnostic error types
//! - `models`: Domain entities (Component, Scope, RootConfig)
//! - `repository`: The `ConfigStore` trait
//! - `file`: File-backed implementation with a DashMap cache

mod error;
mod file;
mod models;
mod repository;

#[cfg(test)]
mod models_test;

pub use error::{StoreError, StoreResult};
pub use file::{FileStore, StoreLayout, default_user_dir};
pub use models::*;
pub use repository::ConfigStore;
