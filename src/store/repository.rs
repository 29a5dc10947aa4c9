//! Store trait for configuration access abstraction.
//!
//! Defines the contract for component storage, allowing different backends
//! (file-based, in-memory) to be swapped without changing business logic.

use async_trait::async_trait;

use crate::store::{
    StoreResult,
    models::{Component, ComponentType, RootConfig, Scope},
};

/// Layered configuration store.
///
/// A store holds components per scope. Cross-scope lookups follow scope
/// priority: project beats workspace beats user. The store never follows
/// component references; dangling references are a resolve-time concern.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Create a component in a scope. Fails if (type, name) already exists
    /// in that scope.
    async fn create(&self, scope: Scope, component: &Component) -> StoreResult<Component>;

    /// Get a component by type and name, searching scopes in priority order.
    async fn get(&self, kind: ComponentType, name: &str) -> StoreResult<Component>;

    /// Get a component from one specific scope.
    async fn get_in_scope(
        &self,
        scope: Scope,
        kind: ComponentType,
        name: &str,
    ) -> StoreResult<Component>;

    /// List components of a type across all scopes. A name defined in
    /// several scopes appears once, from its highest-priority scope.
    /// Sorted by name.
    async fn list(&self, kind: ComponentType) -> StoreResult<Vec<Component>>;

    /// List components of a type within one scope, sorted by name.
    async fn list_in_scope(&self, scope: Scope, kind: ComponentType)
    -> StoreResult<Vec<Component>>;

    /// Replace an existing component in a scope. Fails if absent.
    async fn update(&self, scope: Scope, component: &Component) -> StoreResult<Component>;

    /// Delete a component from a scope. Fails if absent.
    async fn delete(&self, scope: Scope, kind: ComponentType, name: &str) -> StoreResult<()>;

    /// Read the scope's root configuration. Missing file yields defaults.
    async fn root_config(&self, scope: Scope) -> StoreResult<RootConfig>;

    /// Replace the scope's root configuration.
    async fn set_root_config(&self, scope: Scope, root: &RootConfig) -> StoreResult<()>;
}
