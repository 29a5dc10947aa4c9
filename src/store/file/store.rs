//! File-backed configuration store.
//!
//! One directory per scope, one file per component:
//! `<scope_dir>/<segment>/<name>.json` plus `root.json` at the scope root.
//! YAML files (`.yaml`/`.yml`) are read transparently; writes always
//! produce JSON. Parsed components are cached in a DashMap keyed by
//! (scope, type, name); writes go through the cache.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use crate::store::file::paths::StoreLayout;
use crate::store::models::{Component, ComponentType, RootConfig, Scope, validate_name};
use crate::store::{ConfigStore, StoreError, StoreResult};

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// File-backed [`ConfigStore`].
pub struct FileStore {
    layout: StoreLayout,
    cache: DashMap<(Scope, ComponentType, String), Component>,
}

impl FileStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            layout,
            cache: DashMap::new(),
        }
    }

    /// Layout accessor, used by the API info endpoint.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    fn type_dir(&self, scope: Scope, kind: ComponentType) -> PathBuf {
        self.layout.scope_dir(scope).join(kind.segment())
    }

    /// Find the on-disk file for a component, trying each extension.
    async fn find_file(&self, scope: Scope, kind: ComponentType, name: &str) -> Option<PathBuf> {
        let dir = self.type_dir(scope, kind);
        for ext in EXTENSIONS {
            let path = dir.join(format!("{name}.{ext}"));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Some(path);
            }
        }
        None
    }

    async fn read_component(&self, path: &Path) -> StoreResult<Component> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let component: Component = if is_yaml {
            serde_yaml::from_str(&raw).map_err(|e| StoreError::Serde {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&raw).map_err(|e| StoreError::Serde {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        };

        // The file stem is authoritative for lookups; a disagreeing name
        // field would make the component unaddressable.
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if component.name != stem {
            return Err(StoreError::Validation {
                message: format!(
                    "component name '{}' does not match file name '{}' in {}",
                    component.name,
                    stem,
                    path.display()
                ),
            });
        }

        Ok(component)
    }

    async fn write_component(
        &self,
        scope: Scope,
        component: &Component,
    ) -> StoreResult<Component> {
        let dir = self.type_dir(scope, component.kind());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| StoreError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let path = dir.join(format!("{}.json", component.name));
        let body = serde_json::to_string_pretty(component).map_err(|e| StoreError::Serde {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, body).await.map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.cache.insert(
            (scope, component.kind(), component.name.clone()),
            component.clone(),
        );
        Ok(component.clone())
    }

    async fn load(
        &self,
        scope: Scope,
        kind: ComponentType,
        name: &str,
    ) -> StoreResult<Option<Component>> {
        if let Some(hit) = self.cache.get(&(scope, kind, name.to_string())) {
            return Ok(Some(hit.clone()));
        }
        let Some(path) = self.find_file(scope, kind, name).await else {
            return Ok(None);
        };
        let component = self.read_component(&path).await?;
        self.cache
            .insert((scope, kind, name.to_string()), component.clone());
        Ok(Some(component))
    }

    /// Component names present in one scope's type directory.
    async fn names_in_scope(
        &self,
        scope: Scope,
        kind: ComponentType,
    ) -> StoreResult<BTreeSet<String>> {
        let dir = self.type_dir(scope, kind);
        let mut names = BTreeSet::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // Missing scope directories are treated as empty
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => {
                return Err(StoreError::Io {
                    path: dir.display().to_string(),
                    message: e.to_string(),
                });
            }
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })? {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if EXTENSIONS.contains(&ext)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.insert(stem.to_string());
            }
        }
        Ok(names)
    }

    fn not_found(kind: ComponentType, name: &str) -> StoreError {
        StoreError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn create(&self, scope: Scope, component: &Component) -> StoreResult<Component> {
        validate_name(&component.name)?;
        if self
            .load(scope, component.kind(), &component.name)
            .await?
            .is_some()
        {
            return Err(StoreError::AlreadyExists {
                kind: component.kind().to_string(),
                name: component.name.clone(),
                scope: scope.to_string(),
            });
        }

        let now = Utc::now();
        let mut component = component.clone();
        component.created_at = Some(now);
        component.updated_at = Some(now);
        debug!(scope = %scope, kind = %component.kind(), name = %component.name, "creating component");
        self.write_component(scope, &component).await
    }

    async fn get(&self, kind: ComponentType, name: &str) -> StoreResult<Component> {
        for scope in Scope::iter_by_priority() {
            if let Some(component) = self.load(scope, kind, name).await? {
                return Ok(component);
            }
        }
        Err(Self::not_found(kind, name))
    }

    async fn get_in_scope(
        &self,
        scope: Scope,
        kind: ComponentType,
        name: &str,
    ) -> StoreResult<Component> {
        self.load(scope, kind, name)
            .await?
            .ok_or_else(|| Self::not_found(kind, name))
    }

    async fn list(&self, kind: ComponentType) -> StoreResult<Vec<Component>> {
        let mut names = BTreeSet::new();
        for scope in Scope::iter_by_priority() {
            names.extend(self.names_in_scope(scope, kind).await?);
        }
        let mut components = Vec::with_capacity(names.len());
        for name in names {
            // get() applies scope shadowing
            components.push(self.get(kind, &name).await?);
        }
        Ok(components)
    }

    async fn list_in_scope(
        &self,
        scope: Scope,
        kind: ComponentType,
    ) -> StoreResult<Vec<Component>> {
        let mut components = Vec::new();
        for name in self.names_in_scope(scope, kind).await? {
            if let Some(component) = self.load(scope, kind, &name).await? {
                components.push(component);
            }
        }
        Ok(components)
    }

    async fn update(&self, scope: Scope, component: &Component) -> StoreResult<Component> {
        validate_name(&component.name)?;
        let existing = self
            .load(scope, component.kind(), &component.name)
            .await?
            .ok_or_else(|| Self::not_found(component.kind(), &component.name))?;

        let mut component = component.clone();
        component.created_at = existing.created_at;
        component.updated_at = Some(Utc::now());
        debug!(scope = %scope, kind = %component.kind(), name = %component.name, "updating component");
        self.write_component(scope, &component).await
    }

    async fn delete(&self, scope: Scope, kind: ComponentType, name: &str) -> StoreResult<()> {
        let path = self
            .find_file(scope, kind, name)
            .await
            .ok_or_else(|| Self::not_found(kind, name))?;
        tokio::fs::remove_file(&path).await.map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.cache.remove(&(scope, kind, name.to_string()));
        debug!(scope = %scope, kind = %kind, name = %name, "deleted component");
        Ok(())
    }

    async fn root_config(&self, scope: Scope) -> StoreResult<RootConfig> {
        let path = self.layout.scope_dir(scope).join("root.json");
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Serde {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RootConfig::default()),
            Err(e) => Err(StoreError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn set_root_config(&self, scope: Scope, root: &RootConfig) -> StoreResult<()> {
        let dir = self.layout.scope_dir(scope);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| StoreError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = dir.join("root.json");
        let body = serde_json::to_string_pretty(root).map_err(|e| StoreError::Serde {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, body).await.map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
