//! Component configuration handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::api::notifier::UpdateMessage;
use crate::execution::{LlmClient, ToolTransport};
use crate::resolve::ResolvedAgent;
use crate::store::{Component, ComponentType, ConfigStore, Scope, StoreError};

use super::{ApiErr, ErrorResponse, bad_request, resolve_error, store_error};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Serialize, ToSchema)]
pub struct ComponentList {
    pub items: Vec<Component>,
    pub total: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScopeQuery {
    /// Scope to operate on (project, workspace, user). Reads default to
    /// priority order; writes default to project.
    #[param(example = "project")]
    pub scope: Option<String>,
}

impl ScopeQuery {
    fn parse(&self) -> Result<Option<Scope>, ApiErr> {
        self.scope
            .as_deref()
            .map(Scope::from_str)
            .transpose()
            .map_err(|e| bad_request(e.to_string()))
    }
}

fn parse_kind(kind: &str) -> Result<ComponentType, ApiErr> {
    ComponentType::from_str(kind)
        .map_err(|e| super::error_response(StatusCode::NOT_FOUND, e.to_string()))
}

/// Deserialize a request body into a component, forcing the path's type
/// and name. A body that names a different type or name is rejected.
fn component_from_body(
    kind: ComponentType,
    name: Option<&str>,
    mut body: Value,
) -> Result<Component, ApiErr> {
    let Some(obj) = body.as_object_mut() else {
        return Err(bad_request("request body must be a JSON object"));
    };
    if let Some(body_kind) = obj.get("type").and_then(|v| v.as_str())
        && ComponentType::from_str(body_kind).ok() != Some(kind)
    {
        return Err(bad_request(format!(
            "body type '{body_kind}' does not match path type '{kind}'"
        )));
    }
    obj.insert("type".to_string(), Value::String(kind.to_string()));

    if let Some(name) = name {
        if let Some(body_name) = obj.get("name").and_then(|v| v.as_str())
            && body_name != name
        {
            return Err(bad_request(format!(
                "body name '{body_name}' does not match path name '{name}'"
            )));
        }
        obj.insert("name".to_string(), Value::String(name.to_string()));
    }

    serde_json::from_value(body).map_err(|e| bad_request(format!("invalid component: {e}")))
}

/// Find the highest-priority scope holding a component.
async fn owning_scope<S: ConfigStore>(
    store: &S,
    kind: ComponentType,
    name: &str,
) -> Result<Scope, ApiErr> {
    for scope in Scope::iter_by_priority() {
        match store.get_in_scope(scope, kind, name).await {
            Ok(_) => return Ok(scope),
            Err(StoreError::NotFound { .. }) => continue,
            Err(e) => return Err(store_error(e)),
        }
    }
    Err(store_error(StoreError::NotFound {
        kind: kind.to_string(),
        name: name.to_string(),
    }))
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/config/components/{type}",
    tag = "config",
    params(("type" = String, Path, description = "Component type segment"), ScopeQuery),
    responses(
        (status = 200, description = "List of components", body = ComponentList),
        (status = 404, description = "Unknown component type", body = ErrorResponse)
    )
)]
/// List components of a type, merged across scopes by priority
pub async fn list_components<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path(kind): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ComponentList>, ApiErr> {
    let kind = parse_kind(&kind)?;
    let items = match query.parse()? {
        Some(scope) => state.store().list_in_scope(scope, kind).await,
        None => state.store().list(kind).await,
    }
    .map_err(store_error)?;
    Ok(Json(ComponentList {
        total: items.len(),
        items,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/config/components/{type}",
    tag = "config",
    params(("type" = String, Path, description = "Component type segment"), ScopeQuery),
    request_body = Component,
    responses(
        (status = 201, description = "Component created", body = Component),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Duplicate name in scope", body = ErrorResponse)
    )
)]
/// Create a component in a scope (default: project)
pub async fn create_component<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path(kind): Path<String>,
    Query(query): Query<ScopeQuery>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Component>), ApiErr> {
    let kind = parse_kind(&kind)?;
    let scope = query.parse()?.unwrap_or(Scope::Project);
    let component = component_from_body(kind, None, body)?;
    let created = state
        .store()
        .create(scope, &component)
        .await
        .map_err(store_error)?;

    state.notifier().notify(UpdateMessage::ComponentCreated {
        kind,
        name: created.name.clone(),
        scope,
    });

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/config/components/{type}/{name}",
    tag = "config",
    params(
        ("type" = String, Path, description = "Component type segment"),
        ("name" = String, Path, description = "Component name"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Component found", body = Component),
        (status = 404, description = "Component not found", body = ErrorResponse)
    )
)]
/// Get a component, searching scopes in priority order
pub async fn get_component<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Component>, ApiErr> {
    let kind = parse_kind(&kind)?;
    let component = match query.parse()? {
        Some(scope) => state.store().get_in_scope(scope, kind, &name).await,
        None => state.store().get(kind, &name).await,
    }
    .map_err(store_error)?;
    Ok(Json(component))
}

#[utoipa::path(
    put,
    path = "/api/v1/config/components/{type}/{name}",
    tag = "config",
    params(
        ("type" = String, Path, description = "Component type segment"),
        ("name" = String, Path, description = "Component name"),
        ScopeQuery
    ),
    request_body = Component,
    responses(
        (status = 200, description = "Component replaced", body = Component),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Component not found", body = ErrorResponse)
    )
)]
/// Replace (fully update) a component (PUT)
pub async fn put_component<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Component>, ApiErr> {
    let kind = parse_kind(&kind)?;
    let scope = match query.parse()? {
        Some(scope) => scope,
        None => owning_scope(state.store(), kind, &name).await?,
    };
    let component = component_from_body(kind, Some(&name), body)?;
    let updated = state
        .store()
        .update(scope, &component)
        .await
        .map_err(store_error)?;

    state.notifier().notify(UpdateMessage::ComponentUpdated {
        kind,
        name: name.clone(),
        scope,
    });

    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/v1/config/components/{type}/{name}",
    tag = "config",
    params(
        ("type" = String, Path, description = "Component type segment"),
        ("name" = String, Path, description = "Component name"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Component patched", body = Component),
        (status = 400, description = "Invalid patch", body = ErrorResponse),
        (status = 404, description = "Component not found", body = ErrorResponse)
    )
)]
/// Merge-patch a component: objects merge key-wise, null clears a key
pub async fn patch_component<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
    Json(patch): Json<Value>,
) -> Result<Json<Component>, ApiErr> {
    let kind = parse_kind(&kind)?;
    let scope = match query.parse()? {
        Some(scope) => scope,
        None => owning_scope(state.store(), kind, &name).await?,
    };
    let existing = state
        .store()
        .get_in_scope(scope, kind, &name)
        .await
        .map_err(store_error)?;

    let base = serde_json::to_value(&existing)
        .map_err(|e| bad_request(format!("invalid component: {e}")))?;
    let merged = crate::resolve::merge_values(base, patch);
    let component = component_from_body(kind, Some(&name), merged)?;
    let updated = state
        .store()
        .update(scope, &component)
        .await
        .map_err(store_error)?;

    state.notifier().notify(UpdateMessage::ComponentUpdated {
        kind,
        name: name.clone(),
        scope,
    });

    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/config/components/{type}/{name}",
    tag = "config",
    params(
        ("type" = String, Path, description = "Component type segment"),
        ("name" = String, Path, description = "Component name"),
        ScopeQuery
    ),
    responses(
        (status = 204, description = "Component deleted"),
        (status = 404, description = "Component not found", body = ErrorResponse)
    )
)]
/// Delete a component from a scope
pub async fn delete_component<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, ApiErr> {
    let kind = parse_kind(&kind)?;
    let scope = match query.parse()? {
        Some(scope) => scope,
        None => owning_scope(state.store(), kind, &name).await?,
    };
    state
        .store()
        .delete(scope, kind, &name)
        .await
        .map_err(store_error)?;

    state.notifier().notify(UpdateMessage::ComponentDeleted {
        kind,
        name: name.clone(),
        scope,
    });

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/config/resolved/{type}/{name}",
    tag = "config",
    params(
        ("type" = String, Path, description = "Component type segment"),
        ("name" = String, Path, description = "Component name")
    ),
    responses(
        (status = 200, description = "Resolved component", body = Component),
        (status = 404, description = "Component not found", body = ErrorResponse)
    )
)]
/// Cross-scope resolved view of one component
pub async fn resolved_component<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<Component>, ApiErr> {
    let kind = parse_kind(&kind)?;
    let component = state
        .resolver()
        .resolve_component(kind, &name)
        .await
        .map_err(resolve_error)?;
    Ok(Json(component))
}

#[utoipa::path(
    get,
    path = "/api/v1/config/resolved/agents/{name}/full",
    tag = "config",
    params(("name" = String, Path, description = "Agent name")),
    responses(
        (status = 200, description = "Fully dereferenced agent", body = ResolvedAgent),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 422, description = "Dangling reference", body = ErrorResponse)
    )
)]
/// Fully dereferenced agent chain: agent, host, clients, servers, llm
pub async fn resolved_agent<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path(name): Path<String>,
) -> Result<Json<ResolvedAgent>, ApiErr> {
    let resolved = state
        .resolver()
        .resolve_agent(&name)
        .await
        .map_err(resolve_error)?;
    Ok(Json(resolved))
}
