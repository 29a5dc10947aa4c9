//! Component configuration commands.

use serde::Deserialize;
use serde_json::Value;
use tabled::{Table, Tabled};

use crate::cli::api_client::ApiClient;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, format_opt, truncate_with_ellipsis};

#[derive(Debug, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub rest: Value,
}

#[derive(Debug, Deserialize)]
struct ComponentListResponse {
    items: Vec<Component>,
    total: usize,
}

#[derive(Tabled)]
struct ComponentDisplay {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Component> for ComponentDisplay {
    fn from(c: &Component) -> Self {
        Self {
            name: truncate_with_ellipsis(&c.name, 40),
            kind: c.kind.clone(),
            updated: format_opt(c.updated_at.as_ref()),
        }
    }
}

fn scoped(path: String, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("{path}?scope={scope}"),
        None => path,
    }
}

/// Read a component body from a file. JSON by default, YAML for .yaml/.yml.
fn read_body(path: &str) -> CliResult<Value> {
    let raw = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    if path.ends_with(".yaml") || path.ends_with(".yml") {
        serde_yaml::from_str(&raw).map_err(|e| CliError::InvalidArgument {
            message: format!("{path} is not valid YAML: {e}"),
        })
    } else {
        serde_json::from_str(&raw).map_err(|e| CliError::InvalidArgument {
            message: format!("{path} is not valid JSON: {e}"),
        })
    }
}

/// List components of one type
pub async fn list(
    api_client: &ApiClient,
    kind: &str,
    scope: Option<&str>,
    format: &str,
) -> CliResult<String> {
    let path = scoped(format!("/api/v1/config/components/{kind}"), scope);
    let response = api_client.get(&path).send().await?;
    let list: ComponentListResponse = ApiClient::handle_response(response).await?;

    if format == "json" {
        let items: Vec<Value> = list
            .items
            .iter()
            .map(|c| {
                let mut v = c.rest.clone();
                v["name"] = Value::String(c.name.clone());
                v["type"] = Value::String(c.kind.clone());
                v
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&items)?);
    }

    if list.items.is_empty() {
        return Ok(format!("No {kind} configured."));
    }
    let rows: Vec<ComponentDisplay> = list.items.iter().map(|c| c.into()).collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    Ok(format!("{table}\n{} total", list.total))
}

/// Get one component as pretty JSON
pub async fn get(
    api_client: &ApiClient,
    kind: &str,
    name: &str,
    scope: Option<&str>,
) -> CliResult<String> {
    let path = scoped(format!("/api/v1/config/components/{kind}/{name}"), scope);
    let response = api_client.get(&path).send().await?;
    let component: Value = ApiClient::handle_response(response).await?;
    Ok(serde_json::to_string_pretty(&component)?)
}

/// Create a component from a JSON or YAML file
pub async fn create(
    api_client: &ApiClient,
    kind: &str,
    file: &str,
    scope: Option<&str>,
) -> CliResult<String> {
    let body = read_body(file)?;
    let path = scoped(format!("/api/v1/config/components/{kind}"), scope);
    let response = api_client.post(&path).json(&body).send().await?;
    let created: Component = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Created {} '{}'", created.kind, created.name))
}

/// Replace a component from a JSON or YAML file
pub async fn update(
    api_client: &ApiClient,
    kind: &str,
    name: &str,
    file: &str,
    scope: Option<&str>,
) -> CliResult<String> {
    let body = read_body(file)?;
    let path = scoped(format!("/api/v1/config/components/{kind}/{name}"), scope);
    let response = api_client.put(&path).json(&body).send().await?;
    let updated: Component = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Updated {} '{}'", updated.kind, updated.name))
}

/// Merge-patch a component from an inline JSON string
pub async fn patch(
    api_client: &ApiClient,
    kind: &str,
    name: &str,
    patch: &str,
    scope: Option<&str>,
) -> CliResult<String> {
    let body: Value = serde_json::from_str(patch).map_err(|e| CliError::InvalidArgument {
        message: format!("patch is not valid JSON: {e}"),
    })?;
    let path = scoped(format!("/api/v1/config/components/{kind}/{name}"), scope);
    let response = api_client.patch(&path).json(&body).send().await?;
    let updated: Component = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Patched {} '{}'", updated.kind, updated.name))
}

/// Delete a component. Requires --force.
pub async fn delete(
    api_client: &ApiClient,
    kind: &str,
    name: &str,
    scope: Option<&str>,
    force: bool,
) -> CliResult<String> {
    if !force {
        return Err(CliError::InvalidArgument {
            message: format!("deleting {kind} '{name}' requires --force"),
        });
    }
    let path = scoped(format!("/api/v1/config/components/{kind}/{name}"), scope);
    let response = api_client.delete(&path).send().await?;
    if response.status().is_success() {
        Ok(format!("✓ Deleted {kind} '{name}'"))
    } else {
        Err(ApiClient::error_from(response).await)
    }
}

/// Cross-scope resolved view of one component
pub async fn resolved(api_client: &ApiClient, kind: &str, name: &str) -> CliResult<String> {
    let response = api_client
        .get(&format!("/api/v1/config/resolved/{kind}/{name}"))
        .send()
        .await?;
    let component: Value = ApiClient::handle_response(response).await?;
    Ok(serde_json::to_string_pretty(&component)?)
}
