use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::env;

use crate::cli::error::{CliError, CliResult};

/// API client for communicating with the mcph REST API
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// Priority for base URL:
    /// 1. Explicit `api_url` parameter
    /// 2. MCPH_API_URL environment variable
    /// 3. Default: http://localhost:3900
    pub fn new(api_url: Option<String>) -> Self {
        let base_url = api_url
            .or_else(|| env::var("MCPH_API_URL").ok())
            .unwrap_or_else(|| "http://localhost:3900".to_string());

        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a GET request builder
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.get(&url)
    }

    /// Create a POST request builder
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.post(&url)
    }

    /// Create a PUT request builder
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.put(&url)
    }

    /// Create a PATCH request builder
    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.patch(&url)
    }

    /// Create a DELETE request builder
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.delete(&url)
    }

    /// Handle API response with standardized error handling
    ///
    /// Returns the deserialized response body on success,
    /// or a CliError::ApiError on non-success status codes.
    pub async fn handle_response<T: DeserializeOwned>(response: Response) -> CliResult<T> {
        if response.status().is_success() {
            response.json().await.map_err(|e| CliError::InvalidResponse {
                message: e.to_string(),
            })
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Turn a non-success response into an ApiError, extracting the
    /// `error` field of the standard error body when present.
    pub async fn error_from(response: Response) -> CliError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or(body);
        CliError::ApiError { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Initialize crypto provider once for all tests
    fn init_crypto() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    #[test]
    fn test_new_with_explicit_url() {
        init_crypto();
        let client = ApiClient::new(Some("http://custom:8080".to_string()));
        assert_eq!(client.base_url(), "http://custom:8080");
    }

    #[test]
    #[serial_test::serial]
    fn test_new_with_default() {
        init_crypto();
        unsafe {
            std::env::remove_var("MCPH_API_URL");
        }
        let client = ApiClient::new(None);
        assert_eq!(client.base_url(), "http://localhost:3900");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_overrides_default() {
        init_crypto();
        unsafe {
            std::env::set_var("MCPH_API_URL", "http://env:9999");
        }
        let client = ApiClient::new(None);
        assert_eq!(client.base_url(), "http://env:9999");
        unsafe {
            std::env::remove_var("MCPH_API_URL");
        }
    }

    #[tokio::test]
    async fn test_request_builders_exist() {
        init_crypto();
        let client = ApiClient::new(None);
        let _get = client.get("/api/v1/config/components/servers");
        let _post = client.post("/api/v1/config/components/servers");
        let _put = client.put("/api/v1/config/components/servers/fs");
        let _patch = client.patch("/api/v1/config/components/servers/fs");
        let _delete = client.delete("/api/v1/config/components/servers/fs");
    }
}
