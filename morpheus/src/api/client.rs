use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiErrorDetails, ApiErrorResponse, ApiQueryParams};
use super::error::ApiError;

/// Morpheus API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

/// Connection settings for the underlying HTTP client
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub max_idle_connections: usize,
    pub idle_timeout: Duration,
    pub connection_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_idle_connections: 10,
            idle_timeout: Duration::from_secs(90),
            connection_timeout: Duration::from_secs(10),
            tcp_keepalive: Some(Duration::from_secs(30)),
        }
    }
}

/// Build the reqwest client shared by the API client and the login call
pub(crate) fn build_http_client(
    insecure: bool,
    retry_config: &RetryConfig,
    connection: &ConnectionConfig,
) -> Result<reqwest::Client, ApiError> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(insecure)
        .timeout(Duration::from_secs(retry_config.timeout_seconds))
        .connect_timeout(connection.connection_timeout)
        .pool_idle_timeout(connection.idle_timeout)
        .pool_max_idle_per_host(connection.max_idle_connections);

    if let Some(keepalive) = connection.tcp_keepalive {
        builder = builder.tcp_keepalive(keepalive);
    }

    Ok(builder.build()?)
}

/// Validate the appliance URL and strip any trailing slash
pub(crate) fn normalize_base_url(endpoint: &str) -> Result<String, ApiError> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(endpoint.trim_end_matches('/').to_string()),
        other => Err(ApiError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, endpoint
        ))),
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, access_token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(endpoint, access_token, insecure, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        access_token: &str,
        insecure: bool,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let http_client =
            build_http_client(insecure, &retry_config, &ConnectionConfig::default())?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: normalize_base_url(endpoint)?,
                auth_header: format!("Bearer {}", access_token),
                retry_config,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async move {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("GET request to: {}", url);

                self.inner
                    .http_client
                    .get(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .header(ACCEPT, "application/json")
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_params<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// Execute a POST request with retry logic
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async move {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("POST request to: {}", url);

                self.inner
                    .http_client
                    .post(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .header(ACCEPT, "application/json")
                    .json(body)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute a PUT request with retry logic
    pub async fn put<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async move {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("PUT request to: {}", url);

                self.inner
                    .http_client
                    .put(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .header(ACCEPT, "application/json")
                    .json(body)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute a DELETE request with retry logic
    pub async fn delete<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async move {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("DELETE request to: {}", url);

                self.inner
                    .http_client
                    .delete(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .header(ACCEPT, "application/json")
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Library API operations (node types, instance types, layouts)
    pub fn library(&self) -> crate::api::library::LibraryApi<'_> {
        crate::api::library::LibraryApi::new(self)
    }

    /// User and role operations
    pub fn users(&self) -> crate::api::users::UsersApi<'_> {
        crate::api::users::UsersApi::new(self)
    }

    pub fn roles(&self) -> crate::api::roles::RolesApi<'_> {
        crate::api::roles::RolesApi::new(self)
    }

    pub fn credentials(&self) -> crate::api::credentials::CredentialsApi<'_> {
        crate::api::credentials::CredentialsApi::new(self)
    }

    pub fn integrations(&self) -> crate::api::integrations::IntegrationsApi<'_> {
        crate::api::integrations::IntegrationsApi::new(self)
    }

    /// Cloud (zone) operations
    pub fn clouds(&self) -> crate::api::clouds::CloudsApi<'_> {
        crate::api::clouds::CloudsApi::new(self)
    }

    /// Execute request with retry logic
    async fn execute_with_retry<F, Fut, T>(&self, request_fn: F, path: &str) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
        T: for<'de> Deserialize<'de>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::warn!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return parse_success_response(response).await;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return handle_error_response(response).await;
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }
}

/// Parse successful response; an empty body reads as JSON null
pub(crate) async fn parse_success_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let text = response.text().await?;
    tracing::trace!("API response body: {}", text);

    let body = if text.trim().is_empty() { "null" } else { &text };

    serde_json::from_str::<T>(body).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
        ApiError::ParseError(format!("Failed to parse response: {}", e))
    })
}

/// Turn a non-success response into `ApiError::ApiError`, keeping the
/// server's message and field errors when the body has them
pub(crate) async fn handle_error_response<T>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let (message, details) = match serde_json::from_str::<ApiErrorResponse>(&text) {
        Ok(err_resp) => {
            let message = err_resp.msg.clone().unwrap_or_else(|| text.clone());
            (
                message,
                Some(Box::new(ApiErrorDetails {
                    message: err_resp.msg,
                    field_errors: err_resp.errors,
                })),
            )
        }
        Err(_) => (text, None),
    };

    Err(ApiError::ApiError {
        status,
        message,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::SuccessResponse;
    use crate::api::test_helpers::create_test_client;
    use mockito::Server;

    fn fast_retries() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn client_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ping")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let response: SuccessResponse = client.get("/api/ping").await.unwrap();

        assert!(response.success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_handles_authentication_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ping")
            .with_status(401)
            .with_body(r#"{"error":"invalid_token"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result: Result<SuccessResponse, _> = client.get("/api/ping").await;

        assert!(matches!(result, Err(ApiError::AuthError)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_retries_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ping")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client =
            Client::with_config(&server.url(), "test-token", false, fast_retries()).unwrap();
        let result: Result<SuccessResponse, _> = client.get("/api/ping").await;

        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_reports_not_found_with_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/users/9")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"User not found"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .get::<SuccessResponse>("/api/users/9")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("User not found"));
    }

    #[tokio::test]
    async fn client_keeps_field_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/users")
            .with_status(400)
            .with_body(r#"{"success":false,"msg":"Invalid","errors":{"email":"is invalid"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .post::<SuccessResponse, _>("/api/users", &serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            ApiError::ApiError {
                status, details, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(details.unwrap().field_errors["email"], "is invalid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn client_accepts_empty_bodies() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/users/1")
            .with_status(200)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result: Result<(), _> = client.delete("/api/users/1").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ping")
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = Client::new(&format!("{}/", server.url()), "token", false).unwrap();
        assert!(!client.base_url().ends_with('/'));

        let _: SuccessResponse = client.get("/api/ping").await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn client_rejects_invalid_urls() {
        assert!(matches!(
            Client::new("not a url", "token", false),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            Client::new("ftp://morpheus.local", "token", false),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn client_handles_network_errors() {
        let client = Client::with_config(
            "http://127.0.0.1:1",
            "token",
            false,
            RetryConfig {
                max_retries: 0,
                ..fast_retries()
            },
        )
        .unwrap();

        let result: Result<SuccessResponse, _> = client.get("/api/ping").await;
        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
    }
}
