//! Test helpers for the Morpheus API

#[cfg(test)]
#[allow(dead_code)]
pub fn create_test_client(url: &str) -> super::Client {
    super::Client::with_config(
        url,
        "test-token",
        false,
        super::RetryConfig {
            max_retries: 1,
            initial_backoff_ms: 1,
            max_backoff_ms: 10,
            timeout_seconds: 5,
        },
    )
    .unwrap()
}

/// JSON response mock with the content type Morpheus sends
#[cfg(test)]
#[allow(dead_code)]
pub async fn mock_json(
    server: &mut mockito::ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: serde_json::Value,
) -> mockito::Mock {
    server
        .mock(method, path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn connection_config_defaults() {
        use client::ConnectionConfig;

        let config = ConnectionConfig::default();
        assert_eq!(config.max_idle_connections, 10);
        assert_eq!(config.idle_timeout.as_secs(), 90);
        assert_eq!(config.connection_timeout.as_secs(), 10);
        assert_eq!(config.tcp_keepalive.unwrap().as_secs(), 30);
    }

    #[test]
    fn api_error_formatting() {
        use std::collections::HashMap;

        let details = ApiErrorDetails {
            message: Some("Unable to save".to_string()),
            field_errors: HashMap::from([("name".to_string(), "is taken".to_string())]),
        };

        let error = ApiError::ApiError {
            status: 400,
            message: "Unable to save".to_string(),
            details: Some(Box::new(details)),
        };

        let error_str = error.to_string();
        assert!(error_str.contains("HTTP 400"));
        assert!(error_str.contains("Unable to save"));
        assert!(!error.is_not_found());
        assert_eq!(error.status(), Some(400));
    }
}
