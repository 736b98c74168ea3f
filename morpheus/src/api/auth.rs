//! Password grant login against the Morpheus OAuth endpoint

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;

use super::client::{
    build_http_client, handle_error_response, normalize_base_url, ConnectionConfig, RetryConfig,
};
use super::common::ApiQueryParams;
use super::error::ApiError;

const TOKEN_PATH: &str = "/oauth/token";
const CLIENT_ID: &str = "morph-api";

/// Access token obtained from a username/password login
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    /// Seconds until expiry
    expires_in: Option<i64>,
}

/// Exchange a username and password for an access token
pub async fn login(
    endpoint: &str,
    username: &str,
    password: &str,
    insecure: bool,
) -> Result<AccessToken, ApiError> {
    let base_url = normalize_base_url(endpoint)?;
    let http_client = build_http_client(
        insecure,
        &RetryConfig::default(),
        &ConnectionConfig::default(),
    )?;

    let query = ApiQueryParams::new()
        .add("grant_type", "password")
        .add("scope", "write")
        .add("client_id", CLIENT_ID)
        .to_query_string();
    let url = format!("{}{}{}", base_url, TOKEN_PATH, query);

    tracing::debug!("POST request to: {}{}", base_url, TOKEN_PATH);

    let response = http_client
        .post(&url)
        .form(&[("username", username), ("password", password)])
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST {
        tracing::warn!("Login rejected for user {}", username);
        return Err(ApiError::AuthError);
    }
    if !status.is_success() {
        return handle_error_response(response).await;
    }

    let token: TokenResponse = super::client::parse_success_response(response).await?;
    let expires_at = token
        .expires_in
        .map(|secs| Utc::now() + ChronoDuration::seconds(secs));

    Ok(AccessToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
    })
}
