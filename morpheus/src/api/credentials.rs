//! Credential store API implementation

use crate::api::common::{CodeRef, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/credentials";

pub const USERNAME_PASSWORD: &str = "username-password";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub credential_type: Option<CodeRef>,
    pub username: Option<String>,
    /// SHA-256 of the stored password, lowercase or uppercase hex
    pub password_hash: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: CodeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialEnvelope<T> {
    credential: T,
}

pub struct CredentialsApi<'a> {
    client: &'a Client,
}

impl<'a> CredentialsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/credentials/{id}
    pub async fn get(&self, id: i64) -> Result<Credential, ApiError> {
        let response: CredentialEnvelope<Credential> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.credential)
    }

    /// POST /api/credentials
    pub async fn create(&self, request: &CredentialRequest) -> Result<Credential, ApiError> {
        let body = CredentialEnvelope {
            credential: request,
        };
        let response: CredentialEnvelope<Credential> = self.client.post(BASE_PATH, &body).await?;
        Ok(response.credential)
    }

    /// PUT /api/credentials/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &CredentialRequest,
    ) -> Result<Credential, ApiError> {
        let body = CredentialEnvelope {
            credential: request,
        };
        let response: CredentialEnvelope<Credential> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.credential)
    }

    /// DELETE /api/credentials/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}
