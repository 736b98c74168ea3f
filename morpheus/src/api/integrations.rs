//! Integration API implementation

use crate::api::common::SuccessResponse;
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/integrations";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub integration_type: Option<String>,
    pub service_url: Option<String>,
    pub service_username: Option<String>,
    /// Older appliances omit this field entirely
    pub service_password_hash: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub integration_type: String,
    pub service_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IntegrationEnvelope<T> {
    integration: T,
}

pub struct IntegrationsApi<'a> {
    client: &'a Client,
}

impl<'a> IntegrationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/integrations/{id}
    pub async fn get(&self, id: i64) -> Result<Integration, ApiError> {
        let response: IntegrationEnvelope<Integration> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.integration)
    }

    /// POST /api/integrations
    pub async fn create(&self, request: &IntegrationRequest) -> Result<Integration, ApiError> {
        let body = IntegrationEnvelope {
            integration: request,
        };
        let response: IntegrationEnvelope<Integration> =
            self.client.post(BASE_PATH, &body).await?;
        Ok(response.integration)
    }

    /// PUT /api/integrations/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &IntegrationRequest,
    ) -> Result<Integration, ApiError> {
        let body = IntegrationEnvelope {
            integration: request,
        };
        let response: IntegrationEnvelope<Integration> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.integration)
    }

    /// DELETE /api/integrations/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}
