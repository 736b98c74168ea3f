//! Cloud (zone) API implementation

use crate::api::common::{ApiQueryParams, CodeRef, IdRef, ListMeta, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BASE_PATH: &str = "/api/zones";

/// Cloud status values reported while a zone is being brought up
pub const STATUS_INITIALIZING: &str = "initializing";
pub const STATUS_SYNCING: &str = "syncing";
pub const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cloud {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub zone_type: Option<CodeRef>,
    #[serde(default)]
    pub groups: Vec<IdRef>,
    pub status: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    pub visibility: Option<String>,
    /// Free-form type specific settings; values may be any JSON type
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

impl Cloud {
    pub fn status_or_unknown(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn cloud_type_code(&self) -> Option<&str> {
        self.zone_type.as_ref().map(|t| t.code.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRequest {
    pub name: String,
    pub zone_type: CodeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only honoured on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub config: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CloudEnvelope<T> {
    zone: T,
}

#[derive(Debug, Deserialize)]
pub struct CloudList {
    #[serde(default)]
    pub zones: Vec<Cloud>,
    #[serde(default)]
    pub meta: ListMeta,
}

pub struct CloudsApi<'a> {
    client: &'a Client,
}

impl<'a> CloudsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/zones/{id}
    pub async fn get(&self, id: i64) -> Result<Cloud, ApiError> {
        let response: CloudEnvelope<Cloud> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.zone)
    }

    /// GET /api/zones?name={name}
    pub async fn list_by_name(&self, name: &str) -> Result<CloudList, ApiError> {
        let params = ApiQueryParams::new().add("name", name);
        self.client.get_with_params(BASE_PATH, &params).await
    }

    /// Clouds whose name equals `name` exactly
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Cloud>, ApiError> {
        let list = self.list_by_name(name).await?;
        Ok(list.zones.into_iter().filter(|c| c.name == name).collect())
    }

    /// POST /api/zones
    pub async fn create(&self, request: &CloudRequest) -> Result<Cloud, ApiError> {
        let body = CloudEnvelope { zone: request };
        let response: CloudEnvelope<Cloud> = self.client.post(BASE_PATH, &body).await?;
        Ok(response.zone)
    }

    /// PUT /api/zones/{id}
    pub async fn update(&self, id: i64, request: &CloudRequest) -> Result<Cloud, ApiError> {
        let body = CloudEnvelope { zone: request };
        let response: CloudEnvelope<Cloud> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.zone)
    }

    /// DELETE /api/zones/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}
