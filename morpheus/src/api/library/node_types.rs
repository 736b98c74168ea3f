//! Node type (container type) API implementation

use crate::api::common::{ids_of, CodeRef, IdRef, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/library/container-types";

/// Node type as returned by GET /api/library/container-types/{id}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    pub id: i64,
    pub name: String,
    pub short_name: Option<String>,
    pub container_version: Option<String>,
    pub provision_type: Option<CodeRef>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub option_types: Vec<IdRef>,
    #[serde(default)]
    pub container_scripts: Vec<IdRef>,
    #[serde(default)]
    pub container_templates: Vec<IdRef>,
}

impl NodeType {
    pub fn option_type_ids(&self) -> Vec<i64> {
        ids_of(&self.option_types)
    }

    pub fn script_template_ids(&self) -> Vec<i64> {
        ids_of(&self.container_scripts)
    }

    pub fn file_template_ids(&self) -> Vec<i64> {
        ids_of(&self.container_templates)
    }
}

/// Request body for creating and updating node types
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeRequest {
    pub name: String,
    pub short_name: String,
    pub container_version: String,
    pub provision_type_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_types: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeTypeEnvelope<T> {
    #[serde(rename = "containerType")]
    container_type: T,
}

/// Node types API
pub struct NodeTypesApi<'a> {
    client: &'a Client,
}

impl<'a> NodeTypesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/library/container-types/{id}
    pub async fn get(&self, id: i64) -> Result<NodeType, ApiError> {
        let response: NodeTypeEnvelope<NodeType> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.container_type)
    }

    /// POST /api/library/container-types
    pub async fn create(&self, request: &NodeTypeRequest) -> Result<NodeType, ApiError> {
        let body = NodeTypeEnvelope {
            container_type: request,
        };
        let response: NodeTypeEnvelope<NodeType> = self.client.post(BASE_PATH, &body).await?;
        Ok(response.container_type)
    }

    /// PUT /api/library/container-types/{id}
    pub async fn update(&self, id: i64, request: &NodeTypeRequest) -> Result<NodeType, ApiError> {
        let body = NodeTypeEnvelope {
            container_type: request,
        };
        let response: NodeTypeEnvelope<NodeType> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.container_type)
    }

    /// DELETE /api/library/container-types/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}
