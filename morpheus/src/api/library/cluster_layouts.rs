//! Cluster layout API implementation

use crate::api::common::{ids_of, CodeRef, IdRef, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/library/cluster-layouts";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLayout {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub compute_version: Option<String>,
    #[serde(default)]
    pub creatable: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    pub group_type: Option<CodeRef>,
    pub provision_type: Option<CodeRef>,
    #[serde(default)]
    pub option_types: Vec<IdRef>,
    #[serde(default)]
    pub spec_templates: Vec<IdRef>,
}

impl ClusterLayout {
    pub fn option_type_ids(&self) -> Vec<i64> {
        ids_of(&self.option_types)
    }

    pub fn spec_template_ids(&self) -> Vec<i64> {
        ids_of(&self.spec_templates)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLayoutRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub compute_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creatable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub group_type: CodeRef,
    pub provision_type: CodeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_types: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_templates: Option<Vec<IdRef>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClusterLayoutEnvelope<T> {
    layout: T,
}

pub struct ClusterLayoutsApi<'a> {
    client: &'a Client,
}

impl<'a> ClusterLayoutsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/library/cluster-layouts/{id}
    pub async fn get(&self, id: i64) -> Result<ClusterLayout, ApiError> {
        let response: ClusterLayoutEnvelope<ClusterLayout> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.layout)
    }

    /// POST /api/library/cluster-layouts
    pub async fn create(&self, request: &ClusterLayoutRequest) -> Result<ClusterLayout, ApiError> {
        let body = ClusterLayoutEnvelope { layout: request };
        let response: ClusterLayoutEnvelope<ClusterLayout> =
            self.client.post(BASE_PATH, &body).await?;
        Ok(response.layout)
    }

    /// PUT /api/library/cluster-layouts/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &ClusterLayoutRequest,
    ) -> Result<ClusterLayout, ApiError> {
        let body = ClusterLayoutEnvelope { layout: request };
        let response: ClusterLayoutEnvelope<ClusterLayout> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.layout)
    }

    /// DELETE /api/library/cluster-layouts/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}
