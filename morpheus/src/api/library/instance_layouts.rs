//! Instance layout API implementation
//!
//! Layouts are created under their instance type but read, updated and
//! deleted through the flat /api/library/layouts path.

use crate::api::common::{ids_of, CodeRef, IdRef, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceLayout {
    pub id: i64,
    pub name: String,
    pub instance_version: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub creatable: bool,
    pub memory_requirement: Option<i64>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub instance_type: Option<IdRef>,
    pub provision_type: Option<CodeRef>,
    #[serde(default)]
    pub container_types: Vec<IdRef>,
    #[serde(default)]
    pub option_types: Vec<IdRef>,
    #[serde(default)]
    pub spec_templates: Vec<IdRef>,
}

impl InstanceLayout {
    pub fn node_type_ids(&self) -> Vec<i64> {
        ids_of(&self.container_types)
    }

    pub fn option_type_ids(&self) -> Vec<i64> {
        ids_of(&self.option_types)
    }

    pub fn spec_template_ids(&self) -> Vec<i64> {
        ids_of(&self.spec_templates)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceLayoutRequest {
    pub name: String,
    pub instance_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creatable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_requirement: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub provision_type_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_types: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_types: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_templates: Option<Vec<IdRef>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstanceLayoutEnvelope<T> {
    #[serde(rename = "instanceTypeLayout")]
    instance_type_layout: T,
}

pub struct InstanceLayoutsApi<'a> {
    client: &'a Client,
}

impl<'a> InstanceLayoutsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/library/layouts/{id}
    pub async fn get(&self, id: i64) -> Result<InstanceLayout, ApiError> {
        let response: InstanceLayoutEnvelope<InstanceLayout> = self
            .client
            .get(&format!("/api/library/layouts/{}", id))
            .await?;
        Ok(response.instance_type_layout)
    }

    /// POST /api/library/instance-types/{instance_type_id}/layouts
    pub async fn create(
        &self,
        instance_type_id: i64,
        request: &InstanceLayoutRequest,
    ) -> Result<InstanceLayout, ApiError> {
        let body = InstanceLayoutEnvelope {
            instance_type_layout: request,
        };
        let response: InstanceLayoutEnvelope<InstanceLayout> = self
            .client
            .post(
                &format!("/api/library/instance-types/{}/layouts", instance_type_id),
                &body,
            )
            .await?;
        Ok(response.instance_type_layout)
    }

    /// PUT /api/library/layouts/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &InstanceLayoutRequest,
    ) -> Result<InstanceLayout, ApiError> {
        let body = InstanceLayoutEnvelope {
            instance_type_layout: request,
        };
        let response: InstanceLayoutEnvelope<InstanceLayout> = self
            .client
            .put(&format!("/api/library/layouts/{}", id), &body)
            .await?;
        Ok(response.instance_type_layout)
    }

    /// DELETE /api/library/layouts/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("/api/library/layouts/{}", id))
            .await
            .map(|_| ())
    }
}
