//! Instance type API implementation

use crate::api::common::{ids_of, IdRef, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/library/instance-types";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceType {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub visibility: Option<String>,
    pub environment_prefix: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub option_types: Vec<IdRef>,
}

impl InstanceType {
    pub fn option_type_ids(&self) -> Vec<i64> {
        ids_of(&self.option_types)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTypeRequest {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_types: Option<Vec<IdRef>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstanceTypeEnvelope<T> {
    #[serde(rename = "instanceType")]
    instance_type: T,
}

pub struct InstanceTypesApi<'a> {
    client: &'a Client,
}

impl<'a> InstanceTypesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/library/instance-types/{id}
    pub async fn get(&self, id: i64) -> Result<InstanceType, ApiError> {
        let response: InstanceTypeEnvelope<InstanceType> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.instance_type)
    }

    /// POST /api/library/instance-types
    pub async fn create(&self, request: &InstanceTypeRequest) -> Result<InstanceType, ApiError> {
        let body = InstanceTypeEnvelope {
            instance_type: request,
        };
        let response: InstanceTypeEnvelope<InstanceType> =
            self.client.post(BASE_PATH, &body).await?;
        Ok(response.instance_type)
    }

    /// PUT /api/library/instance-types/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &InstanceTypeRequest,
    ) -> Result<InstanceType, ApiError> {
        let body = InstanceTypeEnvelope {
            instance_type: request,
        };
        let response: InstanceTypeEnvelope<InstanceType> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.instance_type)
    }

    /// DELETE /api/library/instance-types/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{create_test_client, mock_json};
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn get_defaults_missing_collections() {
        let mut server = Server::new_async().await;
        let _m = mock_json(
            &mut server,
            "GET",
            "/api/library/instance-types/4",
            200,
            json!({"instanceType": {"id": 4, "name": "Web", "code": "web"}}),
        )
        .await;

        let client = create_test_client(&server.url());
        let instance_type = client.library().instance_types().get(4).await.unwrap();

        assert_eq!(instance_type.code, "web");
        assert!(!instance_type.featured);
        assert!(instance_type.labels.is_empty());
        assert!(instance_type.option_type_ids().is_empty());
    }

    #[tokio::test]
    async fn update_skips_unset_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/library/instance-types/4")
            .match_body(Matcher::Json(json!({
                "instanceType": {
                    "name": "Web",
                    "code": "web",
                    "visibility": "public",
                    "optionTypes": [{"id": 8}]
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"instanceType": {
                    "id": 4, "name": "Web", "code": "web", "visibility": "public",
                    "optionTypes": [{"id": 8}]
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let request = InstanceTypeRequest {
            name: "Web".to_string(),
            code: "web".to_string(),
            description: None,
            category: None,
            visibility: Some("public".to_string()),
            environment_prefix: None,
            featured: None,
            labels: None,
            option_types: Some(vec![IdRef { id: 8 }]),
        };

        let updated = client
            .library()
            .instance_types()
            .update(4, &request)
            .await
            .unwrap();
        assert_eq!(updated.option_type_ids(), vec![8]);
        mock.assert_async().await;
    }
}
