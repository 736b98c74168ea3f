//! Cloud data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::validate_config;
use tracing::debug;

use super::exactly_one;
use crate::resources::state::{not_configured, required_string, set_optional_string};

#[derive(Default)]
pub struct CloudDataSource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl CloudDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a Morpheus cloud by name")
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The exact name of the cloud")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The ID of the cloud")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .description("The code of the cloud")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("location", AttributeType::String)
                    .description("Where the cloud is located")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cloud_type", AttributeType::String)
                    .description("The cloud type code")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .description("The sync status of the cloud")
                    .computed()
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for CloudDataSource {
    fn type_name(&self) -> &str {
        "morpheus_cloud"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_definition(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: validate_config(&Self::schema_definition(), &request.config),
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let name = match required_string(&request.config, "name") {
            Ok(name) => name,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        debug!("Looking up cloud '{}'", name);
        let cloud = match provider_data.client.clouds().find_by_name(&name).await {
            Ok(found) => match exactly_one("Cloud", &name, found) {
                Ok(cloud) => cloud,
                Err(diag) => {
                    diagnostics.push(diag);
                    return ReadDataSourceResponse {
                        state: DynamicValue::null(),
                        diagnostics,
                    };
                }
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to look up cloud",
                    format!("API error: {}", e),
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let mut state = request.config;
        let _ = state.set_string(&AttributePath::new("id"), cloud.id.to_string());
        set_optional_string(&mut state, "code", cloud.code.clone());
        set_optional_string(&mut state, "location", cloud.location.clone());
        set_optional_string(
            &mut state,
            "cloud_type",
            cloud.cloud_type_code().map(str::to_string),
        );
        let _ = state.set_string(
            &AttributePath::new("status"),
            cloud.status_or_unknown().to_string(),
        );

        ReadDataSourceResponse { state, diagnostics }
    }
}

#[async_trait]
impl DataSourceWithConfigure for CloudDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<crate::MorpheusProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract MorpheusProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            ));
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{object, string, test_provider_data};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn configured(server_url: &str) -> CloudDataSource {
        let mut data_source = CloudDataSource::new();
        data_source.provider_data = Some(test_provider_data(server_url));
        data_source
    }

    async fn read(data_source: &CloudDataSource, name: &str) -> ReadDataSourceResponse {
        data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "morpheus_cloud".to_string(),
                    config: object(&[("name", string(name))]),
                },
            )
            .await
    }

    #[tokio::test]
    async fn read_resolves_exact_name() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/zones")
            .match_query(Matcher::UrlEncoded("name".into(), "lab".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "zones": [
                        {"id": 5, "name": "lab", "code": "lab-vmware", "location": "rack 4",
                         "zoneType": {"code": "vmware"}, "status": "ok"},
                        {"id": 6, "name": "lab-2", "zoneType": {"code": "vmware"}, "status": "ok"}
                    ],
                    "meta": {"total": 2, "size": 2, "max": 25, "offset": 0}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let response = read(&configured(&server.url()), "lab").await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "5");
        assert_eq!(
            state.get_string(&AttributePath::new("cloud_type")).unwrap(),
            "vmware"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("location")).unwrap(),
            "rack 4"
        );
        assert_eq!(state.get_string(&AttributePath::new("status")).unwrap(), "ok");
    }

    #[tokio::test]
    async fn read_fails_when_no_cloud_matches() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/zones")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"zones": [], "meta": {"total": 0}}"#)
            .create_async()
            .await;

        let response = read(&configured(&server.url()), "lab").await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Cloud not found");
    }

    #[tokio::test]
    async fn read_fails_on_duplicate_names() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/zones")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"zones": [{"id": 5, "name": "lab"}, {"id": 8, "name": "lab"}]}).to_string(),
            )
            .create_async()
            .await;

        let response = read(&configured(&server.url()), "lab").await;

        assert_eq!(response.diagnostics[0].summary, "Multiple clouds found");
        assert!(response.state.is_null());
    }

    #[tokio::test]
    async fn read_without_provider_data() {
        let response = read(&CloudDataSource::new(), "lab").await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
