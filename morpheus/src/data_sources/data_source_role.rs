//! Role data source implementation

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

use super::exactly_one;
use crate::resources::state::{not_configured, required_string, set_optional_string};

#[derive(Default)]
pub struct RoleDataSource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl RoleDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a Morpheus role by its authority name")
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The exact authority name of the role")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The ID of the role")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The description of the role")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role_type", AttributeType::String)
                    .description("The role type (user or account)")
                    .computed()
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for RoleDataSource {
    fn type_name(&self) -> &str {
        "morpheus_role"
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

        let role = match required_string(&request.config, "name") {
            Ok(name) => match provider_data.client.roles().find_by_authority(&name).await {
                Ok(found) => exactly_one("Role", &name, found),
                Err(e) => Err(Diagnostic::error(
                    "Failed to look up role",
                    format!("API error: {}", e),
                )),
            },
            Err(diag) => Err(diag),
        };

        match role {
            Ok(role) => {
                let mut state = request.config;
                let _ = state.set_string(&AttributePath::new("id"), role.id.to_string());
                set_optional_string(&mut state, "description", role.description);
                set_optional_string(&mut state, "role_type", role.role_type);
                ReadDataSourceResponse { state, diagnostics }
            }
            Err(diag) => {
                diagnostics.push(diag);
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for RoleDataSource {
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
