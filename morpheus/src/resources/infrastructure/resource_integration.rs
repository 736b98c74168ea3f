//! Integration resource implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::RequiresReplaceIfChanged;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{validate_config, StringLengthValidator};
use tracing::{debug, info, warn};

use crate::api::integrations::{Integration, IntegrationRequest};
use crate::resources::state::{
    clear_unknowns, id_attribute, import_by_id, not_configured, optional_bool, optional_string,
    required_string, resource_id, secret_to_send, set_optional_string,
};
use crate::secret::{stored_hash, SecretPolicy, SuppressSecretDiff};

#[derive(Default)]
pub struct IntegrationResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl IntegrationResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an integration with an external service")
            .attribute(id_attribute("The ID of the integration"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the integration")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("integration_type", AttributeType::String)
                    .description("The integration type code (e.g. ansible, git, servicenow)")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("url", AttributeType::String)
                    .description("The URL of the integrated service")
                    .required()
                    .validator(StringLengthValidator {
                        min: Some(1),
                        max: None,
                    })
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("The username used to authenticate with the service")
                    .optional()
                    .build(),
            )
            .attribute(
                // older appliances never report a digest, so an empty stored value is not a change
                AttributeBuilder::new("password", AttributeType::String)
                    .description("The password used to authenticate with the service")
                    .optional()
                    .sensitive()
                    .plan_modifier(SuppressSecretDiff::new(
                        SecretPolicy::EmptyStoredIsUnchanged,
                    ))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the integration is enabled")
                    .optional()
                    .computed()
                    .build(),
            )
            .build()
    }

    fn extract_integration_config(
        &self,
        config: &DynamicValue,
        planned: &DynamicValue,
        prior: Option<&DynamicValue>,
    ) -> Result<IntegrationRequest, Diagnostic> {
        Ok(IntegrationRequest {
            name: required_string(config, "name")?,
            integration_type: required_string(config, "integration_type")?,
            service_url: required_string(config, "url")?,
            service_username: optional_string(config, "username"),
            service_password: secret_to_send(config, planned, prior, "password"),
            enabled: optional_bool(config, "enabled"),
        })
    }

    fn apply_integration(state: &mut DynamicValue, integration: &Integration) {
        let _ = state.set_string(&AttributePath::new("id"), integration.id.to_string());
        let _ = state.set_string(&AttributePath::new("name"), integration.name.clone());
        set_optional_string(
            state,
            "integration_type",
            integration.integration_type.clone(),
        );
        set_optional_string(state, "url", integration.service_url.clone());
        set_optional_string(state, "username", integration.service_username.clone());
        let _ = state.set_bool(&AttributePath::new("enabled"), integration.enabled);

        let password = AttributePath::new("password");
        let planned = state.get_string(&password).ok();
        if let Some(hash) = stored_hash(
            planned.as_deref(),
            integration.service_password_hash.as_deref(),
        ) {
            let _ = state.set_string(&password, hash);
        }
    }
}

#[async_trait]
impl Resource for IntegrationResource {
    fn type_name(&self) -> &str {
        "morpheus_integration"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_definition(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: validate_config(&Self::schema_definition(), &request.config),
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let integration_request =
            match self.extract_integration_config(&request.config, &request.planned_state, None) {
                Ok(r) => r,
                Err(diag) => {
                    diagnostics.push(diag);
                    return CreateResourceResponse {
                        new_state: request.planned_state,
                        diagnostics,
                    };
                }
            };

        let api = provider_data.client.integrations();
        match api.create(&integration_request).await {
            Ok(created) => {
                info!("Created integration {} ({})", created.name, created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.get(created.id).await {
                    Ok(integration) => Self::apply_integration(&mut new_state, &integration),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read integration",
                        format!("API error: {}", e),
                    )),
                }
                clear_unknowns(&mut new_state);

                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create integration",
                    format!("API error: {}", e),
                ));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let id = match resource_id(&request.current_state) {
            Ok(id) => id,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        match provider_data.client.integrations().get(id).await {
            Ok(integration) => {
                let mut new_state = request.current_state;
                Self::apply_integration(&mut new_state, &integration);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Integration {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read integration",
                    format!("API error: {}", e),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let (id, integration_request) = match resource_id(&request.prior_state).and_then(|id| {
            self.extract_integration_config(
                &request.config,
                &request.planned_state,
                Some(&request.prior_state),
            )
            .map(|r| (id, r))
        }) {
            Ok(v) => v,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        if integration_request.service_password.is_some() {
            debug!("Password of integration {} changed, sending new value", id);
        }

        let api = provider_data.client.integrations();
        match api.update(id, &integration_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.get(id).await {
                    Ok(integration) => Self::apply_integration(&mut new_state, &integration),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read integration",
                        format!("API error: {}", e),
                    )),
                }
                clear_unknowns(&mut new_state);

                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update integration",
                    format!("API error: {}", e),
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return DeleteResourceResponse { diagnostics };
            }
        };

        let id = match resource_id(&request.prior_state) {
            Ok(id) => id,
            Err(_) => return DeleteResourceResponse { diagnostics },
        };

        match provider_data.client.integrations().delete(id).await {
            Ok(()) => info!("Deleted integration {}", id),
            Err(e) if e.is_not_found() => warn!("Integration {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete integration",
                format!("API error: {}", e),
            )),
        }

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_by_id(request)
    }
}

#[async_trait]
impl ResourceWithConfigure for IntegrationResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
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
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
#[path = "./resource_integration_test.rs"]
mod resource_integration_test;
