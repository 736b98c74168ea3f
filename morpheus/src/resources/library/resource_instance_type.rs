//! Instance type resource implementation

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
use tfplug::validator::{validate_config, StringOneOfValidator};
use tracing::{info, warn};

use crate::api::common::id_refs;
use crate::api::library::instance_types::{InstanceType, InstanceTypeRequest};
use crate::resources::state::{
    clear_unknowns, id_attribute, id_list_attribute, import_by_id, labels_attribute, not_configured,
    optional_bool, optional_id_list, optional_string, optional_string_list, required_string,
    resource_id, set_id_list, set_optional_string, set_string_list,
};

#[derive(Default)]
pub struct InstanceTypeResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl InstanceTypeResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an instance type in the Morpheus library")
            .attribute(id_attribute("The ID of the instance type"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the instance type")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .description("The unique code of the instance type")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The description of the instance type")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("category", AttributeType::String)
                    .description("The category of the instance type (e.g. web, sql, apps)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("visibility", AttributeType::String)
                    .description("Whether the instance type is visible to sub-tenants (private or public)")
                    .optional()
                    .computed()
                    .validator(StringOneOfValidator::new(&["private", "public"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("environment_prefix", AttributeType::String)
                    .description("Prefix used for environment variables exported by the instance type")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("featured", AttributeType::Bool)
                    .description("Whether the instance type is featured in the catalog")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(labels_attribute())
            .attribute(id_list_attribute(
                "option_type_ids",
                "The ids of the option types attached to the instance type",
            ))
            .build()
    }

    fn extract_instance_type_config(
        &self,
        config: &DynamicValue,
    ) -> Result<InstanceTypeRequest, Diagnostic> {
        Ok(InstanceTypeRequest {
            name: required_string(config, "name")?,
            code: required_string(config, "code")?,
            description: optional_string(config, "description"),
            category: optional_string(config, "category"),
            visibility: optional_string(config, "visibility"),
            environment_prefix: optional_string(config, "environment_prefix"),
            featured: optional_bool(config, "featured"),
            labels: optional_string_list(config, "labels"),
            option_types: optional_id_list(config, "option_type_ids")
                .map(|ids| id_refs(&ids)),
        })
    }

    fn apply_instance_type(state: &mut DynamicValue, instance_type: &InstanceType) {
        let _ = state.set_string(&AttributePath::new("id"), instance_type.id.to_string());
        let _ = state.set_string(&AttributePath::new("name"), instance_type.name.clone());
        let _ = state.set_string(&AttributePath::new("code"), instance_type.code.clone());
        set_optional_string(state, "description", instance_type.description.clone());
        set_optional_string(state, "category", instance_type.category.clone());
        set_optional_string(state, "visibility", instance_type.visibility.clone());
        set_optional_string(
            state,
            "environment_prefix",
            instance_type.environment_prefix.clone(),
        );
        let _ = state.set_bool(&AttributePath::new("featured"), instance_type.featured);
        set_string_list(state, "labels", &instance_type.labels);
        set_id_list(state, "option_type_ids", &instance_type.option_type_ids());
    }
}

#[async_trait]
impl Resource for InstanceTypeResource {
    fn type_name(&self) -> &str {
        "morpheus_instance_type"
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

        let instance_type_request = match self.extract_instance_type_config(&request.config) {
            Ok(r) => r,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let api = provider_data.client.library();
        match api.instance_types().create(&instance_type_request).await {
            Ok(created) => {
                info!("Created instance type {}", created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.instance_types().get(created.id).await {
                    Ok(instance_type) => Self::apply_instance_type(&mut new_state, &instance_type),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read instance type",
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
                    "Failed to create instance type",
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

        match provider_data.client.library().instance_types().get(id).await {
            Ok(instance_type) => {
                let mut new_state = request.current_state;
                Self::apply_instance_type(&mut new_state, &instance_type);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Instance type {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read instance type",
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

        let (id, instance_type_request) = match resource_id(&request.prior_state).and_then(|id| {
            self.extract_instance_type_config(&request.config)
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

        let api = provider_data.client.library();
        match api.instance_types().update(id, &instance_type_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.instance_types().get(id).await {
                    Ok(instance_type) => Self::apply_instance_type(&mut new_state, &instance_type),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read instance type",
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
                    "Failed to update instance type",
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

        match provider_data
            .client
            .library()
            .instance_types()
            .delete(id)
            .await
        {
            Ok(()) => info!("Deleted instance type {}", id),
            Err(e) if e.is_not_found() => warn!("Instance type {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete instance type",
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
impl ResourceWithConfigure for InstanceTypeResource {
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
#[path = "./resource_instance_type_test.rs"]
mod resource_instance_type_test;
