//! Node type resource implementation

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
use tracing::{info, warn};

use crate::api::common::id_refs;
use crate::api::library::node_types::{NodeType, NodeTypeRequest};
use crate::resources::state::{
    clear_unknowns, id_attribute, id_list_attribute, import_by_id, labels_attribute, not_configured,
    optional_id_list, optional_string_list, required_string, resource_id, set_id_list,
    set_optional_string, set_string_list,
};

#[derive(Default)]
pub struct NodeTypeResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl NodeTypeResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a node type in the Morpheus library")
            .attribute(id_attribute("The ID of the node type"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the node type")
                    .required()
                    .validator(StringLengthValidator {
                        min: Some(1),
                        max: None,
                    })
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("short_name", AttributeType::String)
                    .description("The short name of the node type")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::String)
                    .description("The version of the node type")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("technology", AttributeType::String)
                    .description("The provision type code of the node type (e.g. vmware)")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(labels_attribute())
            .attribute(id_list_attribute(
                "option_type_ids",
                "The ids of the option types attached to the node type",
            ))
            .attribute(id_list_attribute(
                "script_template_ids",
                "The ids of the script templates attached to the node type",
            ))
            .attribute(id_list_attribute(
                "file_template_ids",
                "The ids of the file templates attached to the node type",
            ))
            .build()
    }

    /// Extract node type configuration from terraform configuration
    fn extract_node_type_config(
        &self,
        config: &DynamicValue,
    ) -> Result<NodeTypeRequest, Diagnostic> {
        Ok(NodeTypeRequest {
            name: required_string(config, "name")?,
            short_name: required_string(config, "short_name")?,
            container_version: required_string(config, "version")?,
            provision_type_code: required_string(config, "technology")?,
            labels: optional_string_list(config, "labels"),
            option_types: optional_id_list(config, "option_type_ids")
                .map(|ids| id_refs(&ids)),
            scripts: optional_id_list(config, "script_template_ids"),
            templates: optional_id_list(config, "file_template_ids"),
        })
    }

    /// Copy the server view of a node type into `state`
    fn apply_node_type(state: &mut DynamicValue, node_type: &NodeType) {
        let _ = state.set_string(&AttributePath::new("id"), node_type.id.to_string());
        let _ = state.set_string(&AttributePath::new("name"), node_type.name.clone());
        set_optional_string(state, "short_name", node_type.short_name.clone());
        set_optional_string(state, "version", node_type.container_version.clone());
        set_optional_string(
            state,
            "technology",
            node_type.provision_type.as_ref().map(|p| p.code.clone()),
        );
        set_string_list(state, "labels", &node_type.labels);
        set_id_list(state, "option_type_ids", &node_type.option_type_ids());
        set_id_list(state, "script_template_ids", &node_type.script_template_ids());
        set_id_list(state, "file_template_ids", &node_type.file_template_ids());
    }
}

#[async_trait]
impl Resource for NodeTypeResource {
    fn type_name(&self) -> &str {
        "morpheus_node_type"
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

        let node_type_request = match self.extract_node_type_config(&request.config) {
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
        match api.node_types().create(&node_type_request).await {
            Ok(created) => {
                info!("Created node type {}", created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.node_types().get(created.id).await {
                    Ok(node_type) => Self::apply_node_type(&mut new_state, &node_type),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read node type",
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
                    "Failed to create node type",
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

        match provider_data.client.library().node_types().get(id).await {
            Ok(node_type) => {
                let mut new_state = request.current_state;
                Self::apply_node_type(&mut new_state, &node_type);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Node type {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read node type",
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

        let (id, node_type_request) = match resource_id(&request.prior_state)
            .and_then(|id| {
                self.extract_node_type_config(&request.config)
                    .map(|r| (id, r))
            })
        {
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
        match api.node_types().update(id, &node_type_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.node_types().get(id).await {
                    Ok(node_type) => Self::apply_node_type(&mut new_state, &node_type),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read node type",
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
                    "Failed to update node type",
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

        match provider_data.client.library().node_types().delete(id).await {
            Ok(()) => info!("Deleted node type {}", id),
            Err(e) if e.is_not_found() => warn!("Node type {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete node type",
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
impl ResourceWithConfigure for NodeTypeResource {
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
#[path = "./resource_node_type_test.rs"]
mod resource_node_type_test;
