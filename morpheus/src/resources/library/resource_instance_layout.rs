//! Instance layout resource implementation

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
use tfplug::validator::{validate_config, NumberRangeValidator};
use tracing::{info, warn};

use crate::api::common::id_refs;
use crate::api::library::instance_layouts::{InstanceLayout, InstanceLayoutRequest};
use crate::resources::state::{
    clear_unknowns, id_attribute, id_list_attribute, import_by_id, labels_attribute, not_configured,
    optional_bool, optional_i64, optional_id_list, optional_string, optional_string_list,
    required_i64, required_string, resource_id, set_id_list, set_optional_string, set_string_list,
};

const BYTES_PER_MB: i64 = 1024 * 1024;
/// 1 PiB, well inside i64 once converted to bytes
const MAX_MEMORY_MB: i64 = 1024 * 1024 * 1024;

/// `minimum_memory` converted to bytes. Zero means no requirement and is not sent.
fn memory_requirement(config: &DynamicValue) -> Result<Option<i64>, Diagnostic> {
    match optional_i64(config, "minimum_memory").filter(|mb| *mb > 0) {
        None => Ok(None),
        Some(mb) => mb
            .checked_mul(BYTES_PER_MB)
            .filter(|_| mb <= MAX_MEMORY_MB)
            .map(Some)
            .ok_or_else(|| {
                Diagnostic::error(
                    "Invalid minimum_memory",
                    format!("{} MB exceeds the maximum of {} MB", mb, MAX_MEMORY_MB),
                )
                .with_attribute(AttributePath::new("minimum_memory"))
            }),
    }
}

#[derive(Default)]
pub struct InstanceLayoutResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl InstanceLayoutResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an instance layout in the Morpheus library")
            .attribute(id_attribute("The ID of the instance layout"))
            .attribute(
                AttributeBuilder::new("instance_type_id", AttributeType::Number)
                    .description("The ID of the instance layout the layout belongs to")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the instance layout")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::String)
                    .description("The version of the instance layout")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("technology", AttributeType::String)
                    .description("The provision type code of the instance layout")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The description of the instance layout")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("creatable", AttributeType::Bool)
                    .description("Whether instances can be provisioned from the layout")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("minimum_memory", AttributeType::Number)
                    .description("Minimum memory required by the layout, in megabytes")
                    .optional()
                    .validator(NumberRangeValidator {
                        min: Some(0.0),
                        max: Some(MAX_MEMORY_MB as f64),
                    })
                    .build(),
            )
            .attribute(labels_attribute())
            .attribute(id_list_attribute(
                "node_type_ids",
                "The ids of the node types deployed by the layout",
            ))
            .attribute(id_list_attribute(
                "option_type_ids",
                "The ids of the option types attached to the layout",
            ))
            .attribute(id_list_attribute(
                "spec_template_ids",
                "The ids of the spec templates attached to the layout",
            ))
            .build()
    }

    fn extract_instance_layout_config(
        &self,
        config: &DynamicValue,
    ) -> Result<(i64, InstanceLayoutRequest), Diagnostic> {
        let instance_type_id = required_i64(config, "instance_type_id")?;
        let request = InstanceLayoutRequest {
            name: required_string(config, "name")?,
            instance_version: required_string(config, "version")?,
            description: optional_string(config, "description"),
            creatable: optional_bool(config, "creatable"),
            memory_requirement: memory_requirement(config)?,
            labels: optional_string_list(config, "labels"),
            provision_type_code: required_string(config, "technology")?,
            container_types: optional_id_list(config, "node_type_ids")
                .map(|ids| id_refs(&ids)),
            option_types: optional_id_list(config, "option_type_ids")
                .map(|ids| id_refs(&ids)),
            spec_templates: optional_id_list(config, "spec_template_ids")
                .map(|ids| id_refs(&ids)),
        };
        Ok((instance_type_id, request))
    }

    fn apply_instance_layout(state: &mut DynamicValue, layout: &InstanceLayout) {
        let _ = state.set_string(&AttributePath::new("id"), layout.id.to_string());
        if let Some(instance_type) = layout.instance_type {
            let _ = state.set_number(
                &AttributePath::new("instance_type_id"),
                instance_type.id as f64,
            );
        }
        let _ = state.set_string(&AttributePath::new("name"), layout.name.clone());
        set_optional_string(state, "version", layout.instance_version.clone());
        set_optional_string(
            state,
            "technology",
            layout.provision_type.as_ref().map(|p| p.code.clone()),
        );
        set_optional_string(state, "description", layout.description.clone());
        let _ = state.set_bool(&AttributePath::new("creatable"), layout.creatable);
        if let Some(bytes) = layout.memory_requirement.filter(|b| *b > 0) {
            let _ = state.set_number(
                &AttributePath::new("minimum_memory"),
                (bytes / BYTES_PER_MB) as f64,
            );
        }
        set_string_list(state, "labels", &layout.labels);
        set_id_list(state, "node_type_ids", &layout.node_type_ids());
        set_id_list(state, "option_type_ids", &layout.option_type_ids());
        set_id_list(state, "spec_template_ids", &layout.spec_template_ids());
    }
}

#[async_trait]
impl Resource for InstanceLayoutResource {
    fn type_name(&self) -> &str {
        "morpheus_instance_layout"
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

        let (instance_type_id, layout_request) =
            match self.extract_instance_layout_config(&request.config) {
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
        match api
            .instance_layouts()
            .create(instance_type_id, &layout_request)
            .await
        {
            Ok(created) => {
                info!("Created instance layout {}", created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.instance_layouts().get(created.id).await {
                    Ok(layout) => Self::apply_instance_layout(&mut new_state, &layout),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read instance layout",
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
                    "Failed to create instance layout",
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

        match provider_data.client.library().instance_layouts().get(id).await {
            Ok(layout) => {
                let mut new_state = request.current_state;
                Self::apply_instance_layout(&mut new_state, &layout);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Instance layout {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read instance layout",
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

        let (id, layout_request) = match resource_id(&request.prior_state).and_then(|id| {
            self.extract_instance_layout_config(&request.config)
                .map(|(_, r)| (id, r))
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
        match api.instance_layouts().update(id, &layout_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.instance_layouts().get(id).await {
                    Ok(layout) => Self::apply_instance_layout(&mut new_state, &layout),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read instance layout",
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
                    "Failed to update instance layout",
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
            .instance_layouts()
            .delete(id)
            .await
        {
            Ok(()) => info!("Deleted instance layout {}", id),
            Err(e) if e.is_not_found() => warn!("Instance layout {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete instance layout",
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
impl ResourceWithConfigure for InstanceLayoutResource {
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
#[path = "./resource_instance_layout_test.rs"]
mod resource_instance_layout_test;
