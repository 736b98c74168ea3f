//! Cluster layout resource implementation

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
use tfplug::validator::validate_config;
use tracing::{info, warn};

use crate::api::common::{id_refs, CodeRef};
use crate::api::library::cluster_layouts::{ClusterLayout, ClusterLayoutRequest};
use crate::resources::state::{
    clear_unknowns, id_attribute, id_list_attribute, import_by_id, labels_attribute, not_configured,
    optional_bool, optional_id_list, optional_string, optional_string_list, required_string,
    resource_id, set_id_list, set_optional_string, set_string_list,
};

#[derive(Default)]
pub struct ClusterLayoutResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl ClusterLayoutResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a cluster layout in the Morpheus library")
            .attribute(id_attribute("The ID of the cluster layout"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the cluster layout")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::String)
                    .description("The compute version of the cluster layout")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cluster_type", AttributeType::String)
                    .description("The cluster type code (e.g. kubernetes-cluster, docker-cluster)")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("technology", AttributeType::String)
                    .description("The provision type code of the cluster layout")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .description("The unique code of the cluster layout")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The description of the cluster layout")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("creatable", AttributeType::Bool)
                    .description("Whether clusters can be provisioned from the layout")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(labels_attribute())
            .attribute(id_list_attribute(
                "option_type_ids",
                "The ids of the option types attached to the cluster layout",
            ))
            .attribute(id_list_attribute(
                "spec_template_ids",
                "The ids of the spec templates attached to the cluster layout",
            ))
            .build()
    }

    fn extract_cluster_layout_config(
        &self,
        config: &DynamicValue,
    ) -> Result<ClusterLayoutRequest, Diagnostic> {
        Ok(ClusterLayoutRequest {
            name: required_string(config, "name")?,
            code: optional_string(config, "code"),
            description: optional_string(config, "description"),
            compute_version: required_string(config, "version")?,
            creatable: optional_bool(config, "creatable"),
            labels: optional_string_list(config, "labels"),
            group_type: CodeRef::from(required_string(config, "cluster_type")?.as_str()),
            provision_type: CodeRef::from(required_string(config, "technology")?.as_str()),
            option_types: optional_id_list(config, "option_type_ids")
                .map(|ids| id_refs(&ids)),
            spec_templates: optional_id_list(config, "spec_template_ids")
                .map(|ids| id_refs(&ids)),
        })
    }

    fn apply_cluster_layout(state: &mut DynamicValue, layout: &ClusterLayout) {
        let _ = state.set_string(&AttributePath::new("id"), layout.id.to_string());
        let _ = state.set_string(&AttributePath::new("name"), layout.name.clone());
        set_optional_string(state, "version", layout.compute_version.clone());
        set_optional_string(
            state,
            "cluster_type",
            layout.group_type.as_ref().map(|g| g.code.clone()),
        );
        set_optional_string(
            state,
            "technology",
            layout.provision_type.as_ref().map(|p| p.code.clone()),
        );
        set_optional_string(state, "code", layout.code.clone());
        set_optional_string(state, "description", layout.description.clone());
        let _ = state.set_bool(&AttributePath::new("creatable"), layout.creatable);
        set_string_list(state, "labels", &layout.labels);
        set_id_list(state, "option_type_ids", &layout.option_type_ids());
        set_id_list(state, "spec_template_ids", &layout.spec_template_ids());
    }
}

#[async_trait]
impl Resource for ClusterLayoutResource {
    fn type_name(&self) -> &str {
        "morpheus_cluster_layout"
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

        let layout_request = match self.extract_cluster_layout_config(&request.config) {
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
        match api.cluster_layouts().create(&layout_request).await {
            Ok(created) => {
                info!("Created cluster layout {}", created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.cluster_layouts().get(created.id).await {
                    Ok(layout) => Self::apply_cluster_layout(&mut new_state, &layout),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read cluster layout",
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
                    "Failed to create cluster layout",
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

        match provider_data.client.library().cluster_layouts().get(id).await {
            Ok(layout) => {
                let mut new_state = request.current_state;
                Self::apply_cluster_layout(&mut new_state, &layout);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Cluster layout {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read cluster layout",
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
            self.extract_cluster_layout_config(&request.config)
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
        match api.cluster_layouts().update(id, &layout_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.cluster_layouts().get(id).await {
                    Ok(layout) => Self::apply_cluster_layout(&mut new_state, &layout),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read cluster layout",
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
                    "Failed to update cluster layout",
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
            .cluster_layouts()
            .delete(id)
            .await
        {
            Ok(()) => info!("Deleted cluster layout {}", id),
            Err(e) if e.is_not_found() => warn!("Cluster layout {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete cluster layout",
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
impl ResourceWithConfigure for ClusterLayoutResource {
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
#[path = "./resource_cluster_layout_test.rs"]
mod resource_cluster_layout_test;
