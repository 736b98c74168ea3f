//! Cloud resource implementation
//!
//! Creating a cloud starts an asynchronous inventory of the target
//! environment. Create only returns once the cloud reports `ok`, polling its
//! status on a fixed interval.

use async_trait::async_trait;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tfplug::context::Context;
use tfplug::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{validate_config, StringOneOfValidator};
use tfplug::wait::{RefreshResult, StateChangeConf};
use tracing::{info, warn};

use crate::api::clouds::{Cloud, CloudRequest, STATUS_INITIALIZING, STATUS_OK, STATUS_SYNCING};
use crate::api::common::CodeRef;
use crate::api::Client;
use crate::resources::state::{
    clear_unknowns, id_attribute, import_by_id, not_configured, optional_bool, optional_i64,
    optional_string, required_string, resource_id, set_optional_string,
};

/// Timing of the wait for a new cloud to finish its first sync
#[derive(Debug, Clone)]
pub struct CloudPollConfig {
    pub delay: Duration,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for CloudPollConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(60),
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(60 * 60),
        }
    }
}

impl CloudPollConfig {
    fn state_change_conf(&self) -> StateChangeConf {
        StateChangeConf {
            pending: vec![STATUS_INITIALIZING.to_string(), STATUS_SYNCING.to_string()],
            target: vec![STATUS_OK.to_string()],
            delay: self.delay,
            min_timeout: self.interval,
            timeout: self.timeout,
            ..Default::default()
        }
    }
}

#[derive(Default)]
pub struct CloudResource {
    provider_data: Option<crate::MorpheusProviderData>,
    poll: CloudPollConfig,
}

impl CloudResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_config(mut self, poll: CloudPollConfig) -> Self {
        self.poll = poll;
        self
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Morpheus cloud (zone)")
            .attribute(id_attribute("The ID of the cloud"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the cloud")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cloud_type", AttributeType::String)
                    .description("The cloud type code (e.g. vmware, amazon, openstack)")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .description("A unique code for the cloud")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("location", AttributeType::String)
                    .description("Where the cloud is located")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The description of the cloud")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("group_id", AttributeType::Number)
                    .description("The group the cloud is added to. Only used on create")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the cloud is enabled")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("visibility", AttributeType::String)
                    .description("Whether the cloud is visible to sub-tenants (private or public)")
                    .optional()
                    .computed()
                    .validator(StringOneOfValidator::new(&["private", "public"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "config",
                    AttributeType::Map(Box::new(AttributeType::String)),
                )
                .description("Cloud type specific settings")
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .description("The sync status reported by the cloud")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .build()
    }

    fn extract_cloud_config(&self, config: &DynamicValue) -> Result<CloudRequest, Diagnostic> {
        let settings = config
            .get_map(&AttributePath::new("config"))
            .map(|m| {
                m.into_iter()
                    .filter_map(|(k, v)| v.as_string().map(|s| (k, s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(CloudRequest {
            name: required_string(config, "name")?,
            zone_type: CodeRef::from(required_string(config, "cloud_type")?.as_str()),
            code: optional_string(config, "code"),
            location: optional_string(config, "location"),
            description: optional_string(config, "description"),
            group_id: optional_i64(config, "group_id"),
            enabled: optional_bool(config, "enabled"),
            visibility: optional_string(config, "visibility"),
            config: settings,
        })
    }

    fn apply_cloud(state: &mut DynamicValue, cloud: &Cloud) {
        let _ = state.set_string(&AttributePath::new("id"), cloud.id.to_string());
        let _ = state.set_string(&AttributePath::new("name"), cloud.name.clone());
        set_optional_string(state, "cloud_type", cloud.cloud_type_code().map(str::to_string));
        set_optional_string(state, "code", cloud.code.clone());
        set_optional_string(state, "location", cloud.location.clone());
        set_optional_string(state, "description", cloud.description.clone());
        let _ = state.set_bool(&AttributePath::new("enabled"), cloud.enabled);
        set_optional_string(state, "visibility", cloud.visibility.clone());
        let _ = state.set_string(
            &AttributePath::new("status"),
            cloud.status_or_unknown().to_string(),
        );

        let path = AttributePath::new("config");
        if let Ok(known) = state.get_map(&path) {
            let _ = state.set_map(&path, flatten_config(&known, &cloud.config));
        }
    }
}

/// Server settings for the keys already tracked in state, as strings.
///
/// The server adds many defaults of its own; those stay out of state.
fn flatten_config(
    known: &HashMap<String, Dynamic>,
    server: &HashMap<String, serde_json::Value>,
) -> HashMap<String, Dynamic> {
    known
        .keys()
        .filter_map(|key| {
            let value = match server.get(key)? {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), Dynamic::String(value)))
        })
        .collect()
}

fn refresh_cloud(
    client: Arc<Client>,
    id: i64,
) -> impl FnMut() -> futures::future::BoxFuture<'static, RefreshResult<Cloud>> {
    move || {
        let client = client.clone();
        async move {
            match client.clouds().get(id).await {
                Ok(cloud) => {
                    let status = cloud.status_or_unknown().to_string();
                    Ok(Some((cloud, status)))
                }
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.to_string()),
            }
        }
        .boxed()
    }
}

#[async_trait]
impl Resource for CloudResource {
    fn type_name(&self) -> &str {
        "morpheus_cloud"
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

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
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

        let cloud_request = match self.extract_cloud_config(&request.config) {
            Ok(r) => r,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let created = match provider_data.client.clouds().create(&cloud_request).await {
            Ok(created) => created,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create cloud",
                    format!("API error: {}", e),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        info!(
            "Created cloud {} ({}), waiting for it to sync",
            created.name, created.id
        );
        let mut new_state = request.planned_state;
        let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

        let conf = self.poll.state_change_conf();
        match conf
            .wait_for_state(&ctx, refresh_cloud(provider_data.client.clone(), created.id))
            .await
        {
            Ok(cloud) => {
                info!("Cloud {} is ready", cloud.id);
                Self::apply_cloud(&mut new_state, &cloud);
            }
            Err(e) => {
                // keep the id so the half-created cloud can be destroyed
                let _ = new_state.set_string(
                    &AttributePath::new("status"),
                    created.status_or_unknown().to_string(),
                );
                diagnostics.push(Diagnostic::error(
                    "Cloud did not become ready",
                    format!(
                        "Cloud {} was created but never reached '{}': {}",
                        created.id, STATUS_OK, e
                    ),
                ));
            }
        }
        clear_unknowns(&mut new_state);

        CreateResourceResponse {
            new_state,
            diagnostics,
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

        match provider_data.client.clouds().get(id).await {
            Ok(cloud) => {
                let mut new_state = request.current_state;
                Self::apply_cloud(&mut new_state, &cloud);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Cloud {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read cloud",
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

        let (id, mut cloud_request) = match resource_id(&request.prior_state)
            .and_then(|id| self.extract_cloud_config(&request.config).map(|r| (id, r)))
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
        cloud_request.group_id = None;

        let api = provider_data.client.clouds();
        match api.update(id, &cloud_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.get(id).await {
                    Ok(cloud) => Self::apply_cloud(&mut new_state, &cloud),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read cloud",
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
                    "Failed to update cloud",
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

        match provider_data.client.clouds().delete(id).await {
            Ok(()) => info!("Deleted cloud {}", id),
            Err(e) if e.is_not_found() => warn!("Cloud {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete cloud",
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
impl ResourceWithConfigure for CloudResource {
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
#[path = "./resource_cloud_test.rs"]
mod resource_cloud_test;
