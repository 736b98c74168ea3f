//! Terraform provider for the Morpheus cloud management platform

pub mod api;
pub mod data_sources;
mod provider_data;
pub mod reconcile;
pub mod resources;
pub mod secret;

pub use provider_data::MorpheusProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::{DataSourceWithConfigure, LogLevel, ResourceWithConfigure};
use tracing::{debug, info};

const ENV_URL: &str = "MORPHEUS_URL";
const ENV_ACCESS_TOKEN: &str = "MORPHEUS_ACCESS_TOKEN";
const ENV_USERNAME: &str = "MORPHEUS_USERNAME";
const ENV_PASSWORD: &str = "MORPHEUS_PASSWORD";
const ENV_INSECURE: &str = "MORPHEUS_INSECURE";

#[derive(Default)]
pub struct MorpheusProvider;

impl MorpheusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Morpheus appliance")
            .attribute(
                AttributeBuilder::new("url", AttributeType::String)
                    .description("The URL of the Morpheus appliance (env: MORPHEUS_URL)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("access_token", AttributeType::String)
                    .description("An API access token (env: MORPHEUS_ACCESS_TOKEN)")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description(
                        "Username used to obtain a token when no access token is set \
                         (env: MORPHEUS_USERNAME)",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Password for username (env: MORPHEUS_PASSWORD)")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification (env: MORPHEUS_INSECURE)")
                    .optional()
                    .build(),
            )
            .build()
    }
}

/// Non-empty string from the provider block, falling back to an env var
fn config_string(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(name))
        .ok()
        .or_else(|| std::env::var(env).ok())
        .filter(|s| !s.is_empty())
}

fn config_bool(config: &DynamicValue, name: &str, env: &str) -> bool {
    config
        .get_bool(&AttributePath::new(name))
        .ok()
        .or_else(|| {
            std::env::var(env)
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
        })
        .unwrap_or(false)
}

enum Credentials {
    Token(String),
    Password { username: String, password: String },
}

fn resolve_credentials(config: &DynamicValue) -> Result<Credentials, Diagnostic> {
    if let Some(token) = config_string(config, "access_token", ENV_ACCESS_TOKEN) {
        return Ok(Credentials::Token(token));
    }

    let username = config_string(config, "username", ENV_USERNAME);
    let password = config_string(config, "password", ENV_PASSWORD);
    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials::Password { username, password }),
        (Some(_), None) => Err(Diagnostic::error(
            "password is required (set in provider config or MORPHEUS_PASSWORD env var)",
            "A username was given without a password",
        )),
        _ => Err(Diagnostic::error(
            "access_token is required (set in provider config or MORPHEUS_ACCESS_TOKEN env var)",
            "Alternatively set username and password (MORPHEUS_USERNAME, MORPHEUS_PASSWORD)",
        )),
    }
}

async fn build_client(config: &DynamicValue) -> Result<api::Client, Diagnostic> {
    let url = config_string(config, "url", ENV_URL).ok_or_else(|| {
        Diagnostic::error(
            "url is required (set in provider config or MORPHEUS_URL env var)",
            "The provider needs the address of a Morpheus appliance",
        )
    })?;
    let insecure = config_bool(config, "insecure", ENV_INSECURE);

    let token = match resolve_credentials(config)? {
        Credentials::Token(token) => token,
        Credentials::Password { username, password } => {
            debug!("Logging in to {} as {}", url, username);
            api::auth::login(&url, &username, &password, insecure)
                .await
                .map_err(|e| {
                    Diagnostic::error("Failed to log in to Morpheus", format!("API error: {}", e))
                })?
                .access_token
        }
    };

    api::Client::new(&url, &token, insecure)
        .map_err(|e| Diagnostic::error("Failed to create API client", format!("API error: {}", e)))
}

#[async_trait]
impl Provider for MorpheusProvider {
    fn type_name(&self) -> &str {
        "morpheus"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_definition(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        tfplug::try_init_logging(LogLevel::from_env());

        match build_client(&request.config).await {
            Ok(client) => {
                info!(
                    "Configured Morpheus provider for {} (terraform {})",
                    client.base_url(),
                    request.terraform_version
                );
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(MorpheusProviderData::new(client))),
                }
            }
            Err(diag) => ConfigureProviderResponse {
                diagnostics: vec![diag],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "morpheus_node_type".to_string(),
            Box::new(|| {
                Box::new(resources::NodeTypeResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_instance_type".to_string(),
            Box::new(|| {
                Box::new(resources::InstanceTypeResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_instance_layout".to_string(),
            Box::new(|| {
                Box::new(resources::InstanceLayoutResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_cluster_layout".to_string(),
            Box::new(|| {
                Box::new(resources::ClusterLayoutResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_user".to_string(),
            Box::new(|| {
                Box::new(resources::UserResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_credential".to_string(),
            Box::new(|| {
                Box::new(resources::CredentialResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_integration".to_string(),
            Box::new(|| {
                Box::new(resources::IntegrationResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_cloud".to_string(),
            Box::new(|| {
                Box::new(resources::CloudResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "morpheus_cloud".to_string(),
            Box::new(|| {
                Box::new(data_sources::CloudDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "morpheus_role".to_string(),
            Box::new(|| {
                Box::new(data_sources::RoleDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
