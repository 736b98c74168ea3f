//! Credential resource implementation

use async_trait::async_trait;
use tfplug::context::Context;
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
use tracing::{debug, info, warn};

use crate::api::common::CodeRef;
use crate::api::credentials::{Credential, CredentialRequest, USERNAME_PASSWORD};
use crate::resources::state::{
    clear_unknowns, id_attribute, import_by_id, not_configured, optional_bool, optional_string,
    required_string, resource_id, secret_to_send, set_optional_string,
};
use crate::secret::{stored_hash, SecretPolicy, SuppressSecretDiff};

#[derive(Default)]
pub struct CredentialResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl CredentialResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(
                "Manages a username and password credential in the Morpheus credential store",
            )
            .attribute(id_attribute("The ID of the credential"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the credential")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The description of the credential")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the credential can be used")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("The username stored in the credential")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description(
                        "The password stored in the credential. State holds its SHA-256 digest",
                    )
                    .required()
                    .sensitive()
                    .plan_modifier(SuppressSecretDiff::new(SecretPolicy::CompareHash))
                    .build(),
            )
            .build()
    }

    /// Build the API payload. `prior` is `None` on create.
    fn extract_credential_config(
        &self,
        config: &DynamicValue,
        planned: &DynamicValue,
        prior: Option<&DynamicValue>,
    ) -> Result<CredentialRequest, Diagnostic> {
        Ok(CredentialRequest {
            name: required_string(config, "name")?,
            credential_type: CodeRef::from(USERNAME_PASSWORD),
            description: optional_string(config, "description"),
            username: required_string(config, "username")?,
            password: secret_to_send(config, planned, prior, "password"),
            enabled: optional_bool(config, "enabled"),
        })
    }

    fn apply_credential(state: &mut DynamicValue, credential: &Credential) {
        let _ = state.set_string(&AttributePath::new("id"), credential.id.to_string());
        let _ = state.set_string(&AttributePath::new("name"), credential.name.clone());
        set_optional_string(state, "description", credential.description.clone());
        let _ = state.set_bool(&AttributePath::new("enabled"), credential.enabled);
        set_optional_string(state, "username", credential.username.clone());

        let password = AttributePath::new("password");
        let planned = state.get_string(&password).ok();
        if let Some(hash) = stored_hash(planned.as_deref(), credential.password_hash.as_deref()) {
            let _ = state.set_string(&password, hash);
        }
    }
}

#[async_trait]
impl Resource for CredentialResource {
    fn type_name(&self) -> &str {
        "morpheus_credential"
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

        let credential_request =
            match self.extract_credential_config(&request.config, &request.planned_state, None) {
                Ok(r) => r,
                Err(diag) => {
                    diagnostics.push(diag);
                    return CreateResourceResponse {
                        new_state: request.planned_state,
                        diagnostics,
                    };
                }
            };

        let api = provider_data.client.credentials();
        match api.create(&credential_request).await {
            Ok(created) => {
                info!("Created credential {} ({})", created.name, created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.get(created.id).await {
                    Ok(credential) => Self::apply_credential(&mut new_state, &credential),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read credential",
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
                    "Failed to create credential",
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

        match provider_data.client.credentials().get(id).await {
            Ok(credential) => {
                let mut new_state = request.current_state;
                Self::apply_credential(&mut new_state, &credential);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("Credential {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read credential",
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

        let (id, credential_request) = match resource_id(&request.prior_state).and_then(|id| {
            self.extract_credential_config(
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

        if credential_request.password.is_some() {
            debug!("Password of credential {} changed, sending new value", id);
        }

        let api = provider_data.client.credentials();
        match api.update(id, &credential_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.get(id).await {
                    Ok(credential) => Self::apply_credential(&mut new_state, &credential),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read credential",
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
                    "Failed to update credential",
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

        match provider_data.client.credentials().delete(id).await {
            Ok(()) => info!("Deleted credential {}", id),
            Err(e) if e.is_not_found() => warn!("Credential {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete credential",
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
impl ResourceWithConfigure for CredentialResource {
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
#[path = "./resource_credential_test.rs"]
mod resource_credential_test;
