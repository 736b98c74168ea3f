//! User resource implementation

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
use tfplug::validator::{validate_config, ListLengthValidator};
use tracing::{debug, info, warn};

use crate::api::common::id_refs;
use crate::api::users::{User, UserRequest};
use crate::resources::state::{
    clear_unknowns, id_attribute, id_list, import_by_id, not_configured, optional_bool,
    optional_string, required_string, resource_id, secret_to_send, set_id_list,
    set_optional_string,
};
use crate::secret::{SecretPolicy, SuppressSecretDiff};

#[derive(Default)]
pub struct UserResource {
    provider_data: Option<crate::MorpheusProviderData>,
}

impl UserResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Morpheus user")
            .attribute(id_attribute("The ID of the user"))
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("The username used to log in")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("email", AttributeType::String)
                    .description("The email address of the user")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("first_name", AttributeType::String)
                    .description("The first name of the user")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_name", AttributeType::String)
                    .description("The last name of the user")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("The password of the user. State holds its SHA-256 digest")
                    .required()
                    .sensitive()
                    .plan_modifier(SuppressSecretDiff::new(SecretPolicy::CompareHash))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("receive_notifications", AttributeType::Bool)
                    .description("Whether the user receives email notifications")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "role_ids",
                    AttributeType::List(Box::new(AttributeType::Number)),
                )
                .description("The ids of the roles assigned to the user")
                .required()
                .validator(ListLengthValidator {
                    min: Some(1),
                    max: None,
                })
                .build(),
            )
            .build()
    }

    /// Build the API payload. `prior` is `None` on create.
    fn extract_user_config(
        &self,
        config: &DynamicValue,
        planned: &DynamicValue,
        prior: Option<&DynamicValue>,
    ) -> Result<UserRequest, Diagnostic> {
        let password = secret_to_send(config, planned, prior, "password");
        if prior.is_none() && password.is_none() {
            return Err(Diagnostic::error(
                "Missing password",
                "The 'password' attribute is required",
            ));
        }

        Ok(UserRequest {
            username: required_string(config, "username")?,
            email: required_string(config, "email")?,
            first_name: optional_string(config, "first_name"),
            last_name: optional_string(config, "last_name"),
            password,
            receive_notifications: optional_bool(config, "receive_notifications"),
            roles: id_refs(&id_list(config, "role_ids")),
        })
    }

    /// The password digest in `state` is left alone; the API never returns it.
    fn apply_user(state: &mut DynamicValue, user: &User) {
        let _ = state.set_string(&AttributePath::new("id"), user.id.to_string());
        let _ = state.set_string(&AttributePath::new("username"), user.username.clone());
        set_optional_string(state, "email", user.email.clone());
        set_optional_string(state, "first_name", user.first_name.clone());
        set_optional_string(state, "last_name", user.last_name.clone());
        let _ = state.set_bool(
            &AttributePath::new("receive_notifications"),
            user.receive_notifications,
        );
        set_id_list(state, "role_ids", &user.role_ids());
    }
}

#[async_trait]
impl Resource for UserResource {
    fn type_name(&self) -> &str {
        "morpheus_user"
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

        let user_request =
            match self.extract_user_config(&request.config, &request.planned_state, None) {
                Ok(r) => r,
                Err(diag) => {
                    diagnostics.push(diag);
                    return CreateResourceResponse {
                        new_state: request.planned_state,
                        diagnostics,
                    };
                }
            };

        let api = provider_data.client.users();
        match api.create(&user_request).await {
            Ok(created) => {
                info!("Created user {} ({})", created.username, created.id);
                let mut new_state = request.planned_state;
                let _ = new_state.set_string(&AttributePath::new("id"), created.id.to_string());

                match api.get(created.id).await {
                    Ok(user) => Self::apply_user(&mut new_state, &user),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read user",
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
                    "Failed to create user",
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

        match provider_data.client.users().get(id).await {
            Ok(user) => {
                let mut new_state = request.current_state;
                Self::apply_user(&mut new_state, &user);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("User {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read user",
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

        let (id, user_request) = match resource_id(&request.prior_state).and_then(|id| {
            self.extract_user_config(
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

        if user_request.password.is_some() {
            debug!("Password of user {} changed, sending new value", id);
        }

        let api = provider_data.client.users();
        match api.update(id, &user_request).await {
            Ok(_) => {
                let mut new_state = request.planned_state;
                match api.get(id).await {
                    Ok(user) => Self::apply_user(&mut new_state, &user),
                    Err(e) => diagnostics.push(Diagnostic::error(
                        "Failed to read user",
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
                    "Failed to update user",
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

        match provider_data.client.users().delete(id).await {
            Ok(()) => info!("Deleted user {}", id),
            Err(e) if e.is_not_found() => warn!("User {} already deleted", id),
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete user",
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
impl ResourceWithConfigure for UserResource {
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
#[path = "./resource_user_test.rs"]
mod resource_user_test;
