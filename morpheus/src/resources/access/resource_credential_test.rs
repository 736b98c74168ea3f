#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::resources::test_support::{object, string, test_provider_data};
    use crate::secret::hash_secret;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::plan::plan_resource_change;

    fn config(password: &str) -> DynamicValue {
        object(&[
            ("name", string("vcenter-svc")),
            ("username", string("svc-morpheus")),
            ("password", string(password)),
        ])
    }

    fn credential_body(password_hash: &str) -> String {
        json!({"credential": {
            "id": 21,
            "name": "vcenter-svc",
            "type": {"code": "username-password"},
            "username": "svc-morpheus",
            "passwordHash": password_hash,
            "enabled": true
        }})
        .to_string()
    }

    fn applied_state(password: &str) -> DynamicValue {
        let mut state = config(password);
        let _ = state.set_string(&AttributePath::new("id"), "21".to_string());
        let _ = state.set_string(&AttributePath::new("password"), hash_secret(password));
        let _ = state.set_bool(&AttributePath::new("enabled"), true);
        state
    }

    fn configured(server_url: &str) -> CredentialResource {
        let mut resource = CredentialResource::new();
        resource.provider_data = Some(test_provider_data(server_url));
        resource
    }

    #[tokio::test]
    async fn create_keeps_planned_digest_when_server_echoes_it() {
        let mut server = Server::new_async().await;
        let upper = hash_secret("hunter2").to_uppercase();
        let create = server
            .mock("POST", "/api/credentials")
            .match_body(Matcher::PartialJson(json!({
                "credential": {
                    "type": {"code": "username-password"},
                    "username": "svc-morpheus",
                    "password": "hunter2"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(credential_body(&upper))
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/credentials/21")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(credential_body(&upper))
            .create_async()
            .await;

        let schema = CredentialResource::schema_definition();
        let config = config("hunter2");
        let planned = plan_resource_change(&schema, &DynamicValue::null(), &config, &config)
            .planned_state;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_credential".to_string(),
                    planned_state: planned,
                    config,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("password"))
                .unwrap(),
            hash_secret("hunter2")
        );
        assert!(response
            .new_state
            .get_bool(&AttributePath::new("enabled"))
            .unwrap());
        create.assert_async().await;
    }

    #[tokio::test]
    async fn password_rotated_outside_terraform_shows_a_diff() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/credentials/21")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(credential_body(&hash_secret("rotated")))
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "morpheus_credential".to_string(),
                    current_state: applied_state("hunter2"),
                },
            )
            .await;

        let refreshed = response.new_state.unwrap();
        assert_eq!(
            refreshed.get_string(&AttributePath::new("password")).unwrap(),
            hash_secret("rotated")
        );

        let schema = CredentialResource::schema_definition();
        let plan = plan_resource_change(
            &schema,
            &refreshed,
            &config("hunter2"),
            &config("hunter2"),
        );
        assert_eq!(
            plan.planned_state
                .get_string(&AttributePath::new("password"))
                .unwrap(),
            hash_secret("hunter2")
        );
    }

    #[tokio::test]
    async fn update_omits_unchanged_password() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("PUT", "/api/credentials/21")
            .match_body(Matcher::Json(json!({
                "credential": {
                    "name": "vcenter-svc",
                    "type": {"code": "username-password"},
                    "username": "svc-morpheus"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(credential_body(&hash_secret("hunter2")))
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/credentials/21")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(credential_body(&hash_secret("hunter2")))
            .create_async()
            .await;

        let prior = applied_state("hunter2");
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "morpheus_credential".to_string(),
                    prior_state: prior.clone(),
                    planned_state: prior,
                    config: config("hunter2"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        update.assert_async().await;
    }

    #[tokio::test]
    async fn delete_tolerates_missing_credential() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/api/credentials/21")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"Credential not found"}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "morpheus_credential".to_string(),
                    prior_state: object(&[("id", string("21"))]),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
    }
}
