#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::resources::test_support::{ids, object, string, test_provider_data};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::plan::plan_resource_change;
    use tfplug::types::Dynamic;

    fn config() -> DynamicValue {
        object(&[
            ("name", string("Web")),
            ("code", string("web")),
            ("visibility", string("public")),
            ("option_type_ids", ids(&[8, 3])),
        ])
    }

    fn configured(server_url: &str) -> InstanceTypeResource {
        let mut resource = InstanceTypeResource::new();
        resource.provider_data = Some(test_provider_data(server_url));
        resource
    }

    #[tokio::test]
    async fn validate_rejects_unknown_visibility() {
        let mut config = config();
        let _ = config.set_string(&AttributePath::new("visibility"), "shared".to_string());

        let response = InstanceTypeResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "morpheus_instance_type".to_string(),
                    config,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("visibility"));
    }

    #[test]
    fn changing_code_requires_replacement() {
        let schema = InstanceTypeResource::schema_definition();
        let mut prior = config();
        let _ = prior.set_string(&AttributePath::new("id"), "4".to_string());
        let mut proposed = prior.clone();
        let _ = proposed.set_string(&AttributePath::new("code"), "web2".to_string());

        let plan = plan_resource_change(&schema, &prior, &proposed, &proposed);
        assert_eq!(plan.requires_replace, vec![AttributePath::new("code")]);
    }

    #[tokio::test]
    async fn create_fills_computed_attributes() {
        let mut server = Server::new_async().await;
        let body = json!({"instanceType": {
            "id": 4,
            "name": "Web",
            "code": "web",
            "visibility": "public",
            "featured": false,
            "optionTypes": [{"id": 3}, {"id": 8}]
        }})
        .to_string();
        let create = server
            .mock("POST", "/api/library/instance-types")
            .match_body(Matcher::PartialJson(json!({
                "instanceType": {"code": "web", "optionTypes": [{"id": 8}, {"id": 3}]}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(&body)
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/instance-types/4")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(&body)
            .create_async()
            .await;

        let schema = InstanceTypeResource::schema_definition();
        let planned =
            plan_resource_change(&schema, &DynamicValue::null(), &config(), &config()).planned_state;
        assert_eq!(
            planned.get(&AttributePath::new("featured")),
            Some(&Dynamic::Unknown)
        );

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_instance_type".to_string(),
                    planned_state: planned,
                    config: config(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "4");
        assert!(!state.get_bool(&AttributePath::new("featured")).unwrap());
        assert_eq!(
            state
                .get_i64_list(&AttributePath::new("option_type_ids"))
                .unwrap(),
            vec![8, 3]
        );
        assert_eq!(
            state.get(&AttributePath::new("labels")),
            Some(&Dynamic::List(vec![]))
        );
        create.assert_async().await;
    }

    #[tokio::test]
    async fn read_failure_keeps_state() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/library/instance-types/4")
            .with_status(403)
            .with_body(r#"{"success":false,"msg":"Access denied"}"#)
            .create_async()
            .await;

        let current = object(&[("id", string("4")), ("name", string("Web"))]);
        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "morpheus_instance_type".to_string(),
                    current_state: current.clone(),
                },
            )
            .await;

        assert_eq!(response.new_state, Some(current));
        assert_eq!(response.diagnostics[0].summary, "Failed to read instance type");
    }

    #[tokio::test]
    async fn rename_keeps_unconfigured_option_types() {
        let mut server = Server::new_async().await;
        let body = json!({"instanceType": {
            "id": 4,
            "name": "Web Servers",
            "code": "web",
            "visibility": "public",
            "featured": false,
            "optionTypes": [{"id": 10}, {"id": 20}]
        }})
        .to_string();
        let update = server
            .mock("PUT", "/api/library/instance-types/4")
            .match_body(Matcher::Json(json!({
                "instanceType": {"name": "Web Servers", "code": "web", "visibility": "public"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(&body)
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/instance-types/4")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(&body)
            .create_async()
            .await;

        let schema = InstanceTypeResource::schema_definition();
        let prior = object(&[
            ("id", string("4")),
            ("name", string("Web")),
            ("code", string("web")),
            ("visibility", string("public")),
            ("featured", Dynamic::Bool(false)),
            ("option_type_ids", ids(&[10, 20])),
        ]);
        let config = object(&[
            ("name", string("Web Servers")),
            ("code", string("web")),
            ("visibility", string("public")),
        ]);
        let plan = plan_resource_change(&schema, &prior, &config, &config);
        assert!(plan.requires_replace.is_empty());

        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "morpheus_instance_type".to_string(),
                    prior_state: prior,
                    planned_state: plan.planned_state,
                    config,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_i64_list(&AttributePath::new("option_type_ids"))
                .unwrap(),
            vec![10, 20]
        );
        update.assert_async().await;
    }
}
