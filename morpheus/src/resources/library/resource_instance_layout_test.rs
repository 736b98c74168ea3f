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
            ("instance_type_id", Dynamic::Number(4.0)),
            ("name", string("Single Node")),
            ("version", string("1.0")),
            ("technology", string("vmware")),
            ("minimum_memory", Dynamic::Number(1024.0)),
            ("node_type_ids", ids(&[12])),
        ])
    }

    fn layout_body() -> String {
        json!({"instanceTypeLayout": {
            "id": 30,
            "name": "Single Node",
            "instanceVersion": "1.0",
            "creatable": true,
            "memoryRequirement": 1073741824u64,
            "instanceType": {"id": 4},
            "provisionType": {"code": "vmware"},
            "containerTypes": [{"id": 12}],
            "optionTypes": [{"id": 2}]
        }})
        .to_string()
    }

    fn configured(server_url: &str) -> InstanceLayoutResource {
        let mut resource = InstanceLayoutResource::new();
        resource.provider_data = Some(test_provider_data(server_url));
        resource
    }

    #[test]
    fn moving_layout_to_another_instance_type_replaces_it() {
        let schema = InstanceLayoutResource::schema_definition();
        let mut prior = config();
        let _ = prior.set_string(&AttributePath::new("id"), "30".to_string());
        let mut proposed = prior.clone();
        let _ = proposed.set_number(&AttributePath::new("instance_type_id"), 5.0);

        let plan = plan_resource_change(&schema, &prior, &proposed, &proposed);
        assert_eq!(
            plan.requires_replace,
            vec![AttributePath::new("instance_type_id")]
        );
    }

    #[tokio::test]
    async fn create_posts_under_instance_type() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/library/instance-types/4/layouts")
            .match_body(Matcher::PartialJson(json!({
                "instanceTypeLayout": {
                    "instanceVersion": "1.0",
                    "provisionTypeCode": "vmware",
                    "memoryRequirement": 1073741824u64,
                    "containerTypes": [{"id": 12}]
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body())
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/layouts/30")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body())
            .create_async()
            .await;

        let schema = InstanceLayoutResource::schema_definition();
        let planned =
            plan_resource_change(&schema, &DynamicValue::null(), &config(), &config()).planned_state;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    planned_state: planned,
                    config: config(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "30");
        assert_eq!(state.get_i64(&AttributePath::new("minimum_memory")).unwrap(), 1024);
        assert!(state.get_bool(&AttributePath::new("creatable")).unwrap());
        assert_eq!(
            state
                .get_i64_list(&AttributePath::new("option_type_ids"))
                .unwrap(),
            vec![2]
        );
        assert_eq!(
            state
                .get_i64_list(&AttributePath::new("spec_template_ids"))
                .unwrap(),
            Vec::<i64>::new()
        );
        create.assert_async().await;
    }

    #[tokio::test]
    async fn update_uses_flat_layout_path() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("PUT", "/api/library/layouts/30")
            .match_body(Matcher::PartialJson(json!({
                "instanceTypeLayout": {"name": "Single Node"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body())
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/layouts/30")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body())
            .create_async()
            .await;

        let mut prior = config();
        let _ = prior.set_string(&AttributePath::new("id"), "30".to_string());

        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    prior_state: prior.clone(),
                    planned_state: prior,
                    config: config(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        update.assert_async().await;
    }

    #[tokio::test]
    async fn validate_rejects_negative_memory() {
        let mut config = config();
        let _ = config.set_number(&AttributePath::new("minimum_memory"), -1.0);

        let response = InstanceLayoutResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    config,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn rename_keeps_unconfigured_option_types() {
        let body = json!({"instanceTypeLayout": {
            "id": 30,
            "name": "Renamed",
            "instanceVersion": "1.0",
            "instanceType": {"id": 4},
            "provisionType": {"code": "vmware"},
            "containerTypes": [{"id": 12}],
            "optionTypes": [{"id": 2}, {"id": 7}]
        }})
        .to_string();
        let mut server = Server::new_async().await;
        let update = server
            .mock("PUT", "/api/library/layouts/30")
            .match_body(Matcher::Json(json!({
                "instanceTypeLayout": {
                    "name": "Renamed",
                    "instanceVersion": "1.0",
                    "provisionTypeCode": "vmware",
                    "containerTypes": [{"id": 12}]
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.clone())
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/layouts/30")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let schema = InstanceLayoutResource::schema_definition();
        let prior = object(&[
            ("id", string("30")),
            ("instance_type_id", Dynamic::Number(4.0)),
            ("name", string("Single Node")),
            ("version", string("1.0")),
            ("technology", string("vmware")),
            ("node_type_ids", ids(&[12])),
            ("option_type_ids", ids(&[2, 7])),
        ]);
        let config = object(&[
            ("instance_type_id", Dynamic::Number(4.0)),
            ("name", string("Renamed")),
            ("version", string("1.0")),
            ("technology", string("vmware")),
            ("node_type_ids", ids(&[12])),
        ]);
        let plan = plan_resource_change(&schema, &prior, &config, &config);
        assert!(plan.requires_replace.is_empty());

        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "morpheus_instance_layout".to_string(),
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
            vec![2, 7]
        );
        update.assert_async().await;
    }

    #[tokio::test]
    async fn zero_minimum_memory_is_not_sent() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/library/instance-types/4/layouts")
            .match_body(Matcher::Json(json!({
                "instanceTypeLayout": {
                    "name": "Single Node",
                    "instanceVersion": "1.0",
                    "provisionTypeCode": "vmware",
                    "containerTypes": [{"id": 12}]
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body())
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/layouts/30")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body())
            .create_async()
            .await;

        let mut config = config();
        let _ = config.set_number(&AttributePath::new("minimum_memory"), 0.0);
        let schema = InstanceLayoutResource::schema_definition();
        let planned =
            plan_resource_change(&schema, &DynamicValue::null(), &config, &config).planned_state;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    planned_state: planned,
                    config,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        create.assert_async().await;
    }

    #[tokio::test]
    async fn oversized_minimum_memory_is_rejected() {
        let mut config = config();
        let _ = config.set_number(&AttributePath::new("minimum_memory"), 1e13);

        let validated = InstanceLayoutResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    config: config.clone(),
                },
            )
            .await;
        assert_eq!(validated.diagnostics.len(), 1);

        let server = Server::new_async().await;
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    planned_state: config.clone(),
                    config,
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid minimum_memory");
    }

    #[tokio::test]
    async fn delete_reports_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/api/library/layouts/30")
            .with_status(400)
            .with_body(r#"{"success":false,"msg":"Layout is in use"}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "morpheus_instance_layout".to_string(),
                    prior_state: object(&[("id", string("30"))]),
                },
            )
            .await;

        assert_eq!(
            response.diagnostics[0].summary,
            "Failed to delete instance layout"
        );
    }
}
