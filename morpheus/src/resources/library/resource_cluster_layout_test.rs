#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::resources::test_support::{ids, object, string, strings, test_provider_data};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::plan::plan_resource_change;

    fn config() -> DynamicValue {
        object(&[
            ("name", string("k8s-small")),
            ("version", string("1.29")),
            ("cluster_type", string("kubernetes-cluster")),
            ("technology", string("vmware")),
            ("labels", strings(&["k8s"])),
            ("spec_template_ids", ids(&[9])),
        ])
    }

    fn layout_body(spec_templates: &[i64]) -> String {
        json!({"layout": {
            "id": 5,
            "name": "k8s-small",
            "code": "k8s-small-1",
            "computeVersion": "1.29",
            "creatable": true,
            "labels": ["k8s"],
            "groupType": {"code": "kubernetes-cluster"},
            "provisionType": {"code": "vmware"},
            "specTemplates": spec_templates.iter().map(|id| json!({"id": id})).collect::<Vec<_>>()
        }})
        .to_string()
    }

    fn configured(server_url: &str) -> ClusterLayoutResource {
        let mut resource = ClusterLayoutResource::new();
        resource.provider_data = Some(test_provider_data(server_url));
        resource
    }

    #[test]
    fn cluster_type_and_technology_force_replacement() {
        let schema = ClusterLayoutResource::schema_definition();
        let mut prior = config();
        let _ = prior.set_string(&AttributePath::new("id"), "5".to_string());
        let mut proposed = prior.clone();
        let _ = proposed.set_string(&AttributePath::new("cluster_type"), "docker-cluster".to_string());
        let _ = proposed.set_string(&AttributePath::new("technology"), "aws".to_string());

        let plan = plan_resource_change(&schema, &prior, &proposed, &proposed);
        assert_eq!(plan.requires_replace.len(), 2);
        assert!(plan
            .requires_replace
            .contains(&AttributePath::new("cluster_type")));
    }

    #[tokio::test]
    async fn create_sends_type_codes_and_reads_generated_code() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/library/cluster-layouts")
            .match_body(Matcher::PartialJson(json!({
                "layout": {
                    "computeVersion": "1.29",
                    "groupType": {"code": "kubernetes-cluster"},
                    "provisionType": {"code": "vmware"},
                    "specTemplates": [{"id": 9}]
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body(&[9]))
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/cluster-layouts/5")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body(&[9]))
            .create_async()
            .await;

        let schema = ClusterLayoutResource::schema_definition();
        let planned =
            plan_resource_change(&schema, &DynamicValue::null(), &config(), &config()).planned_state;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_cluster_layout".to_string(),
                    planned_state: planned,
                    config: config(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(
            state.get_string(&AttributePath::new("code")).unwrap(),
            "k8s-small-1"
        );
        assert!(state.get_bool(&AttributePath::new("creatable")).unwrap());
        assert_eq!(
            state
                .get_i64_list(&AttributePath::new("spec_template_ids"))
                .unwrap(),
            vec![9]
        );
        create.assert_async().await;
    }

    #[tokio::test]
    async fn read_marks_detached_spec_template() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/library/cluster-layouts/5")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body(&[11]))
            .create_async()
            .await;

        let mut current = config();
        let _ = current.set_string(&AttributePath::new("id"), "5".to_string());

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "morpheus_cluster_layout".to_string(),
                    current_state: current,
                },
            )
            .await;

        let state = response.new_state.unwrap();
        assert_eq!(
            state
                .get_i64_list(&AttributePath::new("spec_template_ids"))
                .unwrap(),
            vec![0, 11]
        );
    }

    #[tokio::test]
    async fn read_removes_missing_layout() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/library/cluster-layouts/5")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"Layout not found"}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "morpheus_cluster_layout".to_string(),
                    current_state: object(&[("id", string("5"))]),
                },
            )
            .await;

        assert!(response.new_state.is_none());
    }

    #[tokio::test]
    async fn rename_keeps_unconfigured_spec_templates() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("PUT", "/api/library/cluster-layouts/5")
            .match_body(Matcher::Json(json!({
                "layout": {
                    "name": "k8s-medium",
                    "computeVersion": "1.29",
                    "groupType": {"code": "kubernetes-cluster"},
                    "provisionType": {"code": "vmware"}
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body(&[9, 14]))
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/library/cluster-layouts/5")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(layout_body(&[9, 14]))
            .create_async()
            .await;

        let schema = ClusterLayoutResource::schema_definition();
        let prior = object(&[
            ("id", string("5")),
            ("name", string("k8s-small")),
            ("code", string("k8s-small-1")),
            ("version", string("1.29")),
            ("cluster_type", string("kubernetes-cluster")),
            ("technology", string("vmware")),
            ("spec_template_ids", ids(&[9, 14])),
        ]);
        let config = object(&[
            ("name", string("k8s-medium")),
            ("version", string("1.29")),
            ("cluster_type", string("kubernetes-cluster")),
            ("technology", string("vmware")),
        ]);
        let plan = plan_resource_change(&schema, &prior, &config, &config);
        assert!(plan.requires_replace.is_empty());

        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "morpheus_cluster_layout".to_string(),
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
                .get_i64_list(&AttributePath::new("spec_template_ids"))
                .unwrap(),
            vec![9, 14]
        );
        update.assert_async().await;
    }
}
