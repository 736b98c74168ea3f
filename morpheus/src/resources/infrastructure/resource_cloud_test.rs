#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::resources::test_support::{object, string, test_provider_data};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::plan::plan_resource_change;

    fn settings(pairs: &[(&str, &str)]) -> Dynamic {
        Dynamic::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), string(v)))
                .collect(),
        )
    }

    fn config() -> DynamicValue {
        object(&[
            ("name", string("lab")),
            ("cloud_type", string("vmware")),
            ("group_id", Dynamic::Number(1.0)),
            (
                "config",
                settings(&[("apiUrl", "https://vc.lab/sdk"), ("datacenter", "dc1")]),
            ),
        ])
    }

    fn zone_body(status: &str) -> String {
        json!({"zone": {
            "id": 5,
            "name": "lab",
            "code": "lab-vmware",
            "zoneType": {"code": "vmware"},
            "groups": [{"id": 1}],
            "status": status,
            "enabled": true,
            "visibility": "private",
            "config": {
                "apiUrl": "https://vc.lab/sdk",
                "datacenter": "dc1",
                "enableVnc": true,
                "diskStorageType": null
            }
        }})
        .to_string()
    }

    fn fast_poll() -> CloudPollConfig {
        CloudPollConfig {
            delay: Duration::ZERO,
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(200),
        }
    }

    fn configured(server_url: &str) -> CloudResource {
        let mut resource = CloudResource::new().with_poll_config(fast_poll());
        resource.provider_data = Some(test_provider_data(server_url));
        resource
    }

    fn planned() -> DynamicValue {
        let schema = CloudResource::schema_definition();
        plan_resource_change(&schema, &DynamicValue::null(), &config(), &config()).planned_state
    }

    async fn create_with_status(server: &mut Server, status: &str) -> CreateResourceResponse {
        let _create = server
            .mock("POST", "/api/zones")
            .match_body(Matcher::PartialJson(json!({
                "zone": {
                    "zoneType": {"code": "vmware"},
                    "groupId": 1,
                    "config": {"apiUrl": "https://vc.lab/sdk", "datacenter": "dc1"}
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(zone_body("initializing"))
            .create_async()
            .await;
        let _poll = server
            .mock("GET", "/api/zones/5")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(zone_body(status))
            .create_async()
            .await;

        configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "morpheus_cloud".to_string(),
                    planned_state: planned(),
                    config: config(),
                },
            )
            .await
    }

    #[test]
    fn default_poll_matches_cloud_sync_timing() {
        let conf = CloudPollConfig::default().state_change_conf();
        assert_eq!(conf.pending, vec!["initializing", "syncing"]);
        assert_eq!(conf.target, vec!["ok"]);
        assert_eq!(conf.delay, Duration::from_secs(60));
        assert_eq!(conf.min_timeout, Duration::from_secs(60));
        assert_eq!(conf.timeout, Duration::from_secs(3600));
    }

    #[test]
    fn flatten_config_keeps_tracked_keys_only() {
        let known: HashMap<String, Dynamic> = [
            ("datacenter".to_string(), string("old")),
            ("enableVnc".to_string(), string("false")),
            ("diskStorageType".to_string(), string("thin")),
        ]
        .into_iter()
        .collect();
        let server: HashMap<String, serde_json::Value> = [
            ("datacenter".to_string(), json!("dc1")),
            ("enableVnc".to_string(), json!(true)),
            ("diskStorageType".to_string(), serde_json::Value::Null),
            ("apiUrl".to_string(), json!("https://vc.lab/sdk")),
        ]
        .into_iter()
        .collect();

        let flat = flatten_config(&known, &server);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("datacenter"), Some(&string("dc1")));
        assert_eq!(flat.get("enableVnc"), Some(&string("true")));
    }

    #[tokio::test]
    async fn create_waits_until_cloud_is_ok() {
        let mut server = Server::new_async().await;
        let response = create_with_status(&mut server, "ok").await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "5");
        assert_eq!(state.get_string(&AttributePath::new("status")).unwrap(), "ok");
        assert_eq!(
            state.get_string(&AttributePath::new("code")).unwrap(),
            "lab-vmware"
        );
        let config = state.get_map(&AttributePath::new("config")).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("datacenter"), Some(&string("dc1")));
    }

    #[tokio::test]
    async fn create_keeps_id_when_cloud_fails_to_sync() {
        let mut server = Server::new_async().await;
        let response = create_with_status(&mut server, "error").await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Cloud did not become ready");
        assert!(response.diagnostics[0].detail.contains("error"));
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "5"
        );
    }

    #[tokio::test]
    async fn create_times_out_while_syncing() {
        let mut server = Server::new_async().await;
        let response = create_with_status(&mut server, "syncing").await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("timeout"));
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("status"))
                .unwrap(),
            "initializing"
        );
    }

    #[tokio::test]
    async fn update_does_not_move_cloud_between_groups() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("PUT", "/api/zones/5")
            .match_body(Matcher::Json(json!({
                "zone": {
                    "name": "lab",
                    "zoneType": {"code": "vmware"},
                    "config": {"apiUrl": "https://vc.lab/sdk", "datacenter": "dc1"}
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(zone_body("ok"))
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/zones/5")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(zone_body("ok"))
            .create_async()
            .await;

        let mut prior = config();
        let _ = prior.set_string(&AttributePath::new("id"), "5".to_string());

        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "morpheus_cloud".to_string(),
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
    async fn read_removes_deleted_cloud() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/zones/5")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"Cloud not found"}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "morpheus_cloud".to_string(),
                    current_state: object(&[("id", string("5"))]),
                },
            )
            .await;

        assert!(response.new_state.is_none());
    }
}
