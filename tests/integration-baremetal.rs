// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg(feature = "baremetal")]

use std::sync::Once;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use openstack_bindings::auth::NoAuth;
use openstack_bindings::baremetal::{PowerState, ProvisionState, TargetPowerState};
use openstack_bindings::{Cloud, ErrorKind};

static INIT: Once = Once::new();

async fn set_up() -> (MockServer, Cloud) {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": [{
                "id": "v1",
                "status": "CURRENT",
                "min_version": "1.1",
                "version": "1.83",
                "links": [{"href": format!("{}/v1", server.uri()), "rel": "self"}]
            }]
        })))
        .mount(&server)
        .await;

    let auth = NoAuth::new(server.uri()).expect("Invalid mock server URI");
    let cloud = Cloud::new(auth).await.expect("Cannot create a cloud");
    (server, cloud)
}

fn node(power_state: &str) -> serde_json::Value {
    json!({
        "uuid": "1be26c0b",
        "name": "compute-0",
        "console_enabled": false,
        "created_at": "2016-08-18T22:28:48.643434+00:00",
        "driver": "ipmi",
        "maintenance": false,
        "power_state": power_state,
        "provision_state": "available",
        "bios_interface": "no-bios",
        "boot_interface": "ipxe",
        "console_interface": "no-console",
        "deploy_interface": "direct",
        "inspect_interface": "agent",
        "management_interface": "ipmitool",
        "network_interface": "flat",
        "power_interface": "ipmitool",
        "raid_interface": "agent",
        "rescue_interface": "agent",
        "storage_interface": "noop",
        "vendor_interface": "no-vendor"
    })
}

#[tokio::test]
async fn test_get_node_negotiates_version() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/nodes/compute-0"))
        .and(header("X-OpenStack-Ironic-API-Version", "1.83"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("power on")))
        .expect(1)
        .mount(&server)
        .await;

    let node = os
        .get_baremetal_node("compute-0")
        .await
        .expect("Cannot get a node");
    assert_eq!(node.id(), "1be26c0b");
    assert_eq!(node.name().as_deref(), Some("compute-0"));
    assert_eq!(node.provision_state(), ProvisionState::Available);
    assert_eq!(node.power_state(), Some(PowerState::On));
}

#[tokio::test]
async fn test_list_nodes_follows_next_field() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/nodes"))
        .and(query_param("marker", "node-1"))
        .and(header("X-OpenStack-Ironic-API-Version", "1.46"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{
                "uuid": "node-2",
                "maintenance": true,
                "provision_state": "manageable"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/nodes"))
        .and(header("X-OpenStack-Ironic-API-Version", "1.46"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{
                "uuid": "node-1",
                "maintenance": false,
                "power_state": "power off",
                "provision_state": "available"
            }],
            "next": format!("{}/v1/nodes?marker=node-1", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = os
        .list_baremetal_nodes()
        .await
        .expect("Cannot list nodes");
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].id(), "node-1");
    assert_eq!(nodes[1].provision_state(), ProvisionState::Manageable);
}

#[tokio::test]
async fn test_set_power_state_refreshes() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/nodes/compute-0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("power on")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/nodes/1be26c0b/states/power"))
        .and(body_json(json!({"target": "power off"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/nodes/1be26c0b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("power off")))
        .expect(1)
        .mount(&server)
        .await;

    let mut node = os
        .get_baremetal_node("compute-0")
        .await
        .expect("Cannot get a node");
    node.set_power_state(TargetPowerState::Off)
        .await
        .expect("Cannot change power state");
    assert_eq!(node.power_state(), Some(PowerState::Off));
}

#[tokio::test]
async fn test_node_conflict() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/nodes/compute-0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("power on")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/nodes/1be26c0b/states/power"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error_message": "{\"faultstring\": \"Node 1be26c0b is locked by host conductor-1\", \"faultcode\": \"Client\"}"
        })))
        .mount(&server)
        .await;

    let mut node = os
        .get_baremetal_node("compute-0")
        .await
        .expect("Cannot get a node");
    let err = node
        .set_power_state(TargetPowerState::Off)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
