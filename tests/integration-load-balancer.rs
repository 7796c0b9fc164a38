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

#![cfg(feature = "load-balancer")]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Once;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use openstack_bindings::auth::NoAuth;
use openstack_bindings::common::Waiter;
use openstack_bindings::load_balancer::{
    LbAlgorithm, MemberSpec, OperatingStatus, PoolProtocol, ProvisioningStatus,
};
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
                "id": "v2",
                "status": "CURRENT",
                "links": [{"href": format!("{}/v2", server.uri()), "rel": "self"}]
            }]
        })))
        .mount(&server)
        .await;

    let auth = NoAuth::new(server.uri()).expect("Invalid mock server URI");
    let cloud = Cloud::new(auth).await.expect("Cannot create a cloud");
    (server, cloud)
}

fn load_balancer(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("lb-{}", id),
        "admin_state_up": true,
        "provisioning_status": status,
        "operating_status": "ONLINE",
        "vip_address": "203.0.113.50",
        "vip_subnet_id": "d4af86e1",
        "listeners": [{"id": "listener1"}],
        "pools": [],
        "created_at": "2024-03-11T16:29:04",
        "updated_at": null
    })
}

fn pool(members: &[&str]) -> serde_json::Value {
    json!({
        "pool": {
            "id": "pool1",
            "lb_algorithm": "ROUND_ROBIN",
            "protocol": "HTTP",
            "provisioning_status": "ACTIVE",
            "operating_status": "ONLINE",
            "loadbalancers": [{"id": "lb1"}],
            "listeners": [],
            "members": members.iter().map(|m| json!({"id": m})).collect::<Vec<_>>()
        }
    })
}

#[tokio::test]
async fn test_load_balancers_follow_next_links() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2/lbaas/loadbalancers"))
        .and(query_param("marker", "lb1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loadbalancers": [load_balancer("lb2", "PENDING_UPDATE")],
            "loadbalancers_links": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/lbaas/loadbalancers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loadbalancers": [load_balancer("lb1", "ACTIVE")],
            "loadbalancers_links": [
                {"rel": "next", "href": format!("{}/v2/lbaas/loadbalancers?marker=lb1", server.uri())}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lbs = os
        .list_load_balancers()
        .await
        .expect("Cannot list load balancers");
    assert_eq!(lbs.len(), 2);
    assert_eq!(lbs[0].id(), "lb1");
    assert_eq!(lbs[0].provisioning_status(), ProvisioningStatus::Active);
    assert_eq!(lbs[0].operating_status(), OperatingStatus::Online);
    assert_eq!(lbs[0].listener_ids(), vec!["listener1"]);
    assert!(lbs[0].created_at().is_some());
    assert!(lbs[1].provisioning_status().is_pending());
}

#[tokio::test]
async fn test_load_balancer_create_and_cascade_delete() {
    let (server, os) = set_up().await;

    Mock::given(method("POST"))
        .and(path("/v2/lbaas/loadbalancers"))
        .and(body_json(json!({
            "loadbalancer": {
                "name": "lb-lb1",
                "vip_subnet_id": "d4af86e1"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "loadbalancer": load_balancer("lb1", "PENDING_CREATE")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/lbaas/loadbalancers/lb1"))
        .and(query_param("cascade", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let lb = os
        .new_load_balancer()
        .with_name("lb-lb1")
        .with_vip_subnet("d4af86e1")
        .create()
        .await
        .expect("Cannot create a load balancer");
    assert_eq!(lb.provisioning_status(), ProvisioningStatus::PendingCreate);

    let _waiter = lb
        .delete_cascade()
        .await
        .expect("Cannot delete a load balancer");
}

#[tokio::test]
async fn test_load_balancer_waiter_fails_on_error() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2/lbaas/loadbalancers/lb1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loadbalancer": load_balancer("lb1", "ERROR")
        })))
        .mount(&server)
        .await;

    let lb = os
        .get_load_balancer("lb1")
        .await
        .expect("Cannot get a load balancer");
    let err = lb.into_waiter().wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailed);
}

#[tokio::test]
async fn test_load_balancer_status_tree() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2/lbaas/loadbalancers/lb1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loadbalancer": load_balancer("lb1", "ACTIVE")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/lbaas/loadbalancers/lb1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statuses": {
                "loadbalancer": {
                    "id": "lb1",
                    "name": "lb-lb1",
                    "operating_status": "DEGRADED",
                    "provisioning_status": "ACTIVE",
                    "listeners": [{
                        "id": "listener1",
                        "operating_status": "ONLINE",
                        "provisioning_status": "ACTIVE",
                        "pools": [{
                            "id": "pool1",
                            "operating_status": "DEGRADED",
                            "provisioning_status": "ACTIVE",
                            "members": [{
                                "id": "member1",
                                "address": "192.0.2.16",
                                "protocol_port": 80,
                                "operating_status": "ERROR",
                                "provisioning_status": "ACTIVE"
                            }]
                        }]
                    }]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lb = os
        .get_load_balancer("lb1")
        .await
        .expect("Cannot get a load balancer");
    let tree = lb.status_tree().await.expect("Cannot get the status tree");
    assert_eq!(tree.operating_status, OperatingStatus::Degraded);
    let member = &tree.listeners[0].pools[0].members[0];
    assert_eq!(member.id, "member1");
    assert_eq!(member.operating_status, OperatingStatus::Error);
}

#[tokio::test]
async fn test_pool_batch_update_members() {
    let (server, os) = set_up().await;

    Mock::given(method("PUT"))
        .and(path("/v2/lbaas/pools/pool1/members"))
        .and(body_json(json!({
            "members": [
                {"address": "192.0.2.16", "protocol_port": 80},
                {"address": "192.0.2.17", "protocol_port": 80}
            ]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/lbaas/pools/pool1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool(&["member1"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/lbaas/pools/pool1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool(&["member1", "member2"])))
        .mount(&server)
        .await;

    let mut pool = os.get_pool("pool1").await.expect("Cannot get a pool");
    assert_eq!(pool.lb_algorithm(), LbAlgorithm::RoundRobin);
    assert_eq!(pool.protocol(), PoolProtocol::Http);
    assert_eq!(pool.member_ids(), vec!["member1"]);

    pool.batch_update_members(vec![
        MemberSpec::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 16)), 80),
        MemberSpec::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 17)), 80),
    ])
    .await
    .expect("Cannot update members");
    assert_eq!(pool.member_ids(), vec!["member1", "member2"]);
}

#[tokio::test]
async fn test_pool_requires_parent() {
    let (_server, os) = set_up().await;

    let err = os
        .new_pool(PoolProtocol::Http, LbAlgorithm::RoundRobin)
        .create()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
