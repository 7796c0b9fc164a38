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

#![cfg(feature = "network")]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Once;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use openstack_bindings::auth::NoAuth;
use openstack_bindings::network::{
    DeadPeerDetection, DpdAction, FirewallGroupStatus, FloatingIpStatus, Initiator,
    SiteConnectionStatus,
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
                "id": "v2.0",
                "status": "CURRENT",
                "links": [{"href": format!("{}/v2.0/", server.uri()), "rel": "self"}]
            }]
        })))
        .mount(&server)
        .await;

    let auth = NoAuth::new(server.uri()).expect("Invalid mock server URI");
    let cloud = Cloud::new(auth).await.expect("Cannot create a cloud");
    (server, cloud)
}

fn floating_ip(id: &str, address: &str) -> serde_json::Value {
    json!({
        "id": id,
        "floating_network_id": "376da547",
        "floating_ip_address": address,
        "fixed_ip_address": "",
        "port_id": null,
        "status": "DOWN",
        "created_at": "2024-05-02T10:00:00Z"
    })
}

#[tokio::test]
async fn test_floating_ips_follow_next_links() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/floatingips"))
        .and(query_param("marker", "fip1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floatingips": [floating_ip("fip2", "172.24.4.229")],
            "floatingips_links": [
                {"rel": "previous", "href": format!("{}/v2.0/floatingips?marker=fip2&page_reverse=True", server.uri())}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2.0/floatingips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floatingips": [floating_ip("fip1", "172.24.4.228")],
            "floatingips_links": [
                {"rel": "next", "href": format!("{}/v2.0/floatingips?marker=fip1", server.uri())}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fips = os.list_floating_ips().await.expect("Cannot list floating IPs");
    assert_eq!(fips.len(), 2);
    assert_eq!(fips[0].id(), "fip1");
    assert_eq!(fips[1].id(), "fip2");
    assert_eq!(
        fips[1].floating_ip_address(),
        Some(IpAddr::V4(Ipv4Addr::new(172, 24, 4, 229)))
    );
    assert_eq!(fips[0].status(), FloatingIpStatus::Down);
    assert!(!fips[0].is_associated());
}

#[tokio::test]
async fn test_floating_ip_create() {
    let (server, os) = set_up().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/floatingips"))
        .and(body_json(json!({
            "floatingip": {
                "floating_network_id": "376da547",
                "description": "web frontend"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "floatingip": floating_ip("fip1", "172.24.4.228")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fip = os
        .new_floating_ip("376da547")
        .with_description("web frontend")
        .create()
        .await
        .expect("Cannot create a floating IP");
    assert_eq!(fip.id(), "fip1");
}

#[tokio::test]
async fn test_floating_ip_associate_discards_pending_changes() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/floatingips/fip1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floatingip": floating_ip("fip1", "172.24.4.228")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/floatingips/fip1"))
        .and(body_json(json!({
            "floatingip": {
                "port_id": "ce705c24",
                "fixed_ip_address": "10.0.0.3"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floatingip": {
                "id": "fip1",
                "floating_network_id": "376da547",
                "floating_ip_address": "172.24.4.228",
                "fixed_ip_address": "10.0.0.3",
                "port_id": "ce705c24",
                "status": "ACTIVE",
                "created_at": "2024-05-02T10:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/floatingips/fip1"))
        .and(body_json(json!({"floatingip": {"port_id": null}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floatingip": floating_ip("fip1", "172.24.4.228")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut fip = os
        .get_floating_ip("fip1")
        .await
        .expect("Cannot get the floating IP");
    fip.set_description("web frontend");
    assert!(fip.is_dirty());

    fip.associate("ce705c24", Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3))))
        .await
        .expect("Cannot associate the floating IP");
    assert!(!fip.is_dirty());
    assert!(fip.is_associated());
    assert_eq!(fip.status(), FloatingIpStatus::Active);

    fip.set_description("web frontend");
    fip.dissociate()
        .await
        .expect("Cannot dissociate the floating IP");
    assert!(!fip.is_dirty());
    assert!(!fip.is_associated());
}

#[tokio::test]
async fn test_floating_ip_not_found() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/floatingips/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "NeutronError": {
                "type": "FloatingIPNotFound",
                "message": "Floating IP missing could not be found",
                "detail": ""
            }
        })))
        .mount(&server)
        .await;

    let err = os.get_floating_ip("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert!(err.to_string().contains("could not be found"));
}

#[tokio::test]
async fn test_firewall_policy_insert_rule() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/fwaas/firewall_policies/policy1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall_policy": {
                "id": "policy1",
                "name": "edge",
                "firewall_rules": ["rule-http"],
                "audited": true,
                "shared": false
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/fwaas/firewall_policies/policy1/insert_rule"))
        .and(body_json(json!({
            "firewall_rule_id": "rule-ssh",
            "insert_before": "rule-http"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "policy1",
            "name": "edge",
            "firewall_rules": ["rule-ssh", "rule-http"],
            "audited": false,
            "shared": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut policy = os
        .get_firewall_policy("policy1")
        .await
        .expect("Cannot get the firewall policy");
    assert_eq!(policy.firewall_rules(), &["rule-http".to_string()]);

    policy
        .insert_rule("rule-ssh")
        .before("rule-http")
        .send()
        .await
        .expect("Cannot insert a rule");
    assert_eq!(
        policy.firewall_rules(),
        &["rule-ssh".to_string(), "rule-http".to_string()]
    );
    assert!(!policy.audited());
    assert!(!policy.is_dirty());
}

fn firewall_group(ingress: Option<&str>, egress: Option<&str>) -> serde_json::Value {
    json!({
        "id": "3af94f0e",
        "tenant_id": "9f98fc0e",
        "name": "test",
        "description": "fancy group",
        "ingress_firewall_policy_id": ingress,
        "egress_firewall_policy_id": egress,
        "admin_state_up": true,
        "ports": ["a6af1e56"],
        "status": "ACTIVE",
        "shared": false,
        "project_id": "9f98fc0e"
    })
}

#[tokio::test]
async fn test_firewall_groups_list() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/fwaas/firewall_groups"))
        .and(query_param("shared", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall_groups": [
                firewall_group(Some("e3f11142"), None),
                {
                    "id": "f9fbb80c",
                    "name": "default",
                    "description": "Default firewall group",
                    "ingress_firewall_policy_id": "90e3fcac",
                    "egress_firewall_policy_id": "122fb344",
                    "admin_state_up": true,
                    "ports": ["20da216c", "4f4c714c"],
                    "status": "INACTIVE",
                    "shared": false
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = os
        .find_firewall_groups()
        .with(openstack_bindings::network::FirewallGroupFilter::Shared(false))
        .all()
        .await
        .expect("Cannot list firewall groups");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id(), "3af94f0e");
    assert_eq!(groups[0].ingress_firewall_policy_id().as_deref(), Some("e3f11142"));
    assert!(groups[0].egress_firewall_policy_id().is_none());
    assert_eq!(groups[1].ports().len(), 2);
    assert_eq!(groups[1].status(), FirewallGroupStatus::Inactive);
}

#[tokio::test]
async fn test_firewall_group_create() {
    let (server, os) = set_up().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/fwaas/firewall_groups"))
        .and(body_json(json!({
            "firewall_group": {
                "name": "test",
                "description": "fancy group",
                "ingress_firewall_policy_id": "e3f11142",
                "ports": ["a6af1e56"]
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "firewall_group": firewall_group(Some("e3f11142"), None)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let group = os
        .new_firewall_group()
        .with_name("test")
        .with_description("fancy group")
        .with_ingress_firewall_policy("e3f11142")
        .with_port("a6af1e56")
        .create()
        .await
        .expect("Cannot create a firewall group");
    assert_eq!(group.id(), "3af94f0e");
    assert_eq!(group.name().as_deref(), Some("test"));
}

#[tokio::test]
async fn test_firewall_group_update_and_remove_policies() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/fwaas/firewall_groups/3af94f0e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall_group": firewall_group(Some("e3f11142"), Some("122fb344"))
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/fwaas/firewall_groups/3af94f0e"))
        .and(body_json(json!({
            "firewall_group": {"name": "edge", "ports": []}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall_group": firewall_group(Some("e3f11142"), Some("122fb344"))
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/fwaas/firewall_groups/3af94f0e"))
        .and(body_json(json!({
            "firewall_group": {"ingress_firewall_policy_id": null}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall_group": firewall_group(None, Some("122fb344"))
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/fwaas/firewall_groups/3af94f0e"))
        .and(body_json(json!({
            "firewall_group": {"egress_firewall_policy_id": null}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall_group": firewall_group(None, None)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2.0/fwaas/firewall_groups/3af94f0e"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut group = os
        .get_firewall_group("3af94f0e")
        .await
        .expect("Cannot get the firewall group");
    group.set_name("edge");
    group.set_ports(Vec::new());
    group.save().await.expect("Cannot update the firewall group");
    assert!(!group.is_dirty());

    group
        .remove_ingress_policy()
        .await
        .expect("Cannot remove the ingress policy");
    assert!(group.ingress_firewall_policy_id().is_none());
    assert_eq!(group.egress_firewall_policy_id().as_deref(), Some("122fb344"));

    group
        .remove_egress_policy()
        .await
        .expect("Cannot remove the egress policy");
    assert!(group.egress_firewall_policy_id().is_none());

    let _ = group.delete().await.expect("Cannot delete the firewall group");
}

fn site_connection(status: &str) -> serde_json::Value {
    json!({
        "status": status,
        "psk": "secret",
        "initiator": "bi-directional",
        "name": "vpnconnection1",
        "admin_state_up": true,
        "project_id": "10039663",
        "tenant_id": "10039663",
        "auth_mode": "psk",
        "peer_cidrs": [],
        "mtu": 1500,
        "peer_ep_group_id": "9ad5a7e0",
        "ikepolicy_id": "9b00d6b0",
        "vpnservice_id": "5c561d9d",
        "dpd": {"action": "hold", "interval": 30, "timeout": 120},
        "route_mode": "static",
        "ipsecpolicy_id": "e6e23d0c",
        "local_ep_group_id": "3e1815dd",
        "peer_address": "172.24.4.233",
        "peer_id": "172.24.4.233",
        "id": "851f280f",
        "description": ""
    })
}

#[tokio::test]
async fn test_site_connection_create() {
    let (server, os) = set_up().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/vpn/ipsec-site-connections"))
        .and(body_json(json!({
            "ipsec_site_connection": {
                "psk": "secret",
                "initiator": "bi-directional",
                "ipsecpolicy_id": "e6e23d0c",
                "admin_state_up": true,
                "mtu": 1500,
                "peer_ep_group_id": "9ad5a7e0",
                "ikepolicy_id": "9b00d6b0",
                "vpnservice_id": "5c561d9d",
                "local_ep_group_id": "3e1815dd",
                "peer_address": "172.24.4.233",
                "peer_id": "172.24.4.233",
                "name": "vpnconnection1"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ipsec_site_connection": site_connection("PENDING_CREATE")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conn = os
        .new_site_connection("5c561d9d", "9b00d6b0", "e6e23d0c")
        .with_name("vpnconnection1")
        .with_admin_state_up(true)
        .with_psk("secret")
        .with_initiator(Initiator::BiDirectional)
        .with_mtu(1500u32)
        .with_peer_ep_group("9ad5a7e0")
        .with_local_ep_group("3e1815dd")
        .with_peer_address("172.24.4.233")
        .with_peer_id("172.24.4.233")
        .create()
        .await
        .expect("Cannot create a site connection");
    assert_eq!(conn.id(), "851f280f");
    assert_eq!(conn.status(), SiteConnectionStatus::PendingCreate);
    assert_eq!(conn.auth_mode().as_deref(), Some("psk"));
    assert_eq!(
        conn.dpd(),
        Some(DeadPeerDetection {
            action: DpdAction::Hold,
            interval: 30,
            timeout: 120,
        })
    );
}

#[tokio::test]
async fn test_site_connection_update_and_delete() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/vpn/ipsec-site-connections"))
        .and(query_param("name", "vpnconnection1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ipsec_site_connections": [site_connection("ACTIVE")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2.0/vpn/ipsec-site-connections/851f280f"))
        .and(body_json(json!({
            "ipsec_site_connection": {
                "mtu": 1400,
                "dpd": {"action": "restart", "interval": 10, "timeout": 40}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ipsec_site_connection": site_connection("PENDING_UPDATE")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2.0/vpn/ipsec-site-connections/851f280f"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut conn = os
        .find_site_connections()
        .with(openstack_bindings::network::SiteConnectionFilter::Name(
            "vpnconnection1".into(),
        ))
        .one()
        .await
        .expect("Cannot find the site connection");
    assert_eq!(conn.status(), SiteConnectionStatus::Active);

    conn.set_mtu(1400u32);
    conn.set_dpd(DeadPeerDetection {
        action: DpdAction::Restart,
        interval: 10,
        timeout: 40,
    });
    conn.save().await.expect("Cannot update the site connection");
    assert!(!conn.is_dirty());
    assert_eq!(conn.status(), SiteConnectionStatus::PendingUpdate);

    let _ = conn.delete().await.expect("Cannot delete the site connection");
}
