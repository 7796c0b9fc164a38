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

//! JSON structures and protocol bits for the Network API.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::common::protocol::deser_optional_datetime;
use crate::common::{
    FirewallPolicyRef, FirewallRuleRef, IkePolicyRef, IpsecPolicyRef, NetworkRef, PortRef,
    ProjectRef, SubnetRef, VpnServiceRef,
};
use crate::utils::{empty_as_none, SortDir};

protocol_enum! {
    #[doc = "IP protocol version."]
    enum IpVersion: u8 {
        V4 = 4,
        V6 = 6
    }
}

protocol_enum! {
    #[doc = "Possible floating IP statuses."]
    enum FloatingIpStatus = Unknown {
        Active = "ACTIVE",
        Down = "DOWN",
        Error = "ERROR",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Available sort keys."]
    enum FloatingIpSortKey {
        FixedIpAddress = "fixed_ip_address",
        FloatingIpAddress = "floating_ip_address",
        FloatingNetworkId = "floating_network_id",
        Id = "id",
        PortId = "port_id",
        RouterId = "router_id",
        Status = "status"
    }
}

/// A port forwarding of a floating IP.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortForwarding {
    /// External port.
    pub external_port: u16,
    /// IP address of the internal port.
    pub internal_ip_address: net::IpAddr,
    /// Internal port.
    pub internal_port: u16,
    /// Protocol (TCP or UDP).
    pub protocol: String,
}

/// A floating IP.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub dns_domain: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub dns_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fixed_ip_address: Option<net::IpAddr>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub floating_ip_address: Option<net::IpAddr>,
    pub floating_network_id: String,
    pub id: String,
    #[serde(default)]
    pub port_forwardings: Vec<PortForwarding>,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub revision_number: Option<u32>,
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default)]
    pub status: FloatingIpStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIpRoot {
    pub floatingip: FloatingIp,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatingIpCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<net::IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_ip_address: Option<net::IpAddr>,
    pub floating_network_id: NetworkRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<PortRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<SubnetRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatingIpCreateRoot {
    pub floatingip: FloatingIpCreate,
}

/// Floating IP update. A `Some(None)` port ID disassociates the IP.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FloatingIpUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<Option<net::IpAddr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatingIpUpdateRoot {
    pub floatingip: FloatingIpUpdate,
}

query_filter! {
    #[doc = "Available filters for floating IP list."]
    enum FloatingIpFilter {
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Filter by fixed IP address."]
        FixedIpAddress(net::IpAddr) = "fixed_ip_address",
        #[doc = "Filter by floating IP address."]
        FloatingIpAddress(net::IpAddr) = "floating_ip_address",
        #[doc = "Filter by network ID (names are not supported)."]
        FloatingNetwork(NetworkRef) = "floating_network_id",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by port ID (names are not supported)."]
        Port(PortRef) = "port_id",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by router ID."]
        Router(String) = "router_id",
        #[doc = "Sort key."]
        SortKey(FloatingIpSortKey) = "sort_key",
        #[doc = "Sort direction."]
        SortDir(SortDir) = "sort_dir",
        #[doc = "Filter by status."]
        Status(FloatingIpStatus) = "status"
    }
}

protocol_enum! {
    #[doc = "Network type of a segment range."]
    enum NetworkType {
        Geneve = "geneve",
        Gre = "gre",
        Vlan = "vlan",
        Vxlan = "vxlan"
    }
}

protocol_enum! {
    #[doc = "Available sort keys."]
    enum SegmentRangeSortKey {
        Id = "id",
        Maximum = "maximum",
        Minimum = "minimum",
        Name = "name",
        NetworkType = "network_type",
        PhysicalNetwork = "physical_network"
    }
}

/// A network segment range.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRange {
    #[serde(default)]
    pub available: Vec<u32>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub default: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub id: String,
    pub maximum: u32,
    pub minimum: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    pub network_type: NetworkType,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub physical_network: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub revision_number: Option<u32>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub used: HashMap<u32, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRangeRoot {
    pub network_segment_range: SegmentRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentRangeCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub maximum: u32,
    pub minimum: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub network_type: NetworkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentRangeCreateRoot {
    pub network_segment_range: SegmentRangeCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SegmentRangeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentRangeUpdateRoot {
    pub network_segment_range: SegmentRangeUpdate,
}

query_filter! {
    #[doc = "Available filters for network segment range list."]
    enum SegmentRangeFilter {
        #[doc = "Filter by the default flag."]
        Default(bool) = "default",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by network type."]
        NetworkType(NetworkType) = "network_type",
        #[doc = "Filter by physical network."]
        PhysicalNetwork(String) = "physical_network",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by the shared flag."]
        Shared(bool) = "shared",
        #[doc = "Sort key."]
        SortKey(SegmentRangeSortKey) = "sort_key",
        #[doc = "Sort direction."]
        SortDir(SortDir) = "sort_dir"
    }
}

protocol_enum! {
    #[doc = "Action of a firewall rule."]
    enum FirewallAction {
        Allow = "allow",
        Deny = "deny",
        Reject = "reject"
    }
}

protocol_enum! {
    #[doc = "IP protocol of a firewall rule."]
    enum FirewallProtocol {
        Icmp = "icmp",
        Tcp = "tcp",
        Udp = "udp"
    }
}

/// A firewall policy.
#[derive(Debug, Clone, Deserialize)]
pub struct FirewallPolicy {
    #[serde(default)]
    pub audited: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub firewall_rules: Vec<String>,
    pub id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub shared: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirewallPolicyRoot {
    pub firewall_policy: FirewallPolicy,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallPolicyCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub firewall_rules: Vec<FirewallRuleRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallPolicyCreateRoot {
    pub firewall_policy: FirewallPolicyCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallPolicyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_rules: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallPolicyUpdateRoot {
    pub firewall_policy: FirewallPolicyUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertRule {
    pub firewall_rule_id: FirewallRuleRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_after: Option<FirewallRuleRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_before: Option<FirewallRuleRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveRule {
    pub firewall_rule_id: FirewallRuleRef,
}

query_filter! {
    #[doc = "Available filters for firewall policy list."]
    enum FirewallPolicyFilter {
        #[doc = "Filter by the audited flag."]
        Audited(bool) = "audited",
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by the shared flag."]
        Shared(bool) = "shared"
    }
}

/// A firewall rule.
#[derive(Debug, Clone, Deserialize)]
pub struct FirewallRule {
    pub action: FirewallAction,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination_ip_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination_port: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    pub id: String,
    pub ip_version: IpVersion,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub protocol: Option<FirewallProtocol>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_ip_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_port: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirewallRuleRoot {
    pub firewall_rule: FirewallRule,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallRuleCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FirewallAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<IpVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<FirewallProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallRuleCreateRoot {
    pub firewall_rule: FirewallRuleCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FirewallAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<IpVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<FirewallProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallRuleUpdateRoot {
    pub firewall_rule: FirewallRuleUpdate,
}

query_filter! {
    #[doc = "Available filters for firewall rule list."]
    enum FirewallRuleFilter {
        #[doc = "Filter by action."]
        Action(FirewallAction) = "action",
        #[doc = "Filter by the enabled flag."]
        Enabled(bool) = "enabled",
        #[doc = "Filter by IP version."]
        IpVersion(IpVersion) = "ip_version",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by protocol."]
        Protocol(FirewallProtocol) = "protocol",
        #[doc = "Filter by the shared flag."]
        Shared(bool) = "shared"
    }
}

protocol_enum! {
    #[doc = "Possible firewall group statuses."]
    enum FirewallGroupStatus = Unknown {
        Active = "ACTIVE",
        Down = "DOWN",
        Error = "ERROR",
        Inactive = "INACTIVE",
        PendingCreate = "PENDING_CREATE",
        PendingDelete = "PENDING_DELETE",
        PendingUpdate = "PENDING_UPDATE",
        Unknown = "UNKNOWN"
    }
}

/// A firewall group.
#[derive(Debug, Clone, Deserialize)]
pub struct FirewallGroup {
    pub admin_state_up: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub egress_firewall_policy_id: Option<String>,
    pub id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ingress_firewall_policy_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub status: FirewallGroupStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirewallGroupRoot {
    pub firewall_group: FirewallGroup,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallGroupCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_firewall_policy_id: Option<FirewallPolicyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_firewall_policy_id: Option<FirewallPolicyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallGroupCreateRoot {
    pub firewall_group: FirewallGroupCreate,
}

/// Firewall group update.
///
/// For policies, `Some(None)` removes the policy from the group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallGroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_firewall_policy_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_firewall_policy_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallGroupUpdateRoot {
    pub firewall_group: FirewallGroupUpdate,
}

query_filter! {
    #[doc = "Available filters for firewall group list."]
    enum FirewallGroupFilter {
        #[doc = "Filter by the administrative state."]
        AdminStateUp(bool) = "admin_state_up",
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Filter by the egress policy."]
        EgressFirewallPolicy(FirewallPolicyRef) = "egress_firewall_policy_id",
        #[doc = "Filter by the ingress policy."]
        IngressFirewallPolicy(FirewallPolicyRef) = "ingress_firewall_policy_id",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by the shared flag."]
        Shared(bool) = "shared",
        #[doc = "Filter by status."]
        Status(FirewallGroupStatus) = "status"
    }
}

protocol_enum! {
    #[doc = "Authentication algorithm of a VPN policy."]
    enum AuthAlgorithm = Unknown {
        AesCmac = "aes-cmac",
        AesXcbc = "aes-xcbc",
        Sha1 = "sha1",
        Sha256 = "sha256",
        Sha384 = "sha384",
        Sha512 = "sha512",
        Unknown = "unknown"
    }
}

protocol_enum! {
    #[doc = "Encryption algorithm of a VPN policy."]
    enum EncryptionAlgorithm = Unknown {
        TripleDes = "3des",
        Aes128 = "aes-128",
        Aes192 = "aes-192",
        Aes256 = "aes-256",
        Aes128Ctr = "aes-128-ctr",
        Aes192Ctr = "aes-192-ctr",
        Aes256Ctr = "aes-256-ctr",
        Aes128Ccm8 = "aes-128-ccm-8",
        Aes128Gcm16 = "aes-128-gcm-16",
        Aes256Gcm16 = "aes-256-gcm-16",
        Unknown = "unknown"
    }
}

protocol_enum! {
    #[doc = "Perfect forward secrecy group."]
    enum Pfs = Unknown {
        Group2 = "group2",
        Group5 = "group5",
        Group14 = "group14",
        Group15 = "group15",
        Group16 = "group16",
        Group19 = "group19",
        Group20 = "group20",
        Group21 = "group21",
        Unknown = "unknown"
    }
}

protocol_enum! {
    #[doc = "Unit of a VPN lifetime."]
    enum LifetimeUnits {
        Kilobytes = "kilobytes",
        Seconds = "seconds"
    }
}

/// Lifetime of a security association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Lifetime {
    /// Lifetime units.
    pub units: LifetimeUnits,
    /// Lifetime value.
    pub value: u32,
}

impl Lifetime {
    /// Lifetime in seconds.
    pub fn seconds(value: u32) -> Lifetime {
        Lifetime {
            units: LifetimeUnits::Seconds,
            value,
        }
    }
}

protocol_enum! {
    #[doc = "IKE protocol version."]
    enum IkeVersion {
        V1 = "v1",
        V2 = "v2"
    }
}

protocol_enum! {
    #[doc = "IKE phase 1 negotiation mode."]
    enum Phase1NegotiationMode {
        Aggressive = "aggressive",
        Main = "main"
    }
}

protocol_enum! {
    #[doc = "IPsec transform protocol."]
    enum TransformProtocol {
        Ah = "ah",
        AhEsp = "ah-esp",
        Esp = "esp"
    }
}

protocol_enum! {
    #[doc = "IPsec encapsulation mode."]
    enum EncapsulationMode {
        Transport = "transport",
        Tunnel = "tunnel"
    }
}

/// An IKE policy.
#[derive(Debug, Clone, Deserialize)]
pub struct IkePolicy {
    pub auth_algorithm: AuthAlgorithm,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub encryption_algorithm: EncryptionAlgorithm,
    pub id: String,
    pub ike_version: IkeVersion,
    pub lifetime: Lifetime,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    pub pfs: Pfs,
    pub phase1_negotiation_mode: Phase1NegotiationMode,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IkePolicyRoot {
    pub ikepolicy: IkePolicy,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IkePolicyCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_algorithm: Option<AuthAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<EncryptionAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ike_version: Option<IkeVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Lifetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfs: Option<Pfs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase1_negotiation_mode: Option<Phase1NegotiationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IkePolicyCreateRoot {
    pub ikepolicy: IkePolicyCreate,
}

/// IKE policy update, only the modified fields are set.
pub type IkePolicyUpdate = IkePolicyCreate;

#[derive(Debug, Clone, Serialize)]
pub struct IkePolicyUpdateRoot {
    pub ikepolicy: IkePolicyUpdate,
}

/// An IPsec policy.
#[derive(Debug, Clone, Deserialize)]
pub struct IpsecPolicy {
    pub auth_algorithm: AuthAlgorithm,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub encapsulation_mode: EncapsulationMode,
    pub encryption_algorithm: EncryptionAlgorithm,
    pub id: String,
    pub lifetime: Lifetime,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    pub pfs: Pfs,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    pub transform_protocol: TransformProtocol,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpsecPolicyRoot {
    pub ipsecpolicy: IpsecPolicy,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IpsecPolicyCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_algorithm: Option<AuthAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encapsulation_mode: Option<EncapsulationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<EncryptionAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Lifetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfs: Option<Pfs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_protocol: Option<TransformProtocol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IpsecPolicyCreateRoot {
    pub ipsecpolicy: IpsecPolicyCreate,
}

/// IPsec policy update, only the modified fields are set.
pub type IpsecPolicyUpdate = IpsecPolicyCreate;

#[derive(Debug, Clone, Serialize)]
pub struct IpsecPolicyUpdateRoot {
    pub ipsecpolicy: IpsecPolicyUpdate,
}

query_filter! {
    #[doc = "Available filters for VPN policy lists."]
    enum VpnPolicyFilter {
        #[doc = "Filter by authentication algorithm."]
        AuthAlgorithm(AuthAlgorithm) = "auth_algorithm",
        #[doc = "Filter by encryption algorithm."]
        EncryptionAlgorithm(EncryptionAlgorithm) = "encryption_algorithm",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by PFS group."]
        Pfs(Pfs) = "pfs",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id"
    }
}

protocol_enum! {
    #[doc = "Possible IPsec site connection statuses."]
    enum SiteConnectionStatus = Unknown {
        Active = "ACTIVE",
        Build = "BUILD",
        Down = "DOWN",
        Error = "ERROR",
        PendingCreate = "PENDING_CREATE",
        PendingDelete = "PENDING_DELETE",
        PendingUpdate = "PENDING_UPDATE",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Which side initiates an IPsec site connection."]
    enum Initiator {
        BiDirectional = "bi-directional",
        ResponseOnly = "response-only"
    }
}

protocol_enum! {
    #[doc = "Action on a dead peer."]
    enum DpdAction {
        Clear = "clear",
        Disabled = "disabled",
        Hold = "hold",
        Restart = "restart",
        RestartByPeer = "restart-by-peer"
    }
}

/// Dead peer detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeadPeerDetection {
    /// Action on a dead peer.
    pub action: DpdAction,
    /// Interval between checks in seconds.
    pub interval: u32,
    /// Timeout in seconds after which the peer is considered dead.
    pub timeout: u32,
}

/// An IPsec site connection.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConnection {
    pub admin_state_up: bool,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub dpd: Option<DeadPeerDetection>,
    pub id: String,
    pub ikepolicy_id: String,
    pub initiator: Initiator,
    pub ipsecpolicy_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub local_ep_group_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub local_id: Option<String>,
    pub mtu: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    pub peer_address: String,
    #[serde(default)]
    pub peer_cidrs: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub peer_ep_group_id: Option<String>,
    pub peer_id: String,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    pub psk: String,
    #[serde(default)]
    pub route_mode: Option<String>,
    #[serde(default)]
    pub status: SiteConnectionStatus,
    pub vpnservice_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConnectionRoot {
    pub ipsec_site_connection: SiteConnection,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteConnectionCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpd: Option<DeadPeerDetection>,
    pub ikepolicy_id: IkePolicyRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Initiator>,
    pub ipsecpolicy_id: IpsecPolicyRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ep_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub peer_cidrs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_ep_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psk: Option<String>,
    pub vpnservice_id: VpnServiceRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteConnectionCreateRoot {
    pub ipsec_site_connection: SiteConnectionCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteConnectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpd: Option<DeadPeerDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Initiator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ep_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_ep_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psk: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteConnectionUpdateRoot {
    pub ipsec_site_connection: SiteConnectionUpdate,
}

query_filter! {
    #[doc = "Available filters for IPsec site connection list."]
    enum SiteConnectionFilter {
        #[doc = "Filter by the administrative state."]
        AdminStateUp(bool) = "admin_state_up",
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Filter by IKE policy."]
        IkePolicy(IkePolicyRef) = "ikepolicy_id",
        #[doc = "Filter by initiator."]
        Initiator(Initiator) = "initiator",
        #[doc = "Filter by IPsec policy."]
        IpsecPolicy(IpsecPolicyRef) = "ipsecpolicy_id",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by peer address."]
        PeerAddress(String) = "peer_address",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by status."]
        Status(SiteConnectionStatus) = "status",
        #[doc = "Filter by VPN service."]
        VpnService(VpnServiceRef) = "vpnservice_id"
    }
}
