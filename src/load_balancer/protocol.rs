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

//! JSON structures and protocol bits for the Load Balancer API.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net;

use chrono::{DateTime, FixedOffset};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::common::protocol::deser_optional_datetime;
use crate::common::{
    ListenerRef, LoadBalancerRef, NetworkRef, PoolRef, PortRef, ProjectRef, SubnetRef,
};
use crate::utils::{empty_as_none, some_truth, SortDir};

protocol_enum! {
    #[doc = "Provisioning status of a load balancer object."]
    enum ProvisioningStatus = Unknown {
        Active = "ACTIVE",
        Deleted = "DELETED",
        Error = "ERROR",
        PendingCreate = "PENDING_CREATE",
        PendingUpdate = "PENDING_UPDATE",
        PendingDelete = "PENDING_DELETE",
        Unknown = "UNKNOWN"
    }
}

impl ProvisioningStatus {
    /// Whether an operation is in progress.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ProvisioningStatus::PendingCreate
                | ProvisioningStatus::PendingUpdate
                | ProvisioningStatus::PendingDelete
        )
    }
}

protocol_enum! {
    #[doc = "Operating status of a load balancer object."]
    enum OperatingStatus = Unknown {
        Online = "ONLINE",
        Draining = "DRAINING",
        Offline = "OFFLINE",
        Degraded = "DEGRADED",
        Error = "ERROR",
        NoMonitor = "NO_MONITOR",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Protocol of a listener."]
    enum ListenerProtocol = Unknown {
        Http = "HTTP",
        Https = "HTTPS",
        Prometheus = "PROMETHEUS",
        Sctp = "SCTP",
        Tcp = "TCP",
        TerminatedHttps = "TERMINATED_HTTPS",
        Udp = "UDP",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Protocol of a pool."]
    enum PoolProtocol = Unknown {
        Http = "HTTP",
        Https = "HTTPS",
        Proxy = "PROXY",
        ProxyV2 = "PROXYV2",
        Sctp = "SCTP",
        Tcp = "TCP",
        Udp = "UDP",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Load balancing algorithm of a pool."]
    enum LbAlgorithm = Unknown {
        LeastConnections = "LEAST_CONNECTIONS",
        RoundRobin = "ROUND_ROBIN",
        SourceIp = "SOURCE_IP",
        SourceIpPort = "SOURCE_IP_PORT",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Session persistence type."]
    enum SessionPersistenceType {
        AppCookie = "APP_COOKIE",
        HttpCookie = "HTTP_COOKIE",
        SourceIp = "SOURCE_IP"
    }
}

/// Session persistence of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionPersistence {
    /// Persistence type.
    #[serde(rename = "type")]
    pub persistence_type: SessionPersistenceType,
    /// Cookie name for `APP_COOKIE` persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_name: Option<String>,
}

impl SessionPersistence {
    /// Create a session persistence of the given type.
    pub fn new(persistence_type: SessionPersistenceType) -> SessionPersistence {
        SessionPersistence {
            persistence_type,
            cookie_name: None,
        }
    }
}

/// A reference to a related object.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRef {
    pub id: String,
}

/// A load balancer.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancer {
    #[serde(default = "some_truth")]
    pub admin_state_up: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub availability_zone: Option<String>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub flavor_id: Option<String>,
    pub id: String,
    #[serde(default)]
    pub listeners: Vec<IdRef>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub operating_status: OperatingStatus,
    #[serde(default)]
    pub pools: Vec<IdRef>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub vip_address: Option<net::IpAddr>,
    #[serde(default)]
    pub vip_network_id: Option<String>,
    #[serde(default)]
    pub vip_port_id: Option<String>,
    #[serde(default)]
    pub vip_qos_policy_id: Option<String>,
    #[serde(default)]
    pub vip_subnet_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerRoot {
    pub loadbalancer: LoadBalancer,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_address: Option<net::IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_network_id: Option<NetworkRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_port_id: Option<PortRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_qos_policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_subnet_id: Option<SubnetRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerCreateRoot {
    pub loadbalancer: LoadBalancerCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_qos_policy_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerUpdateRoot {
    pub loadbalancer: LoadBalancerUpdate,
}

/// Load balancer statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LoadBalancerStats {
    /// Currently active connections.
    #[serde(default)]
    pub active_connections: u64,
    /// Total bytes received.
    #[serde(default)]
    pub bytes_in: u64,
    /// Total bytes sent.
    #[serde(default)]
    pub bytes_out: u64,
    /// Total requests that were unable to be fulfilled.
    #[serde(default)]
    pub request_errors: u64,
    /// Total connections handled.
    #[serde(default)]
    pub total_connections: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerStatsRoot {
    pub stats: LoadBalancerStats,
}

/// Status of a health monitor in a status tree.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthMonitorStatus {
    /// Health monitor ID.
    pub id: String,
    /// Health monitor name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Monitor type (e.g. `HTTP`).
    #[serde(default, rename = "type")]
    pub monitor_type: Option<String>,
    /// Operating status.
    #[serde(default)]
    pub operating_status: OperatingStatus,
    /// Provisioning status.
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
}

/// Status of a member in a status tree.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberStatus {
    /// Member address.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<net::IpAddr>,
    /// Member ID.
    pub id: String,
    /// Member name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Operating status.
    #[serde(default)]
    pub operating_status: OperatingStatus,
    /// Member port.
    #[serde(default)]
    pub protocol_port: Option<u16>,
    /// Provisioning status.
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
}

/// Status of a pool in a status tree.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolStatus {
    /// Health monitor status.
    #[serde(default)]
    pub health_monitor: Option<HealthMonitorStatus>,
    /// Pool ID.
    pub id: String,
    /// Member statuses.
    #[serde(default)]
    pub members: Vec<MemberStatus>,
    /// Pool name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Operating status.
    #[serde(default)]
    pub operating_status: OperatingStatus,
    /// Provisioning status.
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
}

/// Status of a listener in a status tree.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerStatus {
    /// Listener ID.
    pub id: String,
    /// Listener name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Operating status.
    #[serde(default)]
    pub operating_status: OperatingStatus,
    /// Pool statuses.
    #[serde(default)]
    pub pools: Vec<PoolStatus>,
    /// Provisioning status.
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
}

/// Status tree of a load balancer.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerStatusTree {
    /// Load balancer ID.
    pub id: String,
    /// Listener statuses.
    #[serde(default)]
    pub listeners: Vec<ListenerStatus>,
    /// Load balancer name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Operating status.
    #[serde(default)]
    pub operating_status: OperatingStatus,
    /// Provisioning status.
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerStatusTreeWrapper {
    pub loadbalancer: LoadBalancerStatusTree,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerStatusRoot {
    pub statuses: LoadBalancerStatusTreeWrapper,
}

protocol_enum! {
    #[doc = "Available sort keys."]
    enum LoadBalancerSortKey {
        CreatedAt = "created_at",
        Id = "id",
        Name = "name",
        OperatingStatus = "operating_status",
        ProvisioningStatus = "provisioning_status",
        UpdatedAt = "updated_at"
    }
}

query_filter! {
    #[doc = "Available filters for load balancer list."]
    enum LoadBalancerFilter {
        #[doc = "Filter by availability zone."]
        AvailabilityZone(String) = "availability_zone",
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Filter by flavor ID."]
        Flavor(String) = "flavor_id",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by operating status."]
        OperatingStatus(OperatingStatus) = "operating_status",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by provider."]
        Provider(String) = "provider",
        #[doc = "Filter by provisioning status."]
        ProvisioningStatus(ProvisioningStatus) = "provisioning_status",
        #[doc = "Sort key."]
        SortKey(LoadBalancerSortKey) = "sort_key",
        #[doc = "Sort direction."]
        SortDir(SortDir) = "sort_dir",
        #[doc = "Filter by VIP address."]
        VipAddress(net::IpAddr) = "vip_address",
        #[doc = "Filter by VIP network ID."]
        VipNetwork(NetworkRef) = "vip_network_id",
        #[doc = "Filter by VIP port ID."]
        VipPort(PortRef) = "vip_port_id",
        #[doc = "Filter by VIP subnet ID."]
        VipSubnet(SubnetRef) = "vip_subnet_id"
    }
}

/// A listener.
#[derive(Debug, Clone, Deserialize)]
pub struct Listener {
    #[serde(default = "some_truth")]
    pub admin_state_up: bool,
    #[serde(default)]
    pub allowed_cidrs: Option<Vec<IpNet>>,
    #[serde(default)]
    pub connection_limit: Option<i32>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub default_pool_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub id: String,
    #[serde(default)]
    pub insert_headers: HashMap<String, String>,
    #[serde(default)]
    pub loadbalancers: Vec<IdRef>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub operating_status: OperatingStatus,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    pub protocol: ListenerProtocol,
    pub protocol_port: u16,
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub timeout_client_data: Option<u32>,
    #[serde(default)]
    pub timeout_member_connect: Option<u32>,
    #[serde(default)]
    pub timeout_member_data: Option<u32>,
    #[serde(default)]
    pub timeout_tcp_inspect: Option<u32>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenerRoot {
    pub listener: Listener,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenerCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_cidrs: Vec<IpNet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pool_id: Option<PoolRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub insert_headers: HashMap<String, String>,
    pub loadbalancer_id: LoadBalancerRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    pub protocol: ListenerProtocol,
    pub protocol_port: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_client_data: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_connect: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_data: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_tcp_inspect: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenerCreateRoot {
    pub listener: ListenerCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListenerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_cidrs: Option<Vec<IpNet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pool_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_client_data: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_connect: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_data: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_tcp_inspect: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenerUpdateRoot {
    pub listener: ListenerUpdate,
}

query_filter! {
    #[doc = "Available filters for listener list."]
    enum ListenerFilter {
        #[doc = "Filter by default pool ID."]
        DefaultPool(PoolRef) = "default_pool_id",
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Filter by load balancer ID."]
        LoadBalancer(LoadBalancerRef) = "loadbalancer_id",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by operating status."]
        OperatingStatus(OperatingStatus) = "operating_status",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by protocol."]
        Protocol(ListenerProtocol) = "protocol",
        #[doc = "Filter by port."]
        ProtocolPort(u16) = "protocol_port",
        #[doc = "Filter by provisioning status."]
        ProvisioningStatus(ProvisioningStatus) = "provisioning_status"
    }
}

/// A pool.
#[derive(Debug, Clone, Deserialize)]
pub struct Pool {
    #[serde(default = "some_truth")]
    pub admin_state_up: bool,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub healthmonitor_id: Option<String>,
    pub id: String,
    pub lb_algorithm: LbAlgorithm,
    #[serde(default)]
    pub listeners: Vec<IdRef>,
    #[serde(default)]
    pub loadbalancers: Vec<IdRef>,
    #[serde(default)]
    pub members: Vec<IdRef>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub operating_status: OperatingStatus,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    pub protocol: PoolProtocol,
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
    #[serde(default)]
    pub session_persistence: Option<SessionPersistence>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolRoot {
    pub pool: Pool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub lb_algorithm: LbAlgorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listener_id: Option<ListenerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loadbalancer_id: Option<LoadBalancerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    pub protocol: PoolProtocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_persistence: Option<SessionPersistence>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolCreateRoot {
    pub pool: PoolCreate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lb_algorithm: Option<LbAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_persistence: Option<Option<SessionPersistence>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolUpdateRoot {
    pub pool: PoolUpdate,
}

query_filter! {
    #[doc = "Available filters for pool list."]
    enum PoolFilter {
        #[doc = "Filter by description."]
        Description(String) = "description",
        #[doc = "Filter by load balancing algorithm."]
        LbAlgorithm(LbAlgorithm) = "lb_algorithm",
        #[doc = "Filter by load balancer ID."]
        LoadBalancer(LoadBalancerRef) = "loadbalancer_id",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by operating status."]
        OperatingStatus(OperatingStatus) = "operating_status",
        #[doc = "Filter by project ID."]
        Project(ProjectRef) = "project_id",
        #[doc = "Filter by protocol."]
        Protocol(PoolProtocol) = "protocol",
        #[doc = "Filter by provisioning status."]
        ProvisioningStatus(ProvisioningStatus) = "provisioning_status"
    }
}

/// A pool member.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub address: net::IpAddr,
    #[serde(default = "some_truth")]
    pub admin_state_up: bool,
    #[serde(default)]
    pub backup: bool,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub created_at: Option<DateTime<FixedOffset>>,
    pub id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub monitor_address: Option<net::IpAddr>,
    #[serde(default)]
    pub monitor_port: Option<u16>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub operating_status: OperatingStatus,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    pub protocol_port: u16,
    #[serde(default)]
    pub provisioning_status: ProvisioningStatus,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub weight: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberRoot {
    pub member: Member,
}

/// Member definition used for creation and batch updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSpec {
    /// IP address of the member.
    pub address: net::IpAddr,
    /// Whether the member is administratively up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Whether the member is a backup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
    /// Alternative address for health monitoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_address: Option<net::IpAddr>,
    /// Alternative port for health monitoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_port: Option<u16>,
    /// Member name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owning project (admin only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectRef>,
    /// Port on which the member listens.
    pub protocol_port: u16,
    /// Subnet on which the member address lives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<SubnetRef>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Relative weight (0 to 256).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
}

impl MemberSpec {
    /// Member with the given address and port.
    pub fn new(address: net::IpAddr, protocol_port: u16) -> MemberSpec {
        MemberSpec {
            address,
            admin_state_up: None,
            backup: None,
            monitor_address: None,
            monitor_port: None,
            name: None,
            project_id: None,
            protocol_port,
            subnet_id: None,
            tags: Vec::new(),
            weight: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberCreateRoot {
    pub member: MemberSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembersBatchRoot {
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_address: Option<net::IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberUpdateRoot {
    pub member: MemberUpdate,
}

query_filter! {
    #[doc = "Available filters for pool member list."]
    enum MemberFilter {
        #[doc = "Filter by address."]
        Address(net::IpAddr) = "address",
        #[doc = "Filter by the backup flag."]
        Backup(bool) = "backup",
        #[doc = "Marker (ID of the last seen item)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit",
        #[doc = "Filter by name."]
        Name(String) = "name",
        #[doc = "Filter by operating status."]
        OperatingStatus(OperatingStatus) = "operating_status",
        #[doc = "Filter by port."]
        ProtocolPort(u16) = "protocol_port",
        #[doc = "Filter by subnet ID."]
        Subnet(SubnetRef) = "subnet_id",
        #[doc = "Filter by weight."]
        Weight(u16) = "weight"
    }
}

#[cfg(test)]
mod test {
    use chrono::Datelike;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_load_balancer_naive_timestamps() {
        let lb: LoadBalancer = serde_json::from_value(json!({
            "description": "My favorite load balancer",
            "admin_state_up": true,
            "project_id": "e3cd678b11784734bc366148aa37580e",
            "provisioning_status": "PENDING_CREATE",
            "flavor_id": "",
            "vip_subnet_id": "d4af86e1-0051-488c-b7a0-527f97490c9a",
            "listeners": [{"id": "95de30ec-67f4-437b-b3f3-22c5d9ef9828"}],
            "vip_address": "203.0.113.50",
            "vip_network_id": "d0d217df-3958-4fbf-a3c2-8dad2908c709",
            "vip_port_id": "b4ca07d1-a31e-43e2-891a-7d14f419f342",
            "provider": "octavia",
            "created_at": "2017-02-28T00:41:44",
            "updated_at": "2017-02-28T00:43:30",
            "id": "607226db-27ef-4d41-ae89-f2a800e9c2db",
            "operating_status": "OFFLINE",
            "name": "best_load_balancer",
            "tags": ["test_tag"]
        }))
        .unwrap();
        assert_eq!(lb.created_at.unwrap().year(), 2017);
        assert_eq!(lb.updated_at.unwrap().offset().local_minus_utc(), 0);
        assert_eq!(lb.provisioning_status, ProvisioningStatus::PendingCreate);
        assert!(lb.provisioning_status.is_pending());
        assert_eq!(lb.operating_status, OperatingStatus::Offline);
        assert!(lb.flavor_id.is_none());
        assert_eq!(lb.listeners.len(), 1);
    }

    #[test]
    fn test_unknown_statuses() {
        let member: Member = serde_json::from_value(json!({
            "id": "m1",
            "address": "192.0.2.16",
            "protocol_port": 80,
            "operating_status": "SOMETHING_NEW",
            "provisioning_status": "ACTIVE",
            "monitor_address": null
        }))
        .unwrap();
        assert_eq!(member.operating_status, OperatingStatus::Unknown);
        assert!(!member.provisioning_status.is_pending());
        assert!(member.admin_state_up);
    }

    #[test]
    fn test_listener_allowed_cidrs() {
        let listener: Listener = serde_json::from_value(json!({
            "id": "l1",
            "protocol": "TERMINATED_HTTPS",
            "protocol_port": 443,
            "allowed_cidrs": ["192.0.2.0/24", "2001:db8::/64"],
            "connection_limit": -1
        }))
        .unwrap();
        assert_eq!(listener.protocol, ListenerProtocol::TerminatedHttps);
        let cidrs = listener.allowed_cidrs.unwrap();
        assert_eq!(cidrs[0], "192.0.2.0/24".parse::<IpNet>().unwrap());
        assert_eq!(listener.connection_limit, Some(-1));
    }

    #[test]
    fn test_status_tree() {
        let root: LoadBalancerStatusRoot = serde_json::from_value(json!({
            "statuses": {
                "loadbalancer": {
                    "id": "lb",
                    "name": "lb1",
                    "operating_status": "ONLINE",
                    "provisioning_status": "ACTIVE",
                    "listeners": [{
                        "id": "l1",
                        "name": "listener1",
                        "operating_status": "ONLINE",
                        "provisioning_status": "ACTIVE",
                        "pools": [{
                            "id": "p1",
                            "name": "pool1",
                            "operating_status": "DEGRADED",
                            "provisioning_status": "ACTIVE",
                            "health_monitor": {
                                "id": "hm1",
                                "name": "",
                                "type": "HTTP",
                                "provisioning_status": "ACTIVE"
                            },
                            "members": [{
                                "id": "m1",
                                "name": "",
                                "address": "192.0.2.16",
                                "protocol_port": 80,
                                "operating_status": "ERROR",
                                "provisioning_status": "ACTIVE"
                            }]
                        }]
                    }]
                }
            }
        }))
        .unwrap();
        let tree = root.statuses.loadbalancer;
        let pool = &tree.listeners[0].pools[0];
        assert_eq!(pool.operating_status, OperatingStatus::Degraded);
        assert_eq!(pool.members[0].operating_status, OperatingStatus::Error);
        assert_eq!(
            pool.health_monitor.as_ref().unwrap().monitor_type.as_deref(),
            Some("HTTP")
        );
    }

    #[test]
    fn test_member_spec_body() {
        let spec = MemberSpec {
            weight: Some(10),
            ..MemberSpec::new("192.0.2.16".parse().unwrap(), 8080)
        };
        assert_eq!(
            serde_json::to_value(&MembersBatchRoot {
                members: vec![spec]
            })
            .unwrap(),
            json!({"members": [{"address": "192.0.2.16", "protocol_port": 8080, "weight": 10}]})
        );
    }
}
