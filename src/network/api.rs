// Copyright 2023 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Foundation bits exposing the Network API.

use super::protocol::*;
use crate::common::{NextLink, Pager, Query, QueryItem};
use crate::services::{NetworkService, NETWORK};
use crate::{Result, Session};

fn list_request<T: QueryItem>(
    session: &Session,
    path: &[&str],
    query: &Query<T>,
    items_key: &str,
    paginate: bool,
) -> Pager<NetworkService> {
    let pager = Pager::new(session.get(NETWORK, path).query(query), items_key);
    if paginate {
        pager.linked(NextLink::Links(format!("{}_links", items_key)))
    } else {
        pager
    }
}

/// Create a floating IP.
pub async fn create_floating_ip(session: &Session, request: FloatingIpCreate) -> Result<FloatingIp> {
    debug!("Creating a new floating IP with {:?}", request);
    let body = FloatingIpCreateRoot {
        floatingip: request,
    };
    let root: FloatingIpRoot = session
        .post(NETWORK, &["floatingips"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created floating IP {:?}", root.floatingip);
    Ok(root.floatingip)
}

/// Delete a floating IP.
pub async fn delete_floating_ip<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting floating IP {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["floatingips", id.as_ref()])
        .send()
        .await?;
    debug!("Floating IP {} was deleted", id.as_ref());
    Ok(())
}

/// Get a floating IP.
pub async fn get_floating_ip<S: AsRef<str>>(session: &Session, id: S) -> Result<FloatingIp> {
    trace!("Get floating IP by ID {}", id.as_ref());
    let root: FloatingIpRoot = session
        .get(NETWORK, &["floatingips", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.floatingip);
    Ok(root.floatingip)
}

/// List floating IPs.
pub fn list_floating_ips(
    session: &Session,
    query: &Query<FloatingIpFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing floating IPs with {:?}", query);
    list_request(session, &["floatingips"], query, "floatingips", paginate)
}

/// Update a floating IP.
pub async fn update_floating_ip<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: FloatingIpUpdate,
) -> Result<FloatingIp> {
    debug!("Updating floating IP {} with {:?}", id.as_ref(), update);
    let body = FloatingIpUpdateRoot { floatingip: update };
    let root: FloatingIpRoot = session
        .put(NETWORK, &["floatingips", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated floating IP {:?}", root.floatingip);
    Ok(root.floatingip)
}

/// Create a network segment range.
pub async fn create_segment_range(
    session: &Session,
    request: SegmentRangeCreate,
) -> Result<SegmentRange> {
    debug!("Creating a new network segment range with {:?}", request);
    let body = SegmentRangeCreateRoot {
        network_segment_range: request,
    };
    let root: SegmentRangeRoot = session
        .post(NETWORK, &["network_segment_ranges"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created network segment range {:?}", root.network_segment_range);
    Ok(root.network_segment_range)
}

/// Delete a network segment range.
pub async fn delete_segment_range<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting network segment range {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["network_segment_ranges", id.as_ref()])
        .send()
        .await?;
    debug!("Network segment range {} was deleted", id.as_ref());
    Ok(())
}

/// Get a network segment range.
pub async fn get_segment_range<S: AsRef<str>>(session: &Session, id: S) -> Result<SegmentRange> {
    trace!("Get network segment range by ID {}", id.as_ref());
    let root: SegmentRangeRoot = session
        .get(NETWORK, &["network_segment_ranges", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.network_segment_range);
    Ok(root.network_segment_range)
}

/// List network segment ranges.
pub fn list_segment_ranges(
    session: &Session,
    query: &Query<SegmentRangeFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing network segment ranges with {:?}", query);
    list_request(
        session,
        &["network_segment_ranges"],
        query,
        "network_segment_ranges",
        paginate,
    )
}

/// Update a network segment range.
pub async fn update_segment_range<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: SegmentRangeUpdate,
) -> Result<SegmentRange> {
    debug!("Updating network segment range {} with {:?}", id.as_ref(), update);
    let body = SegmentRangeUpdateRoot {
        network_segment_range: update,
    };
    let root: SegmentRangeRoot = session
        .put(NETWORK, &["network_segment_ranges", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated network segment range {:?}", root.network_segment_range);
    Ok(root.network_segment_range)
}

/// Create a firewall policy.
pub async fn create_firewall_policy(
    session: &Session,
    request: FirewallPolicyCreate,
) -> Result<FirewallPolicy> {
    debug!("Creating a new firewall policy with {:?}", request);
    let body = FirewallPolicyCreateRoot {
        firewall_policy: request,
    };
    let root: FirewallPolicyRoot = session
        .post(NETWORK, &["fwaas", "firewall_policies"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created firewall policy {:?}", root.firewall_policy);
    Ok(root.firewall_policy)
}

/// Delete a firewall policy.
pub async fn delete_firewall_policy<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting firewall policy {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["fwaas", "firewall_policies", id.as_ref()])
        .send()
        .await?;
    debug!("Firewall policy {} was deleted", id.as_ref());
    Ok(())
}

/// Get a firewall policy.
pub async fn get_firewall_policy<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<FirewallPolicy> {
    trace!("Get firewall policy by ID {}", id.as_ref());
    let root: FirewallPolicyRoot = session
        .get(NETWORK, &["fwaas", "firewall_policies", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.firewall_policy);
    Ok(root.firewall_policy)
}

/// List firewall policies.
pub fn list_firewall_policies(
    session: &Session,
    query: &Query<FirewallPolicyFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing firewall policies with {:?}", query);
    list_request(
        session,
        &["fwaas", "firewall_policies"],
        query,
        "firewall_policies",
        paginate,
    )
}

/// Update a firewall policy.
pub async fn update_firewall_policy<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: FirewallPolicyUpdate,
) -> Result<FirewallPolicy> {
    debug!("Updating firewall policy {} with {:?}", id.as_ref(), update);
    let body = FirewallPolicyUpdateRoot {
        firewall_policy: update,
    };
    let root: FirewallPolicyRoot = session
        .put(NETWORK, &["fwaas", "firewall_policies", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated firewall policy {:?}", root.firewall_policy);
    Ok(root.firewall_policy)
}

/// Insert a rule into a firewall policy.
///
/// The response is not wrapped into a root object.
pub async fn insert_firewall_rule<S: AsRef<str>>(
    session: &Session,
    id: S,
    request: InsertRule,
) -> Result<FirewallPolicy> {
    debug!("Inserting {:?} into firewall policy {}", request, id.as_ref());
    let policy: FirewallPolicy = session
        .put(
            NETWORK,
            &["fwaas", "firewall_policies", id.as_ref(), "insert_rule"],
        )
        .json(&request)
        .fetch()
        .await?;
    debug!("Firewall policy {} now has rules {:?}", id.as_ref(), policy.firewall_rules);
    Ok(policy)
}

/// Remove a rule from a firewall policy.
pub async fn remove_firewall_rule<S: AsRef<str>>(
    session: &Session,
    id: S,
    request: RemoveRule,
) -> Result<FirewallPolicy> {
    debug!("Removing {:?} from firewall policy {}", request, id.as_ref());
    let policy: FirewallPolicy = session
        .put(
            NETWORK,
            &["fwaas", "firewall_policies", id.as_ref(), "remove_rule"],
        )
        .json(&request)
        .fetch()
        .await?;
    debug!("Firewall policy {} now has rules {:?}", id.as_ref(), policy.firewall_rules);
    Ok(policy)
}

/// Create a firewall group.
pub async fn create_firewall_group(
    session: &Session,
    request: FirewallGroupCreate,
) -> Result<FirewallGroup> {
    debug!("Creating a new firewall group with {:?}", request);
    let body = FirewallGroupCreateRoot {
        firewall_group: request,
    };
    let root: FirewallGroupRoot = session
        .post(NETWORK, &["fwaas", "firewall_groups"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created firewall group {:?}", root.firewall_group);
    Ok(root.firewall_group)
}

/// Delete a firewall group.
pub async fn delete_firewall_group<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting firewall group {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["fwaas", "firewall_groups", id.as_ref()])
        .send()
        .await?;
    debug!("Firewall group {} was deleted", id.as_ref());
    Ok(())
}

/// Get a firewall group.
pub async fn get_firewall_group<S: AsRef<str>>(session: &Session, id: S) -> Result<FirewallGroup> {
    trace!("Get firewall group by ID {}", id.as_ref());
    let root: FirewallGroupRoot = session
        .get(NETWORK, &["fwaas", "firewall_groups", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.firewall_group);
    Ok(root.firewall_group)
}

/// List firewall groups.
pub fn list_firewall_groups(
    session: &Session,
    query: &Query<FirewallGroupFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing firewall groups with {:?}", query);
    list_request(
        session,
        &["fwaas", "firewall_groups"],
        query,
        "firewall_groups",
        paginate,
    )
}

/// Update a firewall group.
///
/// Policies set to `Some(None)` are removed from the group.
pub async fn update_firewall_group<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: FirewallGroupUpdate,
) -> Result<FirewallGroup> {
    debug!("Updating firewall group {} with {:?}", id.as_ref(), update);
    let body = FirewallGroupUpdateRoot {
        firewall_group: update,
    };
    let root: FirewallGroupRoot = session
        .put(NETWORK, &["fwaas", "firewall_groups", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated firewall group {:?}", root.firewall_group);
    Ok(root.firewall_group)
}

/// Create a firewall rule.
pub async fn create_firewall_rule(
    session: &Session,
    request: FirewallRuleCreate,
) -> Result<FirewallRule> {
    debug!("Creating a new firewall rule with {:?}", request);
    let body = FirewallRuleCreateRoot {
        firewall_rule: request,
    };
    let root: FirewallRuleRoot = session
        .post(NETWORK, &["fwaas", "firewall_rules"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created firewall rule {:?}", root.firewall_rule);
    Ok(root.firewall_rule)
}

/// Delete a firewall rule.
pub async fn delete_firewall_rule<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting firewall rule {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["fwaas", "firewall_rules", id.as_ref()])
        .send()
        .await?;
    debug!("Firewall rule {} was deleted", id.as_ref());
    Ok(())
}

/// Get a firewall rule.
pub async fn get_firewall_rule<S: AsRef<str>>(session: &Session, id: S) -> Result<FirewallRule> {
    trace!("Get firewall rule by ID {}", id.as_ref());
    let root: FirewallRuleRoot = session
        .get(NETWORK, &["fwaas", "firewall_rules", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.firewall_rule);
    Ok(root.firewall_rule)
}

/// List firewall rules.
pub fn list_firewall_rules(
    session: &Session,
    query: &Query<FirewallRuleFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing firewall rules with {:?}", query);
    list_request(
        session,
        &["fwaas", "firewall_rules"],
        query,
        "firewall_rules",
        paginate,
    )
}

/// Update a firewall rule.
pub async fn update_firewall_rule<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: FirewallRuleUpdate,
) -> Result<FirewallRule> {
    debug!("Updating firewall rule {} with {:?}", id.as_ref(), update);
    let body = FirewallRuleUpdateRoot {
        firewall_rule: update,
    };
    let root: FirewallRuleRoot = session
        .put(NETWORK, &["fwaas", "firewall_rules", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated firewall rule {:?}", root.firewall_rule);
    Ok(root.firewall_rule)
}

/// Create an IKE policy.
pub async fn create_ike_policy(session: &Session, request: IkePolicyCreate) -> Result<IkePolicy> {
    debug!("Creating a new IKE policy with {:?}", request);
    let body = IkePolicyCreateRoot { ikepolicy: request };
    let root: IkePolicyRoot = session
        .post(NETWORK, &["vpn", "ikepolicies"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created IKE policy {:?}", root.ikepolicy);
    Ok(root.ikepolicy)
}

/// Delete an IKE policy.
pub async fn delete_ike_policy<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting IKE policy {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["vpn", "ikepolicies", id.as_ref()])
        .send()
        .await?;
    debug!("IKE policy {} was deleted", id.as_ref());
    Ok(())
}

/// Get an IKE policy.
pub async fn get_ike_policy<S: AsRef<str>>(session: &Session, id: S) -> Result<IkePolicy> {
    trace!("Get IKE policy by ID {}", id.as_ref());
    let root: IkePolicyRoot = session
        .get(NETWORK, &["vpn", "ikepolicies", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.ikepolicy);
    Ok(root.ikepolicy)
}

/// List IKE policies.
pub fn list_ike_policies(
    session: &Session,
    query: &Query<VpnPolicyFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing IKE policies with {:?}", query);
    list_request(session, &["vpn", "ikepolicies"], query, "ikepolicies", paginate)
}

/// Update an IKE policy.
pub async fn update_ike_policy<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: IkePolicyUpdate,
) -> Result<IkePolicy> {
    debug!("Updating IKE policy {} with {:?}", id.as_ref(), update);
    let body = IkePolicyUpdateRoot { ikepolicy: update };
    let root: IkePolicyRoot = session
        .put(NETWORK, &["vpn", "ikepolicies", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated IKE policy {:?}", root.ikepolicy);
    Ok(root.ikepolicy)
}

/// Create an IPsec policy.
pub async fn create_ipsec_policy(
    session: &Session,
    request: IpsecPolicyCreate,
) -> Result<IpsecPolicy> {
    debug!("Creating a new IPsec policy with {:?}", request);
    let body = IpsecPolicyCreateRoot {
        ipsecpolicy: request,
    };
    let root: IpsecPolicyRoot = session
        .post(NETWORK, &["vpn", "ipsecpolicies"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created IPsec policy {:?}", root.ipsecpolicy);
    Ok(root.ipsecpolicy)
}

/// Delete an IPsec policy.
pub async fn delete_ipsec_policy<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting IPsec policy {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["vpn", "ipsecpolicies", id.as_ref()])
        .send()
        .await?;
    debug!("IPsec policy {} was deleted", id.as_ref());
    Ok(())
}

/// Get an IPsec policy.
pub async fn get_ipsec_policy<S: AsRef<str>>(session: &Session, id: S) -> Result<IpsecPolicy> {
    trace!("Get IPsec policy by ID {}", id.as_ref());
    let root: IpsecPolicyRoot = session
        .get(NETWORK, &["vpn", "ipsecpolicies", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.ipsecpolicy);
    Ok(root.ipsecpolicy)
}

/// List IPsec policies.
pub fn list_ipsec_policies(
    session: &Session,
    query: &Query<VpnPolicyFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing IPsec policies with {:?}", query);
    list_request(
        session,
        &["vpn", "ipsecpolicies"],
        query,
        "ipsecpolicies",
        paginate,
    )
}

/// Update an IPsec policy.
pub async fn update_ipsec_policy<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: IpsecPolicyUpdate,
) -> Result<IpsecPolicy> {
    debug!("Updating IPsec policy {} with {:?}", id.as_ref(), update);
    let body = IpsecPolicyUpdateRoot {
        ipsecpolicy: update,
    };
    let root: IpsecPolicyRoot = session
        .put(NETWORK, &["vpn", "ipsecpolicies", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated IPsec policy {:?}", root.ipsecpolicy);
    Ok(root.ipsecpolicy)
}

/// Create an IPsec site connection.
pub async fn create_site_connection(
    session: &Session,
    request: SiteConnectionCreate,
) -> Result<SiteConnection> {
    debug!("Creating a new IPsec site connection with {:?}", request);
    let body = SiteConnectionCreateRoot {
        ipsec_site_connection: request,
    };
    let root: SiteConnectionRoot = session
        .post(NETWORK, &["vpn", "ipsec-site-connections"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created IPsec site connection {:?}", root.ipsec_site_connection);
    Ok(root.ipsec_site_connection)
}

/// Delete an IPsec site connection.
pub async fn delete_site_connection<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting IPsec site connection {}", id.as_ref());
    let _ = session
        .delete(NETWORK, &["vpn", "ipsec-site-connections", id.as_ref()])
        .send()
        .await?;
    debug!("IPsec site connection {} was deleted", id.as_ref());
    Ok(())
}

/// Get an IPsec site connection.
pub async fn get_site_connection<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<SiteConnection> {
    trace!("Get IPsec site connection by ID {}", id.as_ref());
    let root: SiteConnectionRoot = session
        .get(NETWORK, &["vpn", "ipsec-site-connections", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.ipsec_site_connection);
    Ok(root.ipsec_site_connection)
}

/// List IPsec site connections.
pub fn list_site_connections(
    session: &Session,
    query: &Query<SiteConnectionFilter>,
    paginate: bool,
) -> Pager<NetworkService> {
    trace!("Listing IPsec site connections with {:?}", query);
    list_request(
        session,
        &["vpn", "ipsec-site-connections"],
        query,
        "ipsec_site_connections",
        paginate,
    )
}

/// Update an IPsec site connection.
pub async fn update_site_connection<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: SiteConnectionUpdate,
) -> Result<SiteConnection> {
    debug!("Updating IPsec site connection {} with {:?}", id.as_ref(), update);
    let body = SiteConnectionUpdateRoot {
        ipsec_site_connection: update,
    };
    let root: SiteConnectionRoot = session
        .put(NETWORK, &["vpn", "ipsec-site-connections", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated IPsec site connection {:?}", root.ipsec_site_connection);
    Ok(root.ipsec_site_connection)
}
