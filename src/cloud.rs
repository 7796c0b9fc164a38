// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Cloud API.

#[cfg(feature = "load-balancer")]
use std::net;

use osauth::{AuthType, InterfaceType, Session};

#[cfg(feature = "baremetal")]
use crate::baremetal::{NewNode, Node, NodeQuery, NodeSummary};
#[cfg(feature = "introspection")]
use crate::introspection::{Introspection, IntrospectionQuery, NewIntrospection};
#[cfg(feature = "load-balancer")]
use crate::load_balancer::{
    LbAlgorithm, Listener, ListenerProtocol, ListenerQuery, LoadBalancer, LoadBalancerQuery,
    Member, MemberQuery, NewListener, NewLoadBalancer, NewMember, NewPool, Pool, PoolProtocol,
    PoolQuery,
};
#[cfg(feature = "network")]
use crate::network::{
    FirewallGroup, FirewallGroupQuery, FirewallPolicy, FirewallPolicyQuery, FirewallRule,
    FirewallRuleQuery, FloatingIp, FloatingIpQuery, IkePolicy, IkePolicyQuery, IpsecPolicy,
    IpsecPolicyQuery, NetworkType, NewFirewallGroup, NewFirewallPolicy, NewFirewallRule,
    NewFloatingIp, NewIkePolicy, NewIpsecPolicy, NewSegmentRange, NewSiteConnection,
    SegmentRange, SegmentRangeQuery, SiteConnection, SiteConnectionQuery,
};
#[cfg(feature = "orchestration")]
use crate::orchestration::{NewStack, Stack, StackQuery, StackSummary};
#[cfg(feature = "load-balancer")]
use crate::common::{LoadBalancerRef, PoolRef};
#[cfg(feature = "network")]
use crate::common::{IkePolicyRef, IpsecPolicyRef, NetworkRef, VpnServiceRef};
#[cfg(feature = "introspection")]
use crate::common::NodeRef;
use crate::Result;

/// OpenStack cloud API.
///
/// Provides high-level API for working with OpenStack clouds.
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Session,
}

impl Cloud {
    /// Create a new cloud object with a given authentication plugin.
    ///
    /// See [`auth` module](auth/index.html) for details on how to authenticate
    /// against OpenStack clouds.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// async fn cloud() -> openstack_bindings::Result<openstack_bindings::Cloud> {
    ///     let auth = openstack_bindings::auth::NoAuth::new("http://ironic.local:6385")?;
    ///     openstack_bindings::Cloud::new(auth).await
    /// }
    /// ```
    ///
    /// # See Also
    ///
    /// * [from_config](#method.from_config) to create a Cloud from clouds.yaml
    /// * [from_env](#method.from_env) to create a Cloud from environment variables
    pub async fn new<Auth: AuthType + 'static>(auth_type: Auth) -> Result<Cloud> {
        Ok(Cloud {
            session: Session::new(auth_type).await?,
        })
    }

    /// Create a new cloud object from an existing session.
    #[inline]
    pub fn from_session(session: Session) -> Cloud {
        Cloud { session }
    }

    /// Create a new cloud object from a configuration file
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn cloud_from_config() -> openstack_bindings::Result<()> {
    /// let os = openstack_bindings::Cloud::from_config("cloud-1").await?;
    /// # Ok(()) }
    /// ```
    pub async fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Cloud> {
        Ok(Cloud {
            session: Session::from_config(cloud_name).await?,
        })
    }

    /// Create a new cloud object from environment variables.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn cloud_from_env() -> openstack_bindings::Result<()> {
    /// let os = openstack_bindings::Cloud::from_env().await?;
    /// # Ok(()) }
    /// ```
    pub async fn from_env() -> Result<Cloud> {
        Ok(Cloud {
            session: Session::from_env().await?,
        })
    }

    /// Convert this cloud into one using the given endpoint interface.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use openstack_bindings::auth::InterfaceType;
    ///
    /// async fn cloud_from_env() -> openstack_bindings::Result<openstack_bindings::Cloud> {
    ///     openstack_bindings::Cloud::from_env()
    ///         .await
    ///         .map(|os| os.with_endpoint_interface(InterfaceType::Internal))
    /// }
    /// ```
    pub fn with_endpoint_interface(mut self, endpoint_interface: InterfaceType) -> Cloud {
        self.session.set_endpoint_interface(endpoint_interface);
        self
    }

    /// Convert this cloud into one using the given region.
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Cloud {
        self.session.set_region(region);
        self
    }

    /// Refresh this `Cloud` object (renew token, refetch service catalog, etc).
    pub async fn refresh(&mut self) -> Result<()> {
        self.session.refresh().await
    }

    /// Session used by this cloud.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Build a query against bare metal node list.
    ///
    /// The returned object is a builder that should be used to construct
    /// the query.
    #[cfg(feature = "baremetal")]
    pub fn find_baremetal_nodes(&self) -> NodeQuery {
        NodeQuery::new(self.session.clone())
    }

    /// Find a bare metal node by its name or ID.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn example() -> openstack_bindings::Result<()> {
    /// let os = openstack_bindings::Cloud::from_env().await?;
    /// let node = os.get_baremetal_node("compute-0").await?;
    /// println!("Power state: {:?}", node.power_state());
    /// # Ok(()) }
    /// ```
    #[cfg(feature = "baremetal")]
    pub async fn get_baremetal_node<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<Node> {
        Node::load(self.session.clone(), id_or_name).await
    }

    /// List all bare metal nodes.
    #[cfg(feature = "baremetal")]
    pub async fn list_baremetal_nodes(&self) -> Result<Vec<NodeSummary>> {
        self.find_baremetal_nodes().all().await
    }

    /// Prepare a new bare metal node for creation.
    #[cfg(feature = "baremetal")]
    pub fn new_baremetal_node<S: Into<String>>(&self, driver: S) -> NewNode {
        NewNode::new(self.session.clone(), driver)
    }

    /// Build a query against introspection list.
    #[cfg(feature = "introspection")]
    pub fn find_introspections(&self) -> IntrospectionQuery {
        IntrospectionQuery::new(self.session.clone())
    }

    /// Get introspection status of a node.
    #[cfg(feature = "introspection")]
    pub async fn get_introspection<Id: AsRef<str>>(&self, node: Id) -> Result<Introspection> {
        Introspection::load(self.session.clone(), node).await
    }

    /// List all introspection statuses.
    #[cfg(feature = "introspection")]
    pub async fn list_introspections(&self) -> Result<Vec<Introspection>> {
        self.find_introspections().all().await
    }

    /// Prepare introspection of a node.
    #[cfg(feature = "introspection")]
    pub fn new_introspection<N: Into<NodeRef>>(&self, node: N) -> NewIntrospection {
        NewIntrospection::new(self.session.clone(), node)
    }

    /// Build a query against firewall group list.
    #[cfg(feature = "network")]
    pub fn find_firewall_groups(&self) -> FirewallGroupQuery {
        FirewallGroupQuery::new(self.session.clone())
    }

    /// Get a firewall group by its ID.
    #[cfg(feature = "network")]
    pub async fn get_firewall_group<Id: AsRef<str>>(&self, id: Id) -> Result<FirewallGroup> {
        FirewallGroup::load(self.session.clone(), id).await
    }

    /// List all firewall groups.
    #[cfg(feature = "network")]
    pub async fn list_firewall_groups(&self) -> Result<Vec<FirewallGroup>> {
        self.find_firewall_groups().all().await
    }

    /// Prepare a new firewall group for creation.
    #[cfg(feature = "network")]
    pub fn new_firewall_group(&self) -> NewFirewallGroup {
        NewFirewallGroup::new(self.session.clone())
    }

    /// Build a query against firewall policy list.
    #[cfg(feature = "network")]
    pub fn find_firewall_policies(&self) -> FirewallPolicyQuery {
        FirewallPolicyQuery::new(self.session.clone())
    }

    /// Get a firewall policy by its ID.
    #[cfg(feature = "network")]
    pub async fn get_firewall_policy<Id: AsRef<str>>(&self, id: Id) -> Result<FirewallPolicy> {
        FirewallPolicy::load(self.session.clone(), id).await
    }

    /// List all firewall policies.
    #[cfg(feature = "network")]
    pub async fn list_firewall_policies(&self) -> Result<Vec<FirewallPolicy>> {
        self.find_firewall_policies().all().await
    }

    /// Prepare a new firewall policy for creation.
    #[cfg(feature = "network")]
    pub fn new_firewall_policy(&self) -> NewFirewallPolicy {
        NewFirewallPolicy::new(self.session.clone())
    }

    /// Build a query against firewall rule list.
    #[cfg(feature = "network")]
    pub fn find_firewall_rules(&self) -> FirewallRuleQuery {
        FirewallRuleQuery::new(self.session.clone())
    }

    /// Get a firewall rule by its ID.
    #[cfg(feature = "network")]
    pub async fn get_firewall_rule<Id: AsRef<str>>(&self, id: Id) -> Result<FirewallRule> {
        FirewallRule::load(self.session.clone(), id).await
    }

    /// List all firewall rules.
    #[cfg(feature = "network")]
    pub async fn list_firewall_rules(&self) -> Result<Vec<FirewallRule>> {
        self.find_firewall_rules().all().await
    }

    /// Prepare a new firewall rule for creation.
    #[cfg(feature = "network")]
    pub fn new_firewall_rule(&self) -> NewFirewallRule {
        NewFirewallRule::new(self.session.clone())
    }

    /// Build a query against floating IP list.
    ///
    /// The returned object is a builder that should be used to construct
    /// the query.
    #[cfg(feature = "network")]
    pub fn find_floating_ips(&self) -> FloatingIpQuery {
        FloatingIpQuery::new(self.session.clone())
    }

    /// Get a floating IP by its ID.
    #[cfg(feature = "network")]
    pub async fn get_floating_ip<Id: AsRef<str>>(&self, id: Id) -> Result<FloatingIp> {
        FloatingIp::load(self.session.clone(), id).await
    }

    /// List all floating IPs.
    #[cfg(feature = "network")]
    pub async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        self.find_floating_ips().all().await
    }

    /// Prepare a new floating IP for creation.
    #[cfg(feature = "network")]
    pub fn new_floating_ip<N: Into<NetworkRef>>(&self, floating_network: N) -> NewFloatingIp {
        NewFloatingIp::new(self.session.clone(), floating_network)
    }

    /// Build a query against IKE policy list.
    #[cfg(feature = "network")]
    pub fn find_ike_policies(&self) -> IkePolicyQuery {
        IkePolicyQuery::new(self.session.clone())
    }

    /// Get an IKE policy by its ID.
    #[cfg(feature = "network")]
    pub async fn get_ike_policy<Id: AsRef<str>>(&self, id: Id) -> Result<IkePolicy> {
        IkePolicy::load(self.session.clone(), id).await
    }

    /// List all IKE policies.
    #[cfg(feature = "network")]
    pub async fn list_ike_policies(&self) -> Result<Vec<IkePolicy>> {
        self.find_ike_policies().all().await
    }

    /// Prepare a new IKE policy for creation.
    #[cfg(feature = "network")]
    pub fn new_ike_policy(&self) -> NewIkePolicy {
        NewIkePolicy::new(self.session.clone())
    }

    /// Build a query against IPsec policy list.
    #[cfg(feature = "network")]
    pub fn find_ipsec_policies(&self) -> IpsecPolicyQuery {
        IpsecPolicyQuery::new(self.session.clone())
    }

    /// Get an IPsec policy by its ID.
    #[cfg(feature = "network")]
    pub async fn get_ipsec_policy<Id: AsRef<str>>(&self, id: Id) -> Result<IpsecPolicy> {
        IpsecPolicy::load(self.session.clone(), id).await
    }

    /// List all IPsec policies.
    #[cfg(feature = "network")]
    pub async fn list_ipsec_policies(&self) -> Result<Vec<IpsecPolicy>> {
        self.find_ipsec_policies().all().await
    }

    /// Prepare a new IPsec policy for creation.
    #[cfg(feature = "network")]
    pub fn new_ipsec_policy(&self) -> NewIpsecPolicy {
        NewIpsecPolicy::new(self.session.clone())
    }

    /// Build a query against network segment range list.
    #[cfg(feature = "network")]
    pub fn find_segment_ranges(&self) -> SegmentRangeQuery {
        SegmentRangeQuery::new(self.session.clone())
    }

    /// Get a network segment range by its ID.
    #[cfg(feature = "network")]
    pub async fn get_segment_range<Id: AsRef<str>>(&self, id: Id) -> Result<SegmentRange> {
        SegmentRange::load(self.session.clone(), id).await
    }

    /// List all network segment ranges.
    #[cfg(feature = "network")]
    pub async fn list_segment_ranges(&self) -> Result<Vec<SegmentRange>> {
        self.find_segment_ranges().all().await
    }

    /// Prepare a new network segment range for creation.
    #[cfg(feature = "network")]
    pub fn new_segment_range(
        &self,
        network_type: NetworkType,
        minimum: u32,
        maximum: u32,
    ) -> NewSegmentRange {
        NewSegmentRange::new(self.session.clone(), network_type, minimum, maximum)
    }

    /// Build a query against IPsec site connection list.
    #[cfg(feature = "network")]
    pub fn find_site_connections(&self) -> SiteConnectionQuery {
        SiteConnectionQuery::new(self.session.clone())
    }

    /// Get an IPsec site connection by its ID.
    #[cfg(feature = "network")]
    pub async fn get_site_connection<Id: AsRef<str>>(&self, id: Id) -> Result<SiteConnection> {
        SiteConnection::load(self.session.clone(), id).await
    }

    /// List all IPsec site connections.
    #[cfg(feature = "network")]
    pub async fn list_site_connections(&self) -> Result<Vec<SiteConnection>> {
        self.find_site_connections().all().await
    }

    /// Prepare a new IPsec site connection for creation.
    ///
    /// The connection links a VPN service to a remote peer using the given policies.
    #[cfg(feature = "network")]
    pub fn new_site_connection<S, I, P>(
        &self,
        vpn_service: S,
        ike_policy: I,
        ipsec_policy: P,
    ) -> NewSiteConnection
    where
        S: Into<VpnServiceRef>,
        I: Into<IkePolicyRef>,
        P: Into<IpsecPolicyRef>,
    {
        NewSiteConnection::new(
            self.session.clone(),
            vpn_service.into(),
            ike_policy.into(),
            ipsec_policy.into(),
        )
    }

    /// Build a query against listener list.
    #[cfg(feature = "load-balancer")]
    pub fn find_listeners(&self) -> ListenerQuery {
        ListenerQuery::new(self.session.clone())
    }

    /// Get a listener by its ID.
    #[cfg(feature = "load-balancer")]
    pub async fn get_listener<Id: AsRef<str>>(&self, id: Id) -> Result<Listener> {
        Listener::load(self.session.clone(), id).await
    }

    /// List all listeners.
    #[cfg(feature = "load-balancer")]
    pub async fn list_listeners(&self) -> Result<Vec<Listener>> {
        self.find_listeners().all().await
    }

    /// Prepare a new listener for creation.
    #[cfg(feature = "load-balancer")]
    pub fn new_listener<L: Into<LoadBalancerRef>>(
        &self,
        load_balancer: L,
        protocol: ListenerProtocol,
        protocol_port: u16,
    ) -> NewListener {
        NewListener::new(self.session.clone(), load_balancer, protocol, protocol_port)
    }

    /// Build a query against load balancer list.
    #[cfg(feature = "load-balancer")]
    pub fn find_load_balancers(&self) -> LoadBalancerQuery {
        LoadBalancerQuery::new(self.session.clone())
    }

    /// Get a load balancer by its ID.
    #[cfg(feature = "load-balancer")]
    pub async fn get_load_balancer<Id: AsRef<str>>(&self, id: Id) -> Result<LoadBalancer> {
        LoadBalancer::load(self.session.clone(), id).await
    }

    /// List all load balancers.
    #[cfg(feature = "load-balancer")]
    pub async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>> {
        self.find_load_balancers().all().await
    }

    /// Prepare a new load balancer for creation.
    #[cfg(feature = "load-balancer")]
    pub fn new_load_balancer(&self) -> NewLoadBalancer {
        NewLoadBalancer::new(self.session.clone())
    }

    /// Build a query against member list of a pool.
    #[cfg(feature = "load-balancer")]
    pub fn find_members<P: Into<PoolRef>>(&self, pool: P) -> MemberQuery {
        let pool: PoolRef = pool.into();
        MemberQuery::new(self.session.clone(), pool.into())
    }

    /// Get a pool member by its pool and ID.
    #[cfg(feature = "load-balancer")]
    pub async fn get_member<P, Id>(&self, pool: P, id: Id) -> Result<Member>
    where
        P: Into<PoolRef>,
        Id: AsRef<str>,
    {
        let pool: PoolRef = pool.into();
        Member::load(self.session.clone(), pool.into(), id).await
    }

    /// List all members of a pool.
    #[cfg(feature = "load-balancer")]
    pub async fn list_members<P: Into<PoolRef>>(&self, pool: P) -> Result<Vec<Member>> {
        self.find_members(pool).all().await
    }

    /// Prepare a new pool member for creation.
    #[cfg(feature = "load-balancer")]
    pub fn new_member<P, A>(&self, pool: P, address: A, protocol_port: u16) -> NewMember
    where
        P: Into<PoolRef>,
        A: Into<net::IpAddr>,
    {
        NewMember::new(self.session.clone(), pool, address.into(), protocol_port)
    }

    /// Build a query against pool list.
    #[cfg(feature = "load-balancer")]
    pub fn find_pools(&self) -> PoolQuery {
        PoolQuery::new(self.session.clone())
    }

    /// Get a pool by its ID.
    #[cfg(feature = "load-balancer")]
    pub async fn get_pool<Id: AsRef<str>>(&self, id: Id) -> Result<Pool> {
        Pool::load(self.session.clone(), id).await
    }

    /// List all pools.
    #[cfg(feature = "load-balancer")]
    pub async fn list_pools(&self) -> Result<Vec<Pool>> {
        self.find_pools().all().await
    }

    /// Prepare a new pool for creation.
    ///
    /// A load balancer or a listener must be set before creating the pool.
    #[cfg(feature = "load-balancer")]
    pub fn new_pool(&self, protocol: PoolProtocol, lb_algorithm: LbAlgorithm) -> NewPool {
        NewPool::new(self.session.clone(), protocol, lb_algorithm)
    }

    /// Build a query against stack list.
    #[cfg(feature = "orchestration")]
    pub fn find_stacks(&self) -> StackQuery {
        StackQuery::new(self.session.clone())
    }

    /// Find a stack by its name or ID.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn example() -> openstack_bindings::Result<()> {
    /// let os = openstack_bindings::Cloud::from_env().await?;
    /// let stack = os.get_stack("my-stack").await?;
    /// println!("Stack {} is {}", stack.id(), stack.status());
    /// # Ok(()) }
    /// ```
    #[cfg(feature = "orchestration")]
    pub async fn get_stack<Id: AsRef<str>>(&self, name_or_id: Id) -> Result<Stack> {
        Stack::find(self.session.clone(), name_or_id).await
    }

    /// List all stacks.
    #[cfg(feature = "orchestration")]
    pub async fn list_stacks(&self) -> Result<Vec<StackSummary>> {
        self.find_stacks().all().await
    }

    /// Prepare a new stack for creation.
    #[cfg(feature = "orchestration")]
    pub fn new_stack<S: Into<String>>(&self, name: S) -> NewStack {
        NewStack::new(self.session.clone(), name)
    }
}

impl From<Session> for Cloud {
    fn from(value: Session) -> Cloud {
        Cloud::from_session(value)
    }
}

impl From<Cloud> for Session {
    fn from(value: Cloud) -> Session {
        value.session
    }
}

#[cfg(test)]
mod test {
    use static_assertions::assert_impl_all;

    use super::Cloud;
    use crate::auth::{InterfaceType, NoAuth, ValidInterfaces};

    assert_impl_all!(Cloud: Send, Sync);

    #[tokio::test]
    async fn test_cloud_session_filters() {
        let cloud = Cloud::new(NoAuth::new("http://127.0.0.1:6385").unwrap())
            .await
            .unwrap()
            .with_endpoint_interface(InterfaceType::Internal)
            .with_region("RegionTwo");
        let filters = cloud.session().endpoint_filters();
        assert_eq!(
            filters.interfaces,
            ValidInterfaces::from(InterfaceType::Internal)
        );
        assert_eq!(filters.region.as_deref(), Some("RegionTwo"));
    }
}
