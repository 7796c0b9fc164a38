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

//! Load balancers.

use std::collections::HashSet;
use std::net;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{
    self, LoadBalancerFilter, LoadBalancerSortKey, LoadBalancerStats, LoadBalancerStatusTree,
    OperatingStatus, ProvisioningStatus,
};
use crate::common::{
    DeletionWaiter, NetworkRef, PortRef, ProjectRef, Query, Refresh, SubnetRef, Waiter,
};
use crate::utils::Sort;
use crate::{Error, ErrorKind, Result, Session};

/// A load balancer.
#[derive(Clone, Debug)]
pub struct LoadBalancer {
    session: Session,
    inner: protocol::LoadBalancer,
    dirty: HashSet<&'static str>,
}

/// A query to load balancer list.
#[derive(Clone, Debug)]
pub struct LoadBalancerQuery {
    session: Session,
    query: Query<LoadBalancerFilter>,
    can_paginate: bool,
}

/// A request to create a load balancer.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewLoadBalancer {
    session: Session,
    inner: protocol::LoadBalancerCreate,
}

/// Waiter for a load balancer to leave a pending state.
#[derive(Debug)]
pub struct LoadBalancerStatusWaiter {
    load_balancer: LoadBalancer,
}

impl LoadBalancer {
    fn new(session: Session, inner: protocol::LoadBalancer) -> LoadBalancer {
        LoadBalancer {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<LoadBalancer> {
        let inner = api::get_load_balancer(&session, id).await?;
        Ok(LoadBalancer::new(session, inner))
    }

    transparent_property! {
        #[doc = "Whether the load balancer is administratively up."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Update the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    transparent_property! {
        #[doc = "Availability zone of the load balancer."]
        availability_zone: ref Option<String>
    }

    transparent_property! {
        #[doc = "Creation date and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Load balancer description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "ID of the flavor."]
        flavor_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    /// IDs of the listeners of this load balancer.
    pub fn listener_ids(&self) -> Vec<&str> {
        self.inner.listeners.iter().map(|x| x.id.as_str()).collect()
    }

    transparent_property! {
        #[doc = "Load balancer name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "Operating status."]
        operating_status: OperatingStatus
    }

    /// IDs of the pools of this load balancer.
    pub fn pool_ids(&self) -> Vec<&str> {
        self.inner.pools.iter().map(|x| x.id.as_str()).collect()
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Provider driver."]
        provider: ref Option<String>
    }

    transparent_property! {
        #[doc = "Provisioning status."]
        provisioning_status: ProvisioningStatus
    }

    transparent_property! {
        #[doc = "Tags."]
        tags: ref Vec<String>
    }

    update_field! {
        #[doc = "Replace the tags."]
        set_tags, with_tags -> tags: Vec<String>
    }

    transparent_property! {
        #[doc = "Last update date and time (if available)."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Virtual IP address."]
        vip_address: Option<net::IpAddr>
    }

    transparent_property! {
        #[doc = "Network of the virtual IP."]
        vip_network_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Port of the virtual IP."]
        vip_port_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "QoS policy of the virtual IP."]
        vip_qos_policy_id: ref Option<String>
    }

    update_field! {
        #[doc = "Update the QoS policy of the virtual IP."]
        set_vip_qos_policy_id, with_vip_qos_policy_id -> vip_qos_policy_id: optional String
    }

    transparent_property! {
        #[doc = "Subnet of the virtual IP."]
        vip_subnet_id: ref Option<String>
    }

    /// Delete the load balancer.
    ///
    /// Fails if the load balancer still has children.
    pub async fn delete(self) -> Result<DeletionWaiter<LoadBalancer>> {
        api::delete_load_balancer(&self.session, &self.inner.id, false).await?;
        Ok(self.into_deletion_waiter())
    }

    /// Delete the load balancer together with its listeners, pools and members.
    pub async fn delete_cascade(self) -> Result<DeletionWaiter<LoadBalancer>> {
        api::delete_load_balancer(&self.session, &self.inner.id, true).await?;
        Ok(self.into_deletion_waiter())
    }

    fn into_deletion_waiter(self) -> DeletionWaiter<LoadBalancer> {
        DeletionWaiter::new(self, Duration::new(600, 0), Duration::new(2, 0))
    }

    /// Fail over the load balancer's amphorae.
    ///
    /// Returns a waiter for the load balancer to become active again.
    pub async fn failover(mut self) -> Result<LoadBalancerStatusWaiter> {
        api::failover_load_balancer(&self.session, &self.inner.id).await?;
        self.refresh().await?;
        Ok(self.into_waiter())
    }

    /// Fetch load balancer statistics.
    pub async fn stats(&self) -> Result<LoadBalancerStats> {
        api::get_load_balancer_stats(&self.session, &self.inner.id).await
    }

    /// Fetch the status tree of the load balancer and its children.
    pub async fn status_tree(&self) -> Result<LoadBalancerStatusTree> {
        api::get_load_balancer_status(&self.session, &self.inner.id).await
    }

    /// Wait for the load balancer to leave a pending state.
    #[inline]
    pub fn into_waiter(self) -> LoadBalancerStatusWaiter {
        LoadBalancerStatusWaiter {
            load_balancer: self,
        }
    }

    /// Whether the load balancer is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the load balancer.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::LoadBalancerUpdate::default();
        save_fields! {
            self -> update: admin_state_up tags
        };
        save_option_fields! {
            self -> update: description name vip_qos_policy_id
        };
        let inner = api::update_load_balancer(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for LoadBalancer {
    /// Refresh the load balancer.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_load_balancer(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl LoadBalancerStatusWaiter {
    /// Current state of the load balancer.
    #[inline]
    pub fn current_state(&self) -> &LoadBalancer {
        &self.load_balancer
    }
}

#[async_trait]
impl Waiter for LoadBalancerStatusWaiter {
    type Output = LoadBalancer;

    fn default_wait_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(1800))
    }

    fn default_delay(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn timeout_error(&self) -> Error {
        Error::new(
            ErrorKind::OperationTimedOut,
            format!(
                "Timeout waiting for load balancer {} to become active, current status is {}",
                self.load_balancer.id(),
                self.load_balancer.provisioning_status()
            ),
        )
    }

    async fn poll(&mut self) -> Result<Option<LoadBalancer>> {
        self.load_balancer.refresh().await?;
        let status = self.load_balancer.provisioning_status();
        if status.is_pending() {
            trace!(
                "Still waiting for load balancer {}, current status is {}",
                self.load_balancer.id(),
                status
            );
            return Ok(None);
        }

        if status == ProvisioningStatus::Error {
            debug!("Load balancer {} went into ERROR", self.load_balancer.id());
            return Err(Error::new(
                ErrorKind::OperationFailed,
                format!("Load balancer {} is in ERROR state", self.load_balancer.id()),
            ));
        }

        debug!(
            "Load balancer {} reached status {}",
            self.load_balancer.id(),
            status
        );
        Ok(Some(self.load_balancer.clone()))
    }
}

impl LoadBalancerQuery {
    pub(crate) fn new(session: Session) -> LoadBalancerQuery {
        LoadBalancerQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: LoadBalancerFilter) {
        if let LoadBalancerFilter::Marker(..) | LoadBalancerFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: LoadBalancerFilter) -> Self {
        self.set(filter);
        self
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<LoadBalancerSortKey>) -> Self {
        let (field, direction) = sort.unwrap();
        self.query.push(LoadBalancerFilter::SortKey(field));
        self.query.push(LoadBalancerFilter::SortDir(direction));
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<LoadBalancer>> {
        debug!("Fetching load balancers with {:?}", self.query);
        let session = self.session.clone();
        api::list_load_balancers(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::LoadBalancer>()
            .map_ok(move |inner| LoadBalancer::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<LoadBalancer>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<LoadBalancer> {
        debug!("Fetching one load balancer with {:?}", self.query);
        if self.can_paginate {
            self.query.push(LoadBalancerFilter::Limit(2));
        }

        let inner = api::list_load_balancers(&self.session, &self.query, false)
            .one::<protocol::LoadBalancer>()
            .await?;
        Ok(LoadBalancer::new(self.session, inner))
    }
}

impl NewLoadBalancer {
    pub(crate) fn new(session: Session) -> NewLoadBalancer {
        NewLoadBalancer {
            session,
            inner: protocol::LoadBalancerCreate::default(),
        }
    }

    /// Request creation of the load balancer.
    ///
    /// One of the VIP subnet, network or port must be set.
    pub async fn create(self) -> Result<LoadBalancer> {
        if self.inner.vip_subnet_id.is_none()
            && self.inner.vip_network_id.is_none()
            && self.inner.vip_port_id.is_none()
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "One of VIP subnet, network or port is required to create a load balancer",
            ));
        }

        let inner = api::create_load_balancer(&self.session, self.inner).await?;
        Ok(LoadBalancer::new(self.session, inner))
    }

    /// Add a tag.
    pub fn add_tag<S: Into<String>>(&mut self, tag: S) {
        self.inner.tags.push(tag.into());
    }

    /// Add a tag.
    #[inline]
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.add_tag(tag);
        self
    }

    creation_field! {
        #[doc = "Set the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: optional bool
    }

    creation_field! {
        #[doc = "Set the availability zone."]
        set_availability_zone, with_availability_zone -> availability_zone: optional String
    }

    creation_field! {
        #[doc = "Set description of the load balancer."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set the flavor."]
        set_flavor, with_flavor -> flavor_id: optional String
    }

    creation_field! {
        #[doc = "Set name of the load balancer."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the provider driver."]
        set_provider, with_provider -> provider: optional String
    }

    creation_field! {
        #[doc = "Request a specific virtual IP address."]
        set_vip_address, with_vip_address -> vip_address: optional net::IpAddr
    }

    creation_field! {
        #[doc = "Allocate the virtual IP on this network."]
        set_vip_network, with_vip_network -> vip_network_id: optional NetworkRef
    }

    creation_field! {
        #[doc = "Use this port for the virtual IP."]
        set_vip_port, with_vip_port -> vip_port_id: optional PortRef
    }

    creation_field! {
        #[doc = "Set the QoS policy of the virtual IP."]
        set_vip_qos_policy, with_vip_qos_policy -> vip_qos_policy_id: optional String
    }

    creation_field! {
        #[doc = "Allocate the virtual IP on this subnet."]
        set_vip_subnet, with_vip_subnet -> vip_subnet_id: optional SubnetRef
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::auth::NoAuth;

    async fn session() -> Session {
        Session::new(NoAuth::new("http://127.0.0.1:9876").unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_vip() {
        let err = NewLoadBalancer::new(session().await)
            .with_name("lb1")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_create_body() {
        let request = NewLoadBalancer::new(session().await)
            .with_name("lb1")
            .with_vip_subnet("d4af86e1")
            .with_vip_address(net::Ipv4Addr::new(203, 0, 113, 50))
            .with_tag("web");
        assert_eq!(
            serde_json::to_value(&request.inner).unwrap(),
            json!({
                "name": "lb1",
                "vip_subnet_id": "d4af86e1",
                "vip_address": "203.0.113.50",
                "tags": ["web"]
            })
        );
    }

    #[tokio::test]
    async fn test_update_body() {
        let inner = serde_json::from_value(json!({
            "id": "607226db",
            "name": "lb1",
            "provisioning_status": "ACTIVE",
            "operating_status": "ONLINE"
        }))
        .unwrap();
        let mut lb = LoadBalancer::new(session().await, inner);
        assert!(!lb.is_dirty());
        lb.set_admin_state_up(false);
        lb.set_description("updated");

        let this = &lb;
        let mut update = protocol::LoadBalancerUpdate::default();
        save_fields! {
            this -> update: admin_state_up tags
        };
        save_option_fields! {
            this -> update: description name vip_qos_policy_id
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"admin_state_up": false, "description": "updated"})
        );
    }
}
