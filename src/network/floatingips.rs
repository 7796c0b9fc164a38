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

//! Floating IP support.

use std::collections::HashSet;
use std::net;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{self, FloatingIpFilter, FloatingIpSortKey, FloatingIpStatus};
use crate::common::{DeletionWaiter, NetworkRef, PortRef, ProjectRef, Query, Refresh, SubnetRef};
use crate::{Error, ErrorKind, Result, Session, Sort};

/// Structure representing a single floating IP.
#[derive(Clone, Debug)]
pub struct FloatingIp {
    session: Session,
    inner: protocol::FloatingIp,
    dirty: HashSet<&'static str>,
}

/// A query to floating IP list.
#[derive(Clone, Debug)]
pub struct FloatingIpQuery {
    session: Session,
    query: Query<FloatingIpFilter>,
    can_paginate: bool,
}

/// A request to create a floating IP.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewFloatingIp {
    session: Session,
    inner: protocol::FloatingIpCreate,
}

impl FloatingIp {
    fn new(session: Session, inner: protocol::FloatingIp) -> FloatingIp {
        FloatingIp {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    /// Load a FloatingIp object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<FloatingIp> {
        let inner = api::get_floating_ip(&session, id).await?;
        Ok(FloatingIp::new(session, inner))
    }

    transparent_property! {
        #[doc = "Creation data and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Floating IP description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "DNS domain for the floating IP (if available)."]
        dns_domain: ref Option<String>
    }

    transparent_property! {
        #[doc = "DNS name for the floating IP (if available)."]
        dns_name: ref Option<String>
    }

    transparent_property! {
        #[doc = "IP address of the port associated with the IP (if any)."]
        fixed_ip_address: Option<net::IpAddr>
    }

    transparent_property! {
        #[doc = "Floating IP address (if allocated)."]
        floating_ip_address: Option<net::IpAddr>
    }

    transparent_property! {
        #[doc = "ID of the network this floating IP belongs to."]
        floating_network_id: ref String
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    /// Whether the floating IP is associated.
    #[inline]
    pub fn is_associated(&self) -> bool {
        self.inner.port_id.is_some()
    }

    transparent_property! {
        #[doc = "List of port forwardings (if any)."]
        port_forwardings: ref Vec<protocol::PortForwarding>
    }

    transparent_property! {
        #[doc = "ID of the port this IP is attached to (if any)."]
        port_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "ID of the project owning the IP."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "ID of the router of this floating IP."]
        router_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Status of the floating IP."]
        status: FloatingIpStatus
    }

    transparent_property! {
        #[doc = "Tags."]
        tags: ref Vec<String>
    }

    transparent_property! {
        #[doc = "Last update data and time (if available)."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    /// Associate the floating IP with a port.
    ///
    /// The fixed IP is only required if the port has several IP addresses.
    pub async fn associate<P>(&mut self, port: P, fixed_ip_address: Option<net::IpAddr>) -> Result<()>
    where
        P: Into<PortRef>,
    {
        let port: PortRef = port.into();
        let update = protocol::FloatingIpUpdate {
            port_id: Some(Some(port.into())),
            fixed_ip_address: fixed_ip_address.map(Some),
            ..Default::default()
        };
        self.inner = api::update_floating_ip(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Dissociate the floating IP from its port.
    pub async fn dissociate(&mut self) -> Result<()> {
        let update = protocol::FloatingIpUpdate {
            port_id: Some(None),
            ..Default::default()
        };
        self.inner = api::update_floating_ip(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Delete the floating IP.
    pub async fn delete(self) -> Result<DeletionWaiter<FloatingIp>> {
        api::delete_floating_ip(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the floating IP is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the floating IP.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::FloatingIpUpdate::default();
        save_option_fields! {
            self -> update: description
        };
        let inner = api::update_floating_ip(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for FloatingIp {
    /// Refresh the floating IP.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_floating_ip(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl FloatingIpQuery {
    pub(crate) fn new(session: Session) -> FloatingIpQuery {
        FloatingIpQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: FloatingIpFilter) {
        if let FloatingIpFilter::Marker(..) | FloatingIpFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: FloatingIpFilter) -> Self {
        self.set(filter);
        self
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<FloatingIpSortKey>) -> Self {
        let (field, direction) = sort.unwrap();
        self.query.push(FloatingIpFilter::SortKey(field));
        self.query.push(FloatingIpFilter::SortDir(direction));
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Returns a `TryStream`, which is a stream with each `next`
    /// call returning a `Result`.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<FloatingIp>> {
        debug!("Fetching floating IPs with {:?}", self.query);
        let session = self.session.clone();
        api::list_floating_ips(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::FloatingIp>()
            .map_ok(move |inner| FloatingIp::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    ///
    /// A convenience shortcut for `self.into_stream().try_collect().await`.
    #[inline]
    pub async fn all(self) -> Result<Vec<FloatingIp>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<FloatingIp> {
        debug!("Fetching one floating IP with {:?}", self.query);
        if self.can_paginate {
            // We need only one result. We fetch maximum two to be able
            // to check if the query yieled more than one result.
            self.query.push(FloatingIpFilter::Limit(2));
        }

        let inner = api::list_floating_ips(&self.session, &self.query, false)
            .one::<protocol::FloatingIp>()
            .await?;
        Ok(FloatingIp::new(self.session, inner))
    }
}

impl NewFloatingIp {
    /// Start creating a floating IP.
    pub(crate) fn new<N: Into<NetworkRef>>(session: Session, floating_network: N) -> NewFloatingIp {
        NewFloatingIp {
            session,
            inner: protocol::FloatingIpCreate {
                description: None,
                dns_domain: None,
                dns_name: None,
                fixed_ip_address: None,
                floating_ip_address: None,
                floating_network_id: floating_network.into(),
                port_id: None,
                project_id: None,
                subnet_id: None,
            },
        }
    }

    /// Request creation of the floating IP.
    pub async fn create(self) -> Result<FloatingIp> {
        if self.inner.floating_network_id.as_ref().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Floating network ID is required to create a floating IP",
            ));
        }
        if let Some(ref port) = self.inner.port_id {
            if port.as_ref().is_empty() {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "Port ID must not be empty if provided",
                ));
            }
        }
        let inner = api::create_floating_ip(&self.session, self.inner).await?;
        Ok(FloatingIp::new(self.session, inner))
    }

    creation_field! {
        #[doc = "Set description of the floating IP."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set DNS domain for the floating IP."]
        set_dns_domain, with_dns_domain -> dns_domain: optional String
    }

    creation_field! {
        #[doc = "Set DNS name for the floating IP."]
        set_dns_name, with_dns_name -> dns_name: optional String
    }

    creation_field! {
        #[doc = "Set the requested fixed IP address (required if the port has several)."]
        set_fixed_ip_address, with_fixed_ip_address -> fixed_ip_address: optional net::IpAddr
    }

    creation_field! {
        #[doc = "Set the requested floating IP address."]
        set_floating_ip_address, with_floating_ip_address -> floating_ip_address: optional net::IpAddr
    }

    creation_field! {
        #[doc = "Set the port to associate the floating IP with."]
        set_port, with_port -> port_id: optional PortRef
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the subnet of the floating network to allocate from."]
        set_subnet, with_subnet -> subnet_id: optional SubnetRef
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::auth::NoAuth;

    async fn session() -> Session {
        Session::new(NoAuth::new("http://127.0.0.1:9696").unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_network() {
        let err = NewFloatingIp::new(session().await, "").create().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_port() {
        let err = NewFloatingIp::new(session().await, "net")
            .with_port("")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_update_dirty_tracking() {
        let inner = serde_json::from_value(json!({
            "floating_network_id": "376da547",
            "fixed_ip_address": null,
            "floating_ip_address": "",
            "port_id": null,
            "id": "2f245a7b"
        }))
        .unwrap();
        let mut fip = FloatingIp::new(session().await, inner);
        assert!(!fip.is_dirty());
        assert!(fip.floating_ip_address().is_none());
        assert_eq!(fip.status(), FloatingIpStatus::Unknown);
        fip.set_description("web");
        assert!(fip.is_dirty());
        assert_eq!(fip.description().as_deref(), Some("web"));
    }

    #[test]
    fn test_disassociate_body() {
        let update = protocol::FloatingIpUpdate {
            port_id: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(protocol::FloatingIpUpdateRoot { floatingip: update }).unwrap(),
            json!({"floatingip": {"port_id": null}})
        );
    }
}
