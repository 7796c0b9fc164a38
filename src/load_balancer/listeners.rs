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

//! Load balancer listeners.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};
use ipnet::IpNet;

use super::api;
use super::protocol::{
    self, ListenerFilter, ListenerProtocol, OperatingStatus, ProvisioningStatus,
};
use crate::common::{DeletionWaiter, LoadBalancerRef, PoolRef, ProjectRef, Query, Refresh};
use crate::{Error, ErrorKind, Result, Session};

/// A listener: a port on a load balancer accepting client traffic.
#[derive(Clone, Debug)]
pub struct Listener {
    session: Session,
    inner: protocol::Listener,
    dirty: HashSet<&'static str>,
}

/// A query to listener list.
#[derive(Clone, Debug)]
pub struct ListenerQuery {
    session: Session,
    query: Query<ListenerFilter>,
    can_paginate: bool,
}

/// A request to create a listener.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewListener {
    session: Session,
    inner: protocol::ListenerCreate,
}

impl Listener {
    fn new(session: Session, inner: protocol::Listener) -> Listener {
        Listener {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Listener> {
        let inner = api::get_listener(&session, id).await?;
        Ok(Listener::new(session, inner))
    }

    transparent_property! {
        #[doc = "Whether the listener is administratively up."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Update the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    /// CIDRs allowed to connect (`None` means everyone).
    #[inline]
    pub fn allowed_cidrs(&self) -> Option<&[IpNet]> {
        self.inner.allowed_cidrs.as_deref()
    }

    /// Replace the allowed CIDRs.
    pub fn set_allowed_cidrs(&mut self, value: Vec<IpNet>) {
        self.inner.allowed_cidrs = Some(value);
        self.dirty.insert("allowed_cidrs");
    }

    /// Replace the allowed CIDRs.
    #[inline]
    pub fn with_allowed_cidrs(mut self, value: Vec<IpNet>) -> Self {
        self.set_allowed_cidrs(value);
        self
    }

    transparent_property! {
        #[doc = "Maximum number of connections (`-1` for unlimited)."]
        connection_limit: Option<i32>
    }

    update_field! {
        #[doc = "Update the connection limit."]
        set_connection_limit, with_connection_limit -> connection_limit: optional i32
    }

    transparent_property! {
        #[doc = "Creation date and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "ID of the default pool."]
        default_pool_id: ref Option<String>
    }

    /// Set or clear the default pool.
    pub fn set_default_pool<P: Into<PoolRef>>(&mut self, value: Option<P>) {
        self.inner.default_pool_id = value.map(|p| {
            let pool: PoolRef = p.into();
            pool.into()
        });
        self.dirty.insert("default_pool_id");
    }

    /// Set or clear the default pool.
    #[inline]
    pub fn with_default_pool<P: Into<PoolRef>>(mut self, value: Option<P>) -> Self {
        self.set_default_pool(value);
        self
    }

    transparent_property! {
        #[doc = "Listener description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Headers inserted into requests sent to members."]
        insert_headers: ref HashMap<String, String>
    }

    /// IDs of the load balancers of this listener.
    pub fn load_balancer_ids(&self) -> Vec<&str> {
        self.inner.loadbalancers.iter().map(|x| x.id.as_str()).collect()
    }

    transparent_property! {
        #[doc = "Listener name."]
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

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Protocol of the listener."]
        protocol: ListenerProtocol
    }

    transparent_property! {
        #[doc = "Port of the listener."]
        protocol_port: u16
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
        #[doc = "Frontend client inactivity timeout in milliseconds."]
        timeout_client_data: Option<u32>
    }

    update_field! {
        #[doc = "Update the frontend client inactivity timeout."]
        set_timeout_client_data, with_timeout_client_data -> timeout_client_data: optional u32
    }

    transparent_property! {
        #[doc = "Backend member connection timeout in milliseconds."]
        timeout_member_connect: Option<u32>
    }

    update_field! {
        #[doc = "Update the backend member connection timeout."]
        set_timeout_member_connect, with_timeout_member_connect -> timeout_member_connect: optional u32
    }

    transparent_property! {
        #[doc = "Backend member inactivity timeout in milliseconds."]
        timeout_member_data: Option<u32>
    }

    update_field! {
        #[doc = "Update the backend member inactivity timeout."]
        set_timeout_member_data, with_timeout_member_data -> timeout_member_data: optional u32
    }

    transparent_property! {
        #[doc = "Time to wait for additional TCP packets for content inspection."]
        timeout_tcp_inspect: Option<u32>
    }

    update_field! {
        #[doc = "Update the TCP inspection timeout."]
        set_timeout_tcp_inspect, with_timeout_tcp_inspect -> timeout_tcp_inspect: optional u32
    }

    transparent_property! {
        #[doc = "Last update date and time (if available)."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    /// Delete the listener.
    pub async fn delete(self) -> Result<DeletionWaiter<Listener>> {
        api::delete_listener(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(120, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the listener is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the listener.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::ListenerUpdate::default();
        save_fields! {
            self -> update: admin_state_up default_pool_id tags
        };
        save_option_fields! {
            self -> update: allowed_cidrs connection_limit description name timeout_client_data
                timeout_member_connect timeout_member_data timeout_tcp_inspect
        };
        let inner = api::update_listener(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for Listener {
    /// Refresh the listener.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_listener(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl ListenerQuery {
    pub(crate) fn new(session: Session) -> ListenerQuery {
        ListenerQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: ListenerFilter) {
        if let ListenerFilter::Marker(..) | ListenerFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: ListenerFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Listener>> {
        debug!("Fetching listeners with {:?}", self.query);
        let session = self.session.clone();
        api::list_listeners(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::Listener>()
            .map_ok(move |inner| Listener::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<Listener>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Listener> {
        debug!("Fetching one listener with {:?}", self.query);
        if self.can_paginate {
            self.query.push(ListenerFilter::Limit(2));
        }

        let inner = api::list_listeners(&self.session, &self.query, false)
            .one::<protocol::Listener>()
            .await?;
        Ok(Listener::new(self.session, inner))
    }
}

impl NewListener {
    pub(crate) fn new<L: Into<LoadBalancerRef>>(
        session: Session,
        load_balancer: L,
        protocol: ListenerProtocol,
        protocol_port: u16,
    ) -> NewListener {
        NewListener {
            session,
            inner: protocol::ListenerCreate {
                admin_state_up: None,
                allowed_cidrs: Vec::new(),
                connection_limit: None,
                default_pool_id: None,
                description: None,
                insert_headers: HashMap::new(),
                loadbalancer_id: load_balancer.into(),
                name: None,
                project_id: None,
                protocol,
                protocol_port,
                tags: Vec::new(),
                timeout_client_data: None,
                timeout_member_connect: None,
                timeout_member_data: None,
                timeout_tcp_inspect: None,
            },
        }
    }

    /// Request creation of the listener.
    pub async fn create(self) -> Result<Listener> {
        if self.inner.loadbalancer_id.as_ref().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Load balancer ID is required to create a listener",
            ));
        }
        if self.inner.protocol_port == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Listener port must be between 1 and 65535",
            ));
        }

        let inner = api::create_listener(&self.session, self.inner).await?;
        Ok(Listener::new(self.session, inner))
    }

    /// Allow connections from this CIDR only (can be repeated).
    pub fn add_allowed_cidr(&mut self, cidr: IpNet) {
        self.inner.allowed_cidrs.push(cidr);
    }

    /// Allow connections from this CIDR only (can be repeated).
    #[inline]
    pub fn with_allowed_cidr(mut self, cidr: IpNet) -> Self {
        self.add_allowed_cidr(cidr);
        self
    }

    /// Insert a header into requests sent to members.
    pub fn add_insert_header<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert_headers.insert(name.into(), value.into());
    }

    /// Insert a header into requests sent to members.
    #[inline]
    pub fn with_insert_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.add_insert_header(name, value);
        self
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
        #[doc = "Set the connection limit."]
        set_connection_limit, with_connection_limit -> connection_limit: optional i32
    }

    creation_field! {
        #[doc = "Set the default pool."]
        set_default_pool, with_default_pool -> default_pool_id: optional PoolRef
    }

    creation_field! {
        #[doc = "Set description of the listener."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set name of the listener."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the frontend client inactivity timeout in milliseconds."]
        set_timeout_client_data, with_timeout_client_data -> timeout_client_data: optional u32
    }

    creation_field! {
        #[doc = "Set the backend member connection timeout in milliseconds."]
        set_timeout_member_connect, with_timeout_member_connect -> timeout_member_connect: optional u32
    }

    creation_field! {
        #[doc = "Set the backend member inactivity timeout in milliseconds."]
        set_timeout_member_data, with_timeout_member_data -> timeout_member_data: optional u32
    }

    creation_field! {
        #[doc = "Set the TCP inspection timeout in milliseconds."]
        set_timeout_tcp_inspect, with_timeout_tcp_inspect -> timeout_tcp_inspect: optional u32
    }
}
