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

//! Load balancer pools.

use std::collections::HashSet;
use std::net;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};

use super::api;
use super::members::{Member, MemberQuery, NewMember};
use super::protocol::{
    self, LbAlgorithm, MemberSpec, OperatingStatus, PoolFilter, PoolProtocol, ProvisioningStatus,
    SessionPersistence,
};
use crate::common::{DeletionWaiter, ListenerRef, LoadBalancerRef, ProjectRef, Query, Refresh};
use crate::{Error, ErrorKind, Result, Session};

/// A pool of members serving traffic for a listener.
#[derive(Clone, Debug)]
pub struct Pool {
    session: Session,
    inner: protocol::Pool,
    dirty: HashSet<&'static str>,
}

/// A query to pool list.
#[derive(Clone, Debug)]
pub struct PoolQuery {
    session: Session,
    query: Query<PoolFilter>,
    can_paginate: bool,
}

/// A request to create a pool.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewPool {
    session: Session,
    inner: protocol::PoolCreate,
}

impl Pool {
    fn new(session: Session, inner: protocol::Pool) -> Pool {
        Pool {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Pool> {
        let inner = api::get_pool(&session, id).await?;
        Ok(Pool::new(session, inner))
    }

    transparent_property! {
        #[doc = "Whether the pool is administratively up."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Update the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    transparent_property! {
        #[doc = "Creation date and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Pool description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "ID of the health monitor."]
        healthmonitor_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Load balancing algorithm."]
        lb_algorithm: LbAlgorithm
    }

    update_field! {
        #[doc = "Update the load balancing algorithm."]
        set_lb_algorithm, with_lb_algorithm -> lb_algorithm: LbAlgorithm
    }

    /// IDs of the listeners using this pool.
    pub fn listener_ids(&self) -> Vec<&str> {
        self.inner.listeners.iter().map(|x| x.id.as_str()).collect()
    }

    /// IDs of the load balancers of this pool.
    pub fn load_balancer_ids(&self) -> Vec<&str> {
        self.inner.loadbalancers.iter().map(|x| x.id.as_str()).collect()
    }

    /// IDs of the members of this pool.
    pub fn member_ids(&self) -> Vec<&str> {
        self.inner.members.iter().map(|x| x.id.as_str()).collect()
    }

    transparent_property! {
        #[doc = "Pool name."]
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
        #[doc = "Protocol of the pool."]
        protocol: PoolProtocol
    }

    transparent_property! {
        #[doc = "Provisioning status."]
        provisioning_status: ProvisioningStatus
    }

    transparent_property! {
        #[doc = "Session persistence settings."]
        session_persistence: ref Option<SessionPersistence>
    }

    /// Set or clear session persistence.
    pub fn set_session_persistence(&mut self, value: Option<SessionPersistence>) {
        self.inner.session_persistence = value;
        self.dirty.insert("session_persistence");
    }

    /// Set or clear session persistence.
    #[inline]
    pub fn with_session_persistence(mut self, value: Option<SessionPersistence>) -> Self {
        self.set_session_persistence(value);
        self
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

    /// Delete the pool.
    pub async fn delete(self) -> Result<DeletionWaiter<Pool>> {
        api::delete_pool(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(120, 0),
            Duration::new(1, 0),
        ))
    }

    /// Get a member of this pool.
    pub async fn get_member<Id: AsRef<str>>(&self, id: Id) -> Result<Member> {
        Member::load(self.session.clone(), self.inner.id.clone(), id).await
    }

    /// Query members of this pool.
    pub fn find_members(&self) -> MemberQuery {
        MemberQuery::new(self.session.clone(), self.inner.id.clone())
    }

    /// List all members of this pool.
    pub async fn list_members(&self) -> Result<Vec<Member>> {
        self.find_members().all().await
    }

    /// Prepare a new member for this pool.
    pub fn new_member<A: Into<net::IpAddr>>(&self, address: A, protocol_port: u16) -> NewMember {
        NewMember::new(
            self.session.clone(),
            self.inner.id.as_str(),
            address.into(),
            protocol_port,
        )
    }

    /// Replace all members of this pool in one request.
    ///
    /// Members not in the list are removed, new ones are created and the
    /// existing ones (matched by address and port) are updated.
    pub async fn batch_update_members(&mut self, members: Vec<MemberSpec>) -> Result<()> {
        if let Some(bad) = members.iter().find(|m| m.protocol_port == 0) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Port of member {} must not be zero", bad.address),
            ));
        }
        api::batch_update_members(&self.session, &self.inner.id, members).await?;
        self.refresh().await
    }

    /// Whether the pool is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the pool.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::PoolUpdate::default();
        save_fields! {
            self -> update: admin_state_up lb_algorithm session_persistence tags
        };
        save_option_fields! {
            self -> update: description name
        };
        let inner = api::update_pool(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for Pool {
    /// Refresh the pool.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_pool(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl PoolQuery {
    pub(crate) fn new(session: Session) -> PoolQuery {
        PoolQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: PoolFilter) {
        if let PoolFilter::Marker(..) | PoolFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: PoolFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Pool>> {
        debug!("Fetching pools with {:?}", self.query);
        let session = self.session.clone();
        api::list_pools(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::Pool>()
            .map_ok(move |inner| Pool::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<Pool>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Pool> {
        debug!("Fetching one pool with {:?}", self.query);
        if self.can_paginate {
            self.query.push(PoolFilter::Limit(2));
        }

        let inner = api::list_pools(&self.session, &self.query, false)
            .one::<protocol::Pool>()
            .await?;
        Ok(Pool::new(self.session, inner))
    }
}

impl NewPool {
    pub(crate) fn new(
        session: Session,
        protocol: PoolProtocol,
        lb_algorithm: LbAlgorithm,
    ) -> NewPool {
        NewPool {
            session,
            inner: protocol::PoolCreate {
                admin_state_up: None,
                description: None,
                lb_algorithm,
                listener_id: None,
                loadbalancer_id: None,
                name: None,
                project_id: None,
                protocol,
                session_persistence: None,
                tags: Vec::new(),
            },
        }
    }

    /// Request creation of the pool.
    ///
    /// Either a load balancer or a listener must be set.
    pub async fn create(self) -> Result<Pool> {
        if self.inner.loadbalancer_id.is_none() && self.inner.listener_id.is_none() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Either a load balancer or a listener ID is required to create a pool",
            ));
        }

        let inner = api::create_pool(&self.session, self.inner).await?;
        Ok(Pool::new(self.session, inner))
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
        #[doc = "Set description of the pool."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Attach the pool to a listener as its default pool."]
        set_listener, with_listener -> listener_id: optional ListenerRef
    }

    creation_field! {
        #[doc = "Attach the pool to a load balancer."]
        set_load_balancer, with_load_balancer -> loadbalancer_id: optional LoadBalancerRef
    }

    creation_field! {
        #[doc = "Set name of the pool."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set session persistence."]
        set_session_persistence, with_session_persistence -> session_persistence: optional SessionPersistence
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::auth::NoAuth;
    use crate::load_balancer::SessionPersistenceType;

    async fn session() -> Session {
        Session::new(NoAuth::new("http://127.0.0.1:9876").unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_parent() {
        let err = NewPool::new(session().await, PoolProtocol::Http, LbAlgorithm::RoundRobin)
            .with_name("pool1")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_create_body() {
        let request = NewPool::new(session().await, PoolProtocol::Http, LbAlgorithm::LeastConnections)
            .with_listener("l1")
            .with_session_persistence(SessionPersistence {
                persistence_type: SessionPersistenceType::AppCookie,
                cookie_name: Some("session".into()),
            });
        assert_eq!(
            serde_json::to_value(&request.inner).unwrap(),
            json!({
                "lb_algorithm": "LEAST_CONNECTIONS",
                "protocol": "HTTP",
                "listener_id": "l1",
                "session_persistence": {"type": "APP_COOKIE", "cookie_name": "session"}
            })
        );
    }

    #[tokio::test]
    async fn test_clear_session_persistence() {
        let inner = serde_json::from_value(json!({
            "id": "p1",
            "lb_algorithm": "ROUND_ROBIN",
            "protocol": "TCP",
            "session_persistence": {"type": "SOURCE_IP", "cookie_name": null},
            "members": [{"id": "m1"}, {"id": "m2"}]
        }))
        .unwrap();
        let mut pool = Pool::new(session().await, inner);
        assert_eq!(pool.member_ids(), vec!["m1", "m2"]);
        pool.set_session_persistence(None);

        let this = &pool;
        let mut update = protocol::PoolUpdate::default();
        save_fields! {
            this -> update: admin_state_up lb_algorithm session_persistence tags
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"session_persistence": null})
        );
    }

    #[tokio::test]
    async fn test_batch_update_rejects_zero_port() {
        let inner = serde_json::from_value(json!({
            "id": "p1",
            "lb_algorithm": "ROUND_ROBIN",
            "protocol": "TCP"
        }))
        .unwrap();
        let mut pool = Pool::new(session().await, inner);
        let err = pool
            .batch_update_members(vec![MemberSpec::new(
                net::Ipv4Addr::new(192, 0, 2, 1).into(),
                0,
            )])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
