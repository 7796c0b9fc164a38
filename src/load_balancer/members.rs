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

//! Pool members.

use std::collections::HashSet;
use std::net;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{self, MemberFilter, MemberSpec, OperatingStatus, ProvisioningStatus};
use crate::common::{DeletionWaiter, PoolRef, ProjectRef, Query, Refresh, SubnetRef};
use crate::{Error, ErrorKind, Result, Session};

/// A member of a pool.
#[derive(Clone, Debug)]
pub struct Member {
    session: Session,
    pool_id: String,
    inner: protocol::Member,
    dirty: HashSet<&'static str>,
}

/// A query to pool member list.
#[derive(Clone, Debug)]
pub struct MemberQuery {
    session: Session,
    pool_id: String,
    query: Query<MemberFilter>,
    can_paginate: bool,
}

/// A request to create a pool member.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewMember {
    session: Session,
    pool: PoolRef,
    inner: MemberSpec,
}

impl Member {
    fn new(session: Session, pool_id: String, inner: protocol::Member) -> Member {
        Member {
            session,
            pool_id,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(
        session: Session,
        pool_id: String,
        id: Id,
    ) -> Result<Member> {
        let inner = api::get_member(&session, &pool_id, id).await?;
        Ok(Member::new(session, pool_id, inner))
    }

    transparent_property! {
        #[doc = "IP address of the member."]
        address: net::IpAddr
    }

    transparent_property! {
        #[doc = "Whether the member is administratively up."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Update the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    transparent_property! {
        #[doc = "Whether the member is a backup."]
        backup: bool
    }

    update_field! {
        #[doc = "Update whether the member is a backup."]
        set_backup, with_backup -> backup: bool
    }

    transparent_property! {
        #[doc = "Creation date and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Alternative address for health monitoring."]
        monitor_address: Option<net::IpAddr>
    }

    update_field! {
        #[doc = "Update the health monitoring address."]
        set_monitor_address, with_monitor_address -> monitor_address: optional net::IpAddr
    }

    transparent_property! {
        #[doc = "Alternative port for health monitoring."]
        monitor_port: Option<u16>
    }

    update_field! {
        #[doc = "Update the health monitoring port."]
        set_monitor_port, with_monitor_port -> monitor_port: optional u16
    }

    transparent_property! {
        #[doc = "Member name."]
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

    /// ID of the pool this member belongs to.
    #[inline]
    pub fn pool_id(&self) -> &String {
        &self.pool_id
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Port on which the member listens."]
        protocol_port: u16
    }

    transparent_property! {
        #[doc = "Provisioning status."]
        provisioning_status: ProvisioningStatus
    }

    transparent_property! {
        #[doc = "Subnet of the member address."]
        subnet_id: ref Option<String>
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
        #[doc = "Relative weight of the member."]
        weight: Option<u16>
    }

    update_field! {
        #[doc = "Update the weight."]
        set_weight, with_weight -> weight: optional u16
    }

    /// Delete the member.
    pub async fn delete(self) -> Result<DeletionWaiter<Member>> {
        api::delete_member(&self.session, &self.pool_id, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(120, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the member is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the member.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::MemberUpdate::default();
        save_fields! {
            self -> update: admin_state_up backup tags
        };
        save_option_fields! {
            self -> update: monitor_address monitor_port name weight
        };
        let inner =
            api::update_member(&self.session, &self.pool_id, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for Member {
    /// Refresh the member.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_member(&self.session, &self.pool_id, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl MemberQuery {
    pub(crate) fn new(session: Session, pool_id: String) -> MemberQuery {
        MemberQuery {
            session,
            pool_id,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: MemberFilter) {
        if let MemberFilter::Marker(..) | MemberFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: MemberFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Member>> {
        debug!(
            "Fetching members of pool {} with {:?}",
            self.pool_id, self.query
        );
        let session = self.session.clone();
        let pool_id = self.pool_id.clone();
        api::list_members(&self.session, &self.pool_id, &self.query, self.can_paginate)
            .into_stream::<protocol::Member>()
            .map_ok(move |inner| Member::new(session.clone(), pool_id.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<Member>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Member> {
        debug!(
            "Fetching one member of pool {} with {:?}",
            self.pool_id, self.query
        );
        if self.can_paginate {
            self.query.push(MemberFilter::Limit(2));
        }

        let inner = api::list_members(&self.session, &self.pool_id, &self.query, false)
            .one::<protocol::Member>()
            .await?;
        Ok(Member::new(self.session, self.pool_id, inner))
    }
}

impl NewMember {
    pub(crate) fn new<P: Into<PoolRef>>(
        session: Session,
        pool: P,
        address: net::IpAddr,
        protocol_port: u16,
    ) -> NewMember {
        NewMember {
            session,
            pool: pool.into(),
            inner: MemberSpec::new(address, protocol_port),
        }
    }

    /// Request creation of the member.
    pub async fn create(self) -> Result<Member> {
        if self.pool.as_ref().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Pool ID is required to create a member",
            ));
        }
        if self.inner.protocol_port == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Member port must be between 1 and 65535",
            ));
        }

        let pool_id: String = self.pool.into();
        let inner = api::create_member(&self.session, &pool_id, self.inner).await?;
        Ok(Member::new(self.session, pool_id, inner))
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
        #[doc = "Mark the member as a backup."]
        set_backup, with_backup -> backup: optional bool
    }

    creation_field! {
        #[doc = "Set the health monitoring address."]
        set_monitor_address, with_monitor_address -> monitor_address: optional net::IpAddr
    }

    creation_field! {
        #[doc = "Set the health monitoring port."]
        set_monitor_port, with_monitor_port -> monitor_port: optional u16
    }

    creation_field! {
        #[doc = "Set name of the member."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the subnet of the member address."]
        set_subnet, with_subnet -> subnet_id: optional SubnetRef
    }

    creation_field! {
        #[doc = "Set the relative weight."]
        set_weight, with_weight -> weight: optional u16
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
    async fn test_create_validation() {
        let address = net::IpAddr::from(net::Ipv4Addr::new(192, 0, 2, 16));
        let err = NewMember::new(session().await, "", address, 80)
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = NewMember::new(session().await, "pool", address, 0)
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_update_body() {
        let inner = serde_json::from_value(json!({
            "id": "m1",
            "address": "192.0.2.16",
            "protocol_port": 80,
            "weight": 1,
            "backup": false
        }))
        .unwrap();
        let mut member = Member::new(session().await, "p1".into(), inner);
        member.set_weight(5u16);
        member.set_backup(true);

        let this = &member;
        let mut update = protocol::MemberUpdate::default();
        save_fields! {
            this -> update: admin_state_up backup tags
        };
        save_option_fields! {
            this -> update: monitor_address monitor_port name weight
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"backup": true, "weight": 5})
        );
    }
}
