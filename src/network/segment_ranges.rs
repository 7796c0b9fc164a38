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

//! Network segment ranges.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{self, NetworkType, SegmentRangeFilter, SegmentRangeSortKey};
use crate::common::{DeletionWaiter, ProjectRef, Query, Refresh};
use crate::{Error, ErrorKind, Result, Session, Sort};

/// A range of segmentation IDs for tenant networks.
#[derive(Clone, Debug)]
pub struct SegmentRange {
    session: Session,
    inner: protocol::SegmentRange,
    dirty: HashSet<&'static str>,
}

/// A query to network segment range list.
#[derive(Clone, Debug)]
pub struct SegmentRangeQuery {
    session: Session,
    query: Query<SegmentRangeFilter>,
    can_paginate: bool,
}

/// A request to create a network segment range.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewSegmentRange {
    session: Session,
    inner: protocol::SegmentRangeCreate,
}

fn check_bounds(minimum: u32, maximum: u32) -> Result<()> {
    if minimum > maximum {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "Minimum segmentation ID {} is greater than maximum {}",
                minimum, maximum
            ),
        ))
    } else {
        Ok(())
    }
}

impl SegmentRange {
    fn new(session: Session, inner: protocol::SegmentRange) -> SegmentRange {
        SegmentRange {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<SegmentRange> {
        let inner = api::get_segment_range(&session, id).await?;
        Ok(SegmentRange::new(session, inner))
    }

    transparent_property! {
        #[doc = "Segmentation IDs still available in this range."]
        available: ref Vec<u32>
    }

    transparent_property! {
        #[doc = "Creation data and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Description of the range."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    /// Whether this range is the default one created from the service configuration.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.inner.default
    }

    transparent_property! {
        #[doc = "Maximum segmentation ID (inclusive)."]
        maximum: u32
    }

    update_field! {
        #[doc = "Update the maximum segmentation ID."]
        set_maximum, with_maximum -> maximum: u32
    }

    transparent_property! {
        #[doc = "Minimum segmentation ID (inclusive)."]
        minimum: u32
    }

    update_field! {
        #[doc = "Update the minimum segmentation ID."]
        set_minimum, with_minimum -> minimum: u32
    }

    transparent_property! {
        #[doc = "Range name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "Network type."]
        network_type: NetworkType
    }

    transparent_property! {
        #[doc = "Physical network (only for VLAN)."]
        physical_network: ref Option<String>
    }

    transparent_property! {
        #[doc = "Project the range is restricted to (if not shared)."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether the range is shared between projects."]
        shared: bool
    }

    transparent_property! {
        #[doc = "Last update data and time (if available)."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Used segmentation IDs mapped to the projects using them."]
        used: ref HashMap<u32, String>
    }

    /// Delete the range.
    pub async fn delete(self) -> Result<DeletionWaiter<SegmentRange>> {
        api::delete_segment_range(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the range is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the range.
    pub async fn save(&mut self) -> Result<()> {
        check_bounds(self.inner.minimum, self.inner.maximum)?;
        let mut update = protocol::SegmentRangeUpdate::default();
        save_fields! {
            self -> update: minimum maximum
        };
        save_option_fields! {
            self -> update: name
        };
        let inner = api::update_segment_range(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for SegmentRange {
    /// Refresh the range.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_segment_range(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl SegmentRangeQuery {
    pub(crate) fn new(session: Session) -> SegmentRangeQuery {
        SegmentRangeQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: SegmentRangeFilter) {
        if let SegmentRangeFilter::Marker(..) | SegmentRangeFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: SegmentRangeFilter) -> Self {
        self.set(filter);
        self
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<SegmentRangeSortKey>) -> Self {
        let (field, direction) = sort.unwrap();
        self.query.push(SegmentRangeFilter::SortKey(field));
        self.query.push(SegmentRangeFilter::SortDir(direction));
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<SegmentRange>> {
        debug!("Fetching network segment ranges with {:?}", self.query);
        let session = self.session.clone();
        api::list_segment_ranges(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::SegmentRange>()
            .map_ok(move |inner| SegmentRange::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<SegmentRange>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<SegmentRange> {
        debug!("Fetching one network segment range with {:?}", self.query);
        if self.can_paginate {
            self.query.push(SegmentRangeFilter::Limit(2));
        }

        let inner = api::list_segment_ranges(&self.session, &self.query, false)
            .one::<protocol::SegmentRange>()
            .await?;
        Ok(SegmentRange::new(self.session, inner))
    }
}

impl NewSegmentRange {
    pub(crate) fn new(
        session: Session,
        network_type: NetworkType,
        minimum: u32,
        maximum: u32,
    ) -> NewSegmentRange {
        NewSegmentRange {
            session,
            inner: protocol::SegmentRangeCreate {
                description: None,
                maximum,
                minimum,
                name: None,
                network_type,
                physical_network: None,
                project_id: None,
                shared: None,
            },
        }
    }

    /// Request creation of the range.
    pub async fn create(self) -> Result<SegmentRange> {
        check_bounds(self.inner.minimum, self.inner.maximum)?;
        let inner = api::create_segment_range(&self.session, self.inner).await?;
        Ok(SegmentRange::new(self.session, inner))
    }

    creation_field! {
        #[doc = "Set description of the range."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set name of the range."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the physical network (VLAN only)."]
        set_physical_network, with_physical_network -> physical_network: optional String
    }

    creation_field! {
        #[doc = "Restrict the range to a project."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set whether the range is shared between projects."]
        set_shared, with_shared -> shared: optional bool
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

    fn sample() -> protocol::SegmentRange {
        serde_json::from_value(json!({
            "id": "59b2f3a1",
            "name": "range1",
            "default": false,
            "shared": false,
            "project_id": "3e2f3a1",
            "network_type": "vxlan",
            "physical_network": "",
            "minimum": 100,
            "maximum": 200,
            "used": {"100": "3e2f3a1"},
            "available": [101, 102]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_properties() {
        let range = SegmentRange::new(session().await, sample());
        assert_eq!(range.network_type(), NetworkType::Vxlan);
        assert!(range.physical_network().is_none());
        assert_eq!(range.used().get(&100).map(String::as_str), Some("3e2f3a1"));
        assert_eq!(range.available(), &vec![101, 102]);
        assert!(!range.is_default());
    }

    #[tokio::test]
    async fn test_update_body() {
        let mut range = SegmentRange::new(session().await, sample());
        range.set_name("range1-updated");
        range.set_maximum(250u32);
        assert!(range.is_dirty());
        let mut update = protocol::SegmentRangeUpdate::default();
        {
            let this = &range;
            save_fields! {
                this -> update: minimum maximum
            };
            save_option_fields! {
                this -> update: name
            };
        }
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"name": "range1-updated", "maximum": 250})
        );
    }

    #[tokio::test]
    async fn test_create_checks_bounds() {
        let err = NewSegmentRange::new(session().await, NetworkType::Vlan, 200, 100)
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
