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

//! Introspection status and actions.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{self, IntrospectionData, IntrospectionFilter, IntrospectionState};
use crate::common::{Link, NodeRef, Query, Refresh, Waiter};
use crate::{Error, ErrorKind, Result, Session};

/// Introspection status of a node.
#[derive(Clone, Debug)]
pub struct Introspection {
    session: Session,
    inner: protocol::IntrospectionStatus,
}

/// A query to the introspection list.
#[derive(Clone, Debug)]
pub struct IntrospectionQuery {
    session: Session,
    query: Query<IntrospectionFilter>,
    can_paginate: bool,
}

/// A request to start introspection.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until started"]
pub struct NewIntrospection {
    session: Session,
    node: NodeRef,
    manage_boot: Option<bool>,
}

/// Waiter for introspection to finish.
#[derive(Debug)]
pub struct IntrospectionWaiter {
    introspection: Introspection,
}

#[async_trait]
impl Refresh for Introspection {
    /// Refresh the introspection status.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_introspection(&self.session, &self.inner.id).await?;
        Ok(())
    }
}

impl Introspection {
    pub(crate) async fn load<S: AsRef<str>>(session: Session, node: S) -> Result<Introspection> {
        let inner = api::get_introspection(&session, node).await?;
        Ok(Introspection { session, inner })
    }

    transparent_property! {
        /// Error message (if any).
        error: ref Option<String>
    }

    transparent_property! {
        /// When the introspection finished.
        finished_at: Option<DateTime<FixedOffset>>
    }

    /// ID of the node.
    #[inline]
    pub fn id(&self) -> &String {
        &self.inner.id
    }

    /// Whether the introspection is finished.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.inner.finished
    }

    transparent_property! {
        /// Links to the introspection.
        links: ref Vec<Link>
    }

    transparent_property! {
        /// When the introspection started.
        started_at: DateTime<FixedOffset>
    }

    transparent_property! {
        /// Introspection state.
        state: IntrospectionState
    }

    /// Abort the introspection.
    pub async fn abort(&mut self) -> Result<()> {
        api::abort_introspection(&self.session, &self.inner.id).await?;
        self.refresh().await
    }

    /// Fetch the stored introspection data.
    pub async fn data(&self) -> Result<IntrospectionData> {
        api::get_introspection_data(&self.session, &self.inner.id).await
    }

    /// Process the stored data again.
    ///
    /// Only possible for finished introspection.
    pub async fn reapply(self) -> Result<IntrospectionWaiter> {
        let mut introspection = self;
        api::reapply_introspection(&introspection.session, &introspection.inner.id).await?;
        introspection.refresh().await?;
        Ok(IntrospectionWaiter { introspection })
    }

    /// Wait for the introspection to finish.
    pub fn into_waiter(self) -> IntrospectionWaiter {
        IntrospectionWaiter {
            introspection: self,
        }
    }
}

impl IntrospectionQuery {
    pub(crate) fn new(session: Session) -> IntrospectionQuery {
        IntrospectionQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add marker to the request.
    ///
    /// Using this disables automatic pagination.
    pub fn with_marker<T: Into<String>>(mut self, marker: T) -> Self {
        self.can_paginate = false;
        self.query.push(IntrospectionFilter::Marker(marker.into()));
        self
    }

    /// Add limit to the request.
    ///
    /// Using this disables automatic pagination.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.can_paginate = false;
        self.query.push(IntrospectionFilter::Limit(limit));
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Introspection>> {
        debug!("Fetching introspections with {:?}", self.query);
        let session = self.session.clone();
        api::list_introspections(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::IntrospectionStatus>()
            .map_ok(move |inner| Introspection {
                session: session.clone(),
                inner,
            })
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<Introspection>> {
        self.into_stream().try_collect().await
    }
}

impl NewIntrospection {
    pub(crate) fn new<N: Into<NodeRef>>(session: Session, node: N) -> NewIntrospection {
        NewIntrospection {
            session,
            node: node.into(),
            manage_boot: None,
        }
    }

    /// Whether the service should manage boot and power of the node.
    ///
    /// Defaults to the service configuration.
    pub fn set_manage_boot(&mut self, value: bool) {
        self.manage_boot = Some(value);
    }

    /// Whether the service should manage boot and power of the node.
    #[inline]
    pub fn with_manage_boot(mut self, value: bool) -> Self {
        self.set_manage_boot(value);
        self
    }

    /// Start the introspection.
    pub async fn start(self) -> Result<IntrospectionWaiter> {
        api::start_introspection(&self.session, &self.node, self.manage_boot).await?;
        let introspection = Introspection::load(self.session, &self.node).await?;
        Ok(IntrospectionWaiter { introspection })
    }
}

impl IntrospectionWaiter {
    /// Current state of the introspection.
    #[inline]
    pub fn current_state(&self) -> &Introspection {
        &self.introspection
    }
}

#[async_trait]
impl Waiter for IntrospectionWaiter {
    type Output = Introspection;

    fn default_wait_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(3600))
    }

    fn default_delay(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn timeout_error(&self) -> Error {
        Error::new(
            ErrorKind::OperationTimedOut,
            format!(
                "Timeout waiting for introspection of node {} to finish, current state is {}",
                self.introspection.id(),
                self.introspection.state()
            ),
        )
    }

    async fn poll(&mut self) -> Result<Option<Introspection>> {
        self.introspection.refresh().await?;
        if !self.introspection.is_finished() {
            trace!(
                "Still waiting for introspection of node {}, current state is {}",
                self.introspection.id(),
                self.introspection.state()
            );
            return Ok(None);
        }

        if let Some(ref error) = self.introspection.inner.error {
            debug!(
                "Introspection of node {} failed: {}",
                self.introspection.id(),
                error
            );
            Err(Error::new(
                ErrorKind::OperationFailed,
                format!(
                    "Introspection of node {} failed: {}",
                    self.introspection.id(),
                    error
                ),
            ))
        } else {
            debug!("Introspection of node {} finished", self.introspection.id());
            Ok(Some(self.introspection.clone()))
        }
    }
}
