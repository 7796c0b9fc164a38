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

//! Stack resources.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::protocol::{self, StackStatus};
use super::api;
use crate::common::{Link, Refresh};
use crate::{Result, Session};

/// A resource of a stack.
#[derive(Clone, Debug)]
pub struct StackResource {
    session: Session,
    stack_name: String,
    stack_id: String,
    inner: protocol::Resource,
}

#[async_trait]
impl Refresh for StackResource {
    /// Refresh the resource.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_resource(
            &self.session,
            &self.stack_name,
            &self.stack_id,
            &self.inner.resource_name,
        )
        .await?;
        Ok(())
    }
}

impl StackResource {
    pub(crate) fn new(
        session: Session,
        stack_name: String,
        stack_id: String,
        inner: protocol::Resource,
    ) -> StackResource {
        StackResource {
            session,
            stack_name,
            stack_id,
            inner,
        }
    }

    pub(crate) async fn load<S: AsRef<str>>(
        session: Session,
        stack_name: String,
        stack_id: String,
        name: S,
    ) -> Result<StackResource> {
        let inner = api::get_resource(&session, &stack_name, &stack_id, name).await?;
        Ok(StackResource::new(session, stack_name, stack_id, inner))
    }

    transparent_property! {
        /// Resource attributes (only when fetched individually).
        attributes: ref HashMap<String, Value>
    }

    transparent_property! {
        /// Creation date and time.
        creation_time: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        /// Resource description.
        description: ref Option<String>
    }

    transparent_property! {
        /// Links to the resource.
        links: ref Vec<Link>
    }

    transparent_property! {
        /// Logical ID of the resource in the template.
        logical_resource_id: ref String
    }

    /// Resource name.
    #[inline]
    pub fn name(&self) -> &String {
        &self.inner.resource_name
    }

    transparent_property! {
        /// Name of the parent resource (for nested stacks).
        parent_resource: ref Option<String>
    }

    transparent_property! {
        /// ID of the actual resource in its service.
        physical_resource_id: ref Option<String>
    }

    transparent_property! {
        /// Names of resources depending on this one.
        required_by: ref Vec<String>
    }

    /// Resource type.
    #[inline]
    pub fn resource_type(&self) -> &String {
        &self.inner.resource_type
    }

    /// Resource status.
    #[inline]
    pub fn status(&self) -> StackStatus {
        self.inner.resource_status
    }

    /// Reason for the current status.
    #[inline]
    pub fn status_reason(&self) -> Option<&str> {
        self.inner.resource_status_reason.as_deref()
    }

    /// ID of the stack this resource belongs to.
    #[inline]
    pub fn stack_id(&self) -> &String {
        &self.stack_id
    }

    transparent_property! {
        /// Last update date and time.
        updated_time: Option<DateTime<FixedOffset>>
    }

    /// Fetch the resource metadata.
    pub async fn metadata(&self) -> Result<Value> {
        api::get_resource_metadata(
            &self.session,
            &self.stack_name,
            &self.stack_id,
            &self.inner.resource_name,
        )
        .await
    }

    /// Mark the resource as unhealthy.
    pub async fn mark_unhealthy<S: Into<String>>(&mut self, reason: S) -> Result<()> {
        self.set_unhealthy(true, reason.into()).await
    }

    /// Clear the unhealthy mark.
    pub async fn mark_healthy<S: Into<String>>(&mut self, reason: S) -> Result<()> {
        self.set_unhealthy(false, reason.into()).await
    }

    async fn set_unhealthy(&mut self, unhealthy: bool, reason: String) -> Result<()> {
        let request = protocol::MarkUnhealthy {
            mark_unhealthy: unhealthy,
            resource_status_reason: reason,
        };
        api::mark_resource_unhealthy(
            &self.session,
            &self.stack_name,
            &self.stack_id,
            &self.inner.resource_name,
            &request,
        )
        .await?;
        self.refresh().await
    }
}
