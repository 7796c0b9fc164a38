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

//! Stack management via Orchestration API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};
use serde_json::Value;

use super::protocol::{self, StackFilter, StackSortKey, StackStatus};
use super::resources::StackResource;
use super::template::{DefaultFetcher, Environment, Template, TemplateFetcher};
use super::{api, AbandonedStack, StackOutput, StackPreview};
use crate::common::{Link, Query, Refresh, Waiter};
use crate::{Error, ErrorKind, Result, Session, Sort};

/// Structure representing a single stack.
#[derive(Clone, Debug)]
pub struct Stack {
    session: Session,
    inner: protocol::Stack,
}

/// Summary of a stack from a listing.
#[derive(Clone, Debug)]
pub struct StackSummary {
    session: Session,
    inner: protocol::StackSummary,
}

/// A query to stack list.
#[derive(Clone, Debug)]
pub struct StackQuery {
    session: Session,
    query: Query<StackFilter>,
    can_paginate: bool,
}

/// Templates and the way to fetch their references.
#[derive(Clone, Debug)]
struct Templates {
    template: Option<Template>,
    environment: Option<Environment>,
    fetcher: Option<Arc<dyn TemplateFetcher>>,
}

/// A request to create (or preview) a stack.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until sent"]
pub struct NewStack {
    session: Session,
    inner: protocol::StackCreate,
    templates: Templates,
}

/// A request to update a stack.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until sent"]
pub struct StackUpdate {
    stack: Stack,
    inner: protocol::StackUpdate,
    templates: Templates,
    patch: bool,
}

/// Waiter for a stack operation to finish.
#[derive(Debug)]
pub struct StackStatusWaiter {
    stack: Stack,
}

/// Waiter for a stack to be deleted.
#[derive(Debug)]
pub struct StackDeletionWaiter {
    stack: Stack,
}

fn join_tags(tags: Vec<String>) -> String {
    tags.join(",")
}

impl Templates {
    fn new() -> Templates {
        Templates {
            template: None,
            environment: None,
            fetcher: None,
        }
    }

    /// Resolve all references and return the template, the environment and the files.
    async fn prepare(
        self,
        session: &Session,
    ) -> Result<(Option<String>, Option<String>, HashMap<String, String>)> {
        let fetcher: Arc<dyn TemplateFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(DefaultFetcher::with_client(session.client().inner().clone())),
        };
        let mut files = HashMap::new();

        let template = match self.template {
            Some(mut template) => {
                template.resolve(fetcher.as_ref()).await?;
                let (contents, template_files) = template.into_parts()?;
                files.extend(template_files);
                Some(contents)
            }
            None => None,
        };

        let environment = match self.environment {
            Some(mut environment) => {
                environment.resolve(fetcher.as_ref()).await?;
                let (contents, env_files) = environment.into_parts()?;
                files.extend(env_files);
                Some(contents)
            }
            None => None,
        };

        Ok((template, environment, files))
    }
}

#[async_trait]
impl Refresh for Stack {
    /// Refresh the stack.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_stack(&self.session, &self.inner.stack_name, &self.inner.id).await?;
        Ok(())
    }
}

impl Stack {
    /// Load a Stack object by its name and ID.
    pub(crate) async fn load<S1, S2>(session: Session, name: S1, id: S2) -> Result<Stack>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let inner = api::get_stack(&session, name, id).await?;
        Ok(Stack { session, inner })
    }

    /// Find a Stack object by its name or ID.
    pub(crate) async fn find<Id: AsRef<str>>(session: Session, name_or_id: Id) -> Result<Stack> {
        let inner = api::find_stack(&session, name_or_id).await?;
        Ok(Stack { session, inner })
    }

    transparent_property! {
        /// Stack capabilities.
        capabilities: ref Vec<Value>
    }

    transparent_property! {
        #[doc = "Creation date and time."]
        creation_time: DateTime<FixedOffset>
    }

    transparent_property! {
        #[doc = "Stack description."]
        description: ref Option<String>
    }

    transparent_property! {
        /// Whether rollback on failure is disabled.
        disable_rollback: bool
    }

    transparent_property! {
        #[doc = "Stack unique ID."]
        id: ref String
    }

    transparent_property! {
        /// Links to the stack.
        links: ref Vec<Link>
    }

    /// Stack name.
    #[inline]
    pub fn name(&self) -> &String {
        &self.inner.stack_name
    }

    transparent_property! {
        /// Notification topics.
        notification_topics: ref Vec<Value>
    }

    transparent_property! {
        /// Stack outputs.
        outputs: ref Vec<StackOutput>
    }

    /// Find an output by its name.
    pub fn output<S: AsRef<str>>(&self, key: S) -> Option<&StackOutput> {
        self.inner.outputs.iter().find(|o| o.key == key.as_ref())
    }

    transparent_property! {
        /// Stack parameters (including the implicit `OS::*` ones).
        parameters: ref HashMap<String, Value>
    }

    transparent_property! {
        /// ID of the parent stack (for nested stacks).
        parent: ref Option<String>
    }

    /// Stack status.
    #[inline]
    pub fn status(&self) -> StackStatus {
        self.inner.stack_status
    }

    /// Reason for the current status.
    #[inline]
    pub fn status_reason(&self) -> Option<&str> {
        self.inner.stack_status_reason.as_deref()
    }

    transparent_property! {
        /// Stack tags.
        tags: ref Option<Vec<String>>
    }

    transparent_property! {
        /// Description of the template.
        template_description: ref Option<String>
    }

    transparent_property! {
        /// Stack timeout in minutes.
        timeout_mins: Option<u32>
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_time: Option<DateTime<FixedOffset>>
    }

    /// List resources of this stack.
    pub async fn resources(&self) -> Result<Vec<StackResource>> {
        self.nested_resources(None).await
    }

    /// List resources of this stack including nested stacks up to the given depth.
    pub async fn nested_resources(&self, depth: Option<u32>) -> Result<Vec<StackResource>> {
        let session = self.session.clone();
        let name = self.inner.stack_name.clone();
        let id = self.inner.id.clone();
        api::list_resources(&self.session, &self.inner.stack_name, &self.inner.id, depth)
            .into_stream::<protocol::Resource>()
            .map_ok(|inner| StackResource::new(session.clone(), name.clone(), id.clone(), inner))
            .try_collect()
            .await
    }

    /// Get a resource of this stack by its name.
    pub async fn get_resource<S: AsRef<str>>(&self, name: S) -> Result<StackResource> {
        StackResource::load(
            self.session.clone(),
            self.inner.stack_name.clone(),
            self.inner.id.clone(),
            name,
        )
        .await
    }

    /// Start an update replacing the template of the stack.
    ///
    /// A template is required for this type of update.
    pub fn update(self) -> StackUpdate {
        StackUpdate::new(self, false)
    }

    /// Start an update keeping everything not explicitly provided.
    pub fn patch(self) -> StackUpdate {
        StackUpdate::new(self, true)
    }

    /// Wait for the current operation on the stack to finish.
    pub fn into_waiter(self) -> StackStatusWaiter {
        StackStatusWaiter { stack: self }
    }

    /// Delete the stack.
    pub async fn delete(self) -> Result<StackDeletionWaiter> {
        api::delete_stack(&self.session, &self.inner.stack_name, &self.inner.id).await?;
        Ok(StackDeletionWaiter { stack: self })
    }

    /// Abandon the stack, deleting it while keeping the resources.
    ///
    /// The returned data can be used to adopt the stack again.
    pub async fn abandon(self) -> Result<AbandonedStack> {
        api::abandon_stack(&self.session, &self.inner.stack_name, &self.inner.id).await
    }
}

impl StackSummary {
    transparent_property! {
        #[doc = "Creation date and time."]
        creation_time: DateTime<FixedOffset>
    }

    transparent_property! {
        #[doc = "Stack description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Stack unique ID."]
        id: ref String
    }

    /// Stack name.
    #[inline]
    pub fn name(&self) -> &String {
        &self.inner.stack_name
    }

    /// Stack status.
    #[inline]
    pub fn status(&self) -> StackStatus {
        self.inner.stack_status
    }

    /// Reason for the current status.
    #[inline]
    pub fn status_reason(&self) -> Option<&str> {
        self.inner.stack_status_reason.as_deref()
    }

    transparent_property! {
        /// Stack tags.
        tags: ref Option<Vec<String>>
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_time: Option<DateTime<FixedOffset>>
    }

    /// Get details.
    pub async fn details(&self) -> Result<Stack> {
        Stack::load(self.session.clone(), &self.inner.stack_name, &self.inner.id).await
    }
}

impl StackQuery {
    pub(crate) fn new(session: Session) -> StackQuery {
        StackQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: StackFilter) {
        if let StackFilter::Marker(..) | StackFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: StackFilter) -> Self {
        self.set(filter);
        self
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<StackSortKey>) -> Self {
        let (field, direction) = sort.unwrap();
        self.query.push(StackFilter::SortKey(field));
        self.query.push(StackFilter::SortDir(direction));
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Returns a `TryStream`, which is a stream with each `next`
    /// call returning a `Result`.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<StackSummary>> {
        debug!("Fetching stacks with {:?}", self.query);
        let session = self.session.clone();
        api::list_stacks(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::StackSummary>()
            .map_ok(move |inner| StackSummary {
                session: session.clone(),
                inner,
            })
    }

    /// Execute this request and return all results.
    ///
    /// A convenience shortcut for `self.into_stream().try_collect().await`.
    #[inline]
    pub async fn all(self) -> Result<Vec<StackSummary>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<StackSummary> {
        debug!("Fetching one stack with {:?}", self.query);
        if self.can_paginate {
            // We need only one result. We fetch maximum two to be able
            // to check if the query yieled more than one result.
            self.query.push(StackFilter::Limit(2));
            self.can_paginate = false;
        }

        let inner = api::list_stacks(&self.session, &self.query, false)
            .one::<protocol::StackSummary>()
            .await?;
        Ok(StackSummary {
            session: self.session,
            inner,
        })
    }
}

macro_rules! template_fields {
    () => {
        /// Set the template.
        pub fn set_template(&mut self, template: Template) {
            self.templates.template = Some(template);
        }

        /// Set the template.
        #[inline]
        pub fn with_template(mut self, template: Template) -> Self {
            self.set_template(template);
            self
        }

        /// Set the environment.
        pub fn set_environment(&mut self, environment: Environment) {
            self.templates.environment = Some(environment);
        }

        /// Set the environment.
        #[inline]
        pub fn with_environment(mut self, environment: Environment) -> Self {
            self.set_environment(environment);
            self
        }

        /// Use a custom fetcher for template references.
        ///
        /// By default, references are fetched with the session's HTTP client or read from
        /// the local file system.
        pub fn set_fetcher<F: TemplateFetcher + 'static>(&mut self, fetcher: F) {
            self.templates.fetcher = Some(Arc::new(fetcher));
        }

        /// Use a custom fetcher for template references.
        #[inline]
        pub fn with_fetcher<F: TemplateFetcher + 'static>(mut self, fetcher: F) -> Self {
            self.set_fetcher(fetcher);
            self
        }

        /// Add a parameter.
        pub fn add_parameter<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
            let _ = self.inner.parameters.insert(key.into(), value.into());
        }

        /// Add a parameter.
        #[inline]
        pub fn with_parameter<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
            self.add_parameter(key, value);
            self
        }

        /// Add an extra file.
        ///
        /// Referenced files are added automatically when resolving templates.
        pub fn add_file<K: Into<String>, V: Into<String>>(&mut self, name: K, contents: V) {
            let _ = self.inner.files.insert(name.into(), contents.into());
        }

        /// Set tags.
        pub fn set_tags<I>(&mut self, tags: I)
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            self.inner.tags = Some(join_tags(tags.into_iter().map(Into::into).collect()));
        }

        /// Set tags.
        #[inline]
        pub fn with_tags<I>(mut self, tags: I) -> Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            self.set_tags(tags);
            self
        }

        creation_field! {
            #[doc = "Disable rollback on failure."]
            set_disable_rollback, with_disable_rollback -> disable_rollback: optional bool
        }

        creation_field! {
            #[doc = "Timeout in minutes."]
            set_timeout_mins, with_timeout_mins -> timeout_mins: optional u32
        }
    };
}

impl NewStack {
    /// Start creating a stack.
    pub(crate) fn new<S: Into<String>>(session: Session, name: S) -> NewStack {
        NewStack {
            session,
            inner: protocol::StackCreate {
                stack_name: name.into(),
                ..Default::default()
            },
            templates: Templates::new(),
        }
    }

    template_fields! {}

    /// Adopt existing resources instead of creating them.
    ///
    /// The data is the JSON returned when abandoning a stack.
    pub fn set_adopt_data(&mut self, data: &AbandonedStack) -> Result<()> {
        let data = serde_json::to_string(data).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Cannot serialize adoption data: {}", e),
            )
        })?;
        self.inner.adopt_stack_data = Some(data);
        Ok(())
    }

    /// Adopt existing resources instead of creating them.
    pub fn with_adopt_data(mut self, data: &AbandonedStack) -> Result<Self> {
        self.set_adopt_data(data)?;
        Ok(self)
    }

    creation_field! {
        #[doc = "Raw adoption data (a JSON string)."]
        set_raw_adopt_data, with_raw_adopt_data -> adopt_stack_data: optional String
    }

    async fn into_request(self) -> Result<(Session, protocol::StackCreate)> {
        if self.inner.stack_name.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Missing input for argument [Name]",
            ));
        }
        if self.templates.template.is_none() && self.inner.adopt_stack_data.is_none() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Missing input for argument [Template]",
            ));
        }

        let mut request = self.inner;
        let (template, environment, files) = self.templates.prepare(&self.session).await?;
        request.template = template;
        request.environment = environment;
        request.files.extend(files);
        Ok((self.session, request))
    }

    /// Request creation of the stack.
    pub async fn create(self) -> Result<StackStatusWaiter> {
        let (session, request) = self.into_request().await?;
        let created = api::create_stack(&session, &request).await?;
        let stack = Stack::load(session, &request.stack_name, created.id).await?;
        Ok(StackStatusWaiter { stack })
    }

    /// Preview the stack without creating it.
    pub async fn preview(self) -> Result<StackPreview> {
        let (session, request) = self.into_request().await?;
        api::preview_stack(&session, &request).await
    }
}

impl StackUpdate {
    fn new(stack: Stack, patch: bool) -> StackUpdate {
        StackUpdate {
            stack,
            inner: protocol::StackUpdate::default(),
            templates: Templates::new(),
            patch,
        }
    }

    template_fields! {}

    /// Send the update request.
    pub async fn send(self) -> Result<StackStatusWaiter> {
        if !self.patch && self.templates.template.is_none() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Missing input for argument [Template]",
            ));
        }

        let mut stack = self.stack;
        let mut request = self.inner;
        let (template, environment, files) = self.templates.prepare(&stack.session).await?;
        request.template = template;
        request.environment = environment;
        request.files.extend(files);

        if self.patch {
            api::patch_stack(&stack.session, &stack.inner.stack_name, &stack.inner.id, &request)
                .await?;
        } else {
            api::update_stack(&stack.session, &stack.inner.stack_name, &stack.inner.id, &request)
                .await?;
        }

        stack.refresh().await?;
        Ok(StackStatusWaiter { stack })
    }
}

impl StackStatusWaiter {
    /// Current state of the stack.
    #[inline]
    pub fn current_state(&self) -> &Stack {
        &self.stack
    }
}

#[async_trait]
impl Waiter for StackStatusWaiter {
    type Output = Stack;

    fn default_wait_timeout(&self) -> Option<Duration> {
        match self.stack.inner.timeout_mins {
            Some(mins) => Some(Duration::from_secs(u64::from(mins) * 60 + 60)),
            None => Some(Duration::from_secs(3600)),
        }
    }

    fn default_delay(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn timeout_error(&self) -> Error {
        Error::new(
            ErrorKind::OperationTimedOut,
            format!(
                "Timeout waiting for stack {} to finish, current status is {}",
                self.stack.id(),
                self.stack.status()
            ),
        )
    }

    async fn poll(&mut self) -> Result<Option<Stack>> {
        self.stack.refresh().await?;
        let status = self.stack.status();
        if status.is_failure() {
            debug!(
                "Operation on stack {} failed: {:?}",
                self.stack.id(),
                self.stack.status_reason()
            );
            Err(Error::new(
                ErrorKind::OperationFailed,
                format!(
                    "Stack {} got into status {}: {}",
                    self.stack.id(),
                    status,
                    self.stack.status_reason().unwrap_or("unknown reason")
                ),
            ))
        } else if status.is_in_progress() {
            trace!(
                "Still waiting for stack {}, current status is {}",
                self.stack.id(),
                status
            );
            Ok(None)
        } else {
            debug!("Stack {} reached status {}", self.stack.id(), status);
            Ok(Some(self.stack.clone()))
        }
    }
}

impl StackDeletionWaiter {
    /// Current state of the stack.
    #[inline]
    pub fn current_state(&self) -> &Stack {
        &self.stack
    }
}

#[async_trait]
impl Waiter for StackDeletionWaiter {
    type Output = ();

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
                "Timeout waiting for stack {} to be deleted, current status is {}",
                self.stack.id(),
                self.stack.status()
            ),
        )
    }

    async fn poll(&mut self) -> Result<Option<()>> {
        match self.stack.refresh().await {
            Ok(()) => match self.stack.status() {
                StackStatus::DeleteComplete => {
                    debug!("Stack {} was deleted", self.stack.id());
                    Ok(Some(()))
                }
                StackStatus::DeleteFailed => Err(Error::new(
                    ErrorKind::OperationFailed,
                    format!(
                        "Failed to delete stack {}: {}",
                        self.stack.id(),
                        self.stack.status_reason().unwrap_or("unknown reason")
                    ),
                )),
                other => {
                    trace!(
                        "Still waiting for stack {} to be deleted, current status is {}",
                        self.stack.id(),
                        other
                    );
                    Ok(None)
                }
            },
            Err(e) if e.kind() == ErrorKind::ResourceNotFound => {
                debug!("Stack {} was deleted", self.stack.id());
                Ok(Some(()))
            }
            Err(e) => {
                debug!(
                    "Failed to delete stack {} - cannot refresh: {}",
                    self.stack.id(),
                    e
                );
                Err(e)
            }
        }
    }
}
