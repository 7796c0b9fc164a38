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

//! Orchestration API calls.
//!
//! Heat nests error messages next to other top-level fields, so all calls go
//! through the crate's own response check.

use reqwest::Method;
use serde_json::Value;

use super::protocol::*;
use crate::common::{Pager, Query};
use crate::error::{fetch_checked, send_checked};
use crate::services::{OrchestrationService, ORCHESTRATION};
use crate::{Result, Session};

/// Create a stack.
pub async fn create_stack(session: &Session, request: &StackCreate) -> Result<StackIdentity> {
    debug!("Creating a stack {}", request.stack_name);
    let root: StackIdentityRoot =
        fetch_checked(session.post(ORCHESTRATION, &["stacks"]).json(request)).await?;
    debug!("Created stack {} with ID {}", request.stack_name, root.stack.id);
    Ok(root.stack)
}

/// Preview a stack.
pub async fn preview_stack(session: &Session, request: &StackCreate) -> Result<StackPreview> {
    debug!("Previewing a stack {}", request.stack_name);
    let builder = session
        .post(ORCHESTRATION, &["stacks", "preview"])
        .json(request);
    let root: StackPreviewRoot = fetch_checked(builder).await?;
    trace!("Received stack preview {:?}", root.stack);
    Ok(root.stack)
}

/// Get a stack by its name and ID.
pub async fn get_stack<S1, S2>(session: &Session, name: S1, id: S2) -> Result<Stack>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    trace!("Fetching stack {}/{}", name.as_ref(), id.as_ref());
    let builder = session.get(ORCHESTRATION, &["stacks", name.as_ref(), id.as_ref()]);
    let root: StackRoot = fetch_checked(builder).await?;
    trace!("Received {:?}", root.stack);
    Ok(root.stack)
}

/// Find a stack by its name or ID.
///
/// The service redirects to the canonical stack URL.
pub async fn find_stack<S: AsRef<str>>(session: &Session, name_or_id: S) -> Result<Stack> {
    trace!("Looking for stack {}", name_or_id.as_ref());
    let builder = session.get(ORCHESTRATION, &["stacks", name_or_id.as_ref()]);
    let root: StackRoot = fetch_checked(builder).await?;
    trace!("Received {:?}", root.stack);
    Ok(root.stack)
}

/// List stacks.
pub fn list_stacks(
    session: &Session,
    query: &Query<StackFilter>,
    paginate: bool,
) -> Pager<OrchestrationService> {
    trace!("Listing stacks with {:?}", query);
    let pager = Pager::new(session.get(ORCHESTRATION, &["stacks"]).query(query), "stacks");
    if paginate {
        pager.marker("id")
    } else {
        pager
    }
}

/// Update a stack, replacing its template.
pub async fn update_stack<S1, S2>(
    session: &Session,
    name: S1,
    id: S2,
    request: &StackUpdate,
) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug!("Updating stack {}/{}", name.as_ref(), id.as_ref());
    let builder = session
        .put(ORCHESTRATION, &["stacks", name.as_ref(), id.as_ref()])
        .json(request);
    let _ = send_checked(builder).await?;
    debug!("Update of stack {} was accepted", id.as_ref());
    Ok(())
}

/// Update a stack, keeping the existing values for everything not provided.
pub async fn patch_stack<S1, S2>(
    session: &Session,
    name: S1,
    id: S2,
    request: &StackUpdate,
) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug!("Patching stack {}/{}", name.as_ref(), id.as_ref());
    let builder = session
        .request(
            ORCHESTRATION,
            Method::PATCH,
            &["stacks", name.as_ref(), id.as_ref()],
        )
        .json(request);
    let _ = send_checked(builder).await?;
    debug!("Patch of stack {} was accepted", id.as_ref());
    Ok(())
}

/// Delete a stack.
pub async fn delete_stack<S1, S2>(session: &Session, name: S1, id: S2) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug!("Deleting stack {}/{}", name.as_ref(), id.as_ref());
    let builder = session.delete(ORCHESTRATION, &["stacks", name.as_ref(), id.as_ref()]);
    let _ = send_checked(builder).await?;
    debug!("Stack {} was scheduled for deletion", id.as_ref());
    Ok(())
}

/// Abandon a stack, deleting it without deleting its resources.
pub async fn abandon_stack<S1, S2>(session: &Session, name: S1, id: S2) -> Result<AbandonedStack>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug!("Abandoning stack {}/{}", name.as_ref(), id.as_ref());
    let builder = session.delete(
        ORCHESTRATION,
        &["stacks", name.as_ref(), id.as_ref(), "abandon"],
    );
    let result: AbandonedStack = fetch_checked(builder).await?;
    debug!("Stack {} was abandoned", id.as_ref());
    Ok(result)
}

/// List resources of a stack.
pub fn list_resources<S1, S2>(
    session: &Session,
    name: S1,
    id: S2,
    nested_depth: Option<u32>,
) -> Pager<OrchestrationService>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    trace!(
        "Listing resources of stack {}/{} with nested depth {:?}",
        name.as_ref(),
        id.as_ref(),
        nested_depth
    );
    let mut request = session.get(
        ORCHESTRATION,
        &["stacks", name.as_ref(), id.as_ref(), "resources"],
    );
    if let Some(depth) = nested_depth {
        request = request.query(&[("nested_depth", depth)]);
    }
    Pager::new(request, "resources")
}

/// Get a stack resource.
pub async fn get_resource<S1, S2, S3>(
    session: &Session,
    name: S1,
    id: S2,
    resource: S3,
) -> Result<Resource>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    S3: AsRef<str>,
{
    trace!(
        "Fetching resource {} of stack {}/{}",
        resource.as_ref(),
        name.as_ref(),
        id.as_ref()
    );
    let builder = session.get(
        ORCHESTRATION,
        &[
            "stacks",
            name.as_ref(),
            id.as_ref(),
            "resources",
            resource.as_ref(),
        ],
    );
    let root: ResourceRoot = fetch_checked(builder).await?;
    trace!("Received {:?}", root.resource);
    Ok(root.resource)
}

/// Get metadata of a stack resource.
pub async fn get_resource_metadata<S1, S2, S3>(
    session: &Session,
    name: S1,
    id: S2,
    resource: S3,
) -> Result<Value>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    S3: AsRef<str>,
{
    trace!(
        "Fetching metadata of resource {} of stack {}/{}",
        resource.as_ref(),
        name.as_ref(),
        id.as_ref()
    );
    let builder = session.get(
        ORCHESTRATION,
        &[
            "stacks",
            name.as_ref(),
            id.as_ref(),
            "resources",
            resource.as_ref(),
            "metadata",
        ],
    );
    let root: ResourceMetadataRoot = fetch_checked(builder).await?;
    Ok(root.metadata)
}

/// Mark a stack resource as (un)healthy.
pub async fn mark_resource_unhealthy<S1, S2, S3>(
    session: &Session,
    name: S1,
    id: S2,
    resource: S3,
    request: &MarkUnhealthy,
) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    S3: AsRef<str>,
{
    debug!(
        "Setting unhealthy={} on resource {} of stack {}/{}",
        request.mark_unhealthy,
        resource.as_ref(),
        name.as_ref(),
        id.as_ref()
    );
    let builder = session
        .request(
            ORCHESTRATION,
            Method::PATCH,
            &[
                "stacks",
                name.as_ref(),
                id.as_ref(),
                "resources",
                resource.as_ref(),
            ],
        )
        .json(request);
    let _ = send_checked(builder).await?;
    Ok(())
}
