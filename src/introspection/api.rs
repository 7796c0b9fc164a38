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

//! Bare Metal Introspection API calls.

use super::protocol::*;
use crate::common::{NextLink, Pager, Query};
use crate::services::{GenericService, BAREMETAL_INTROSPECTION};
use crate::{Result, Session};

/// Start introspection of a node.
pub async fn start_introspection<S: AsRef<str>>(
    session: &Session,
    node: S,
    manage_boot: Option<bool>,
) -> Result<()> {
    debug!("Starting introspection of node {}", node.as_ref());
    let mut request = session.post(BAREMETAL_INTROSPECTION, &["introspection", node.as_ref()]);
    if let Some(value) = manage_boot {
        request = request.query(&[("manage_boot", value)]);
    }
    let _ = request.send().await?;
    debug!("Introspection of node {} was started", node.as_ref());
    Ok(())
}

/// Get introspection status of a node.
pub async fn get_introspection<S: AsRef<str>>(
    session: &Session,
    node: S,
) -> Result<IntrospectionStatus> {
    trace!("Fetching introspection status of node {}", node.as_ref());
    let result: IntrospectionStatus = session
        .get(BAREMETAL_INTROSPECTION, &["introspection", node.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", result);
    Ok(result)
}

/// List introspection statuses.
pub fn list_introspections(
    session: &Session,
    query: &Query<IntrospectionFilter>,
    paginate: bool,
) -> Pager<GenericService> {
    trace!("Listing introspections with {:?}", query);
    let pager = Pager::new(
        session
            .get(BAREMETAL_INTROSPECTION, &["introspection"])
            .query(query),
        "introspection",
    );
    if paginate {
        pager.linked(NextLink::Links("introspection_links".into()))
    } else {
        pager
    }
}

/// Abort introspection of a node.
pub async fn abort_introspection<S: AsRef<str>>(session: &Session, node: S) -> Result<()> {
    debug!("Aborting introspection of node {}", node.as_ref());
    let _ = session
        .post(
            BAREMETAL_INTROSPECTION,
            &["introspection", node.as_ref(), "abort"],
        )
        .send()
        .await?;
    debug!("Introspection of node {} is being aborted", node.as_ref());
    Ok(())
}

/// Get the stored introspection data of a node.
pub async fn get_introspection_data<S: AsRef<str>>(
    session: &Session,
    node: S,
) -> Result<IntrospectionData> {
    trace!("Fetching introspection data of node {}", node.as_ref());
    session
        .get(
            BAREMETAL_INTROSPECTION,
            &["introspection", node.as_ref(), "data"],
        )
        .fetch()
        .await
}

/// Process the stored unprocessed data again.
pub async fn reapply_introspection<S: AsRef<str>>(session: &Session, node: S) -> Result<()> {
    debug!("Reapplying introspection data of node {}", node.as_ref());
    let _ = session
        .post(
            BAREMETAL_INTROSPECTION,
            &["introspection", node.as_ref(), "data", "unprocessed"],
        )
        .send()
        .await?;
    debug!("Reapplying introspection data of node {} was accepted", node.as_ref());
    Ok(())
}
