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

//! Bare Metal API calls.

use std::collections::HashMap;

use json_patch::Patch;
use reqwest::Method;

use super::constants::*;
use super::inventory::InventoryData;
use super::protocol::*;
use super::types::*;
use crate::common::{ApiVersion, NextLink, Pager, Query};
use crate::services::{BareMetalService, VersionedService, BAREMETAL};
use crate::{Error, ErrorKind, Result, Session};

async fn node_api_version(session: &Session) -> Result<ApiVersion> {
    session
        .pick_api_version(
            BAREMETAL,
            [
                API_VERSION_MINIMUM,
                API_VERSION_AUTOMATED_CLEAN,
                API_VERSION_PROTECTED,
                API_VERSION_CONDUCTORS,
                API_VERSION_OWNER,
                API_VERSION_DESCRIPTION,
                API_VERSION_ALLOCATIONS,
                API_VERSION_RETIRED,
                API_VERSION_LESSEE,
                API_VERSION_NETWORK_DATA,
                API_VERSION_BOOT_MODE,
                API_VERSION_SHARDS,
                API_VERSION_CHILD_NODES,
            ],
        )
        .await?
        .ok_or_else(|| {
            Error::new(
                ErrorKind::IncompatibleApiVersion,
                "BareMetal API version 1.46 (Rocky) or newer is required",
            )
        })
}

fn node_query_version(query: &Query<NodeFilter>) -> ApiVersion {
    let mut result = API_VERSION_MINIMUM;
    for item in query.iter() {
        let required_version = match item {
            NodeFilter::Conductor(..) => API_VERSION_CONDUCTORS,
            NodeFilter::DescriptionContains(..) => API_VERSION_DESCRIPTION,
            NodeFilter::Lessee(..) => API_VERSION_LESSEE,
            NodeFilter::Owner(..) => API_VERSION_OWNER,
            NodeFilter::Project(..) => API_VERSION_LESSEE,
            NodeFilter::Retired(..) => API_VERSION_RETIRED,
            NodeFilter::Sharded(..) | NodeFilter::ShardIn(..) => API_VERSION_SHARDS,
            NodeFilter::SortKey(key) => match key {
                NodeSortKey::AutomatedClean => API_VERSION_AUTOMATED_CLEAN,
                NodeSortKey::Protected => API_VERSION_PROTECTED,
                NodeSortKey::Owner => API_VERSION_OWNER,
                NodeSortKey::Description => API_VERSION_DESCRIPTION,
                NodeSortKey::AllocationID => API_VERSION_ALLOCATIONS,
                NodeSortKey::Retired => API_VERSION_RETIRED,
                NodeSortKey::Lessee => API_VERSION_LESSEE,
                NodeSortKey::Shard => API_VERSION_SHARDS,
                _ => API_VERSION_MINIMUM,
            },
            NodeFilter::IncludeChildren(..) | NodeFilter::ParentNode(..) => API_VERSION_CHILD_NODES,
            _ => API_VERSION_MINIMUM,
        };
        result = std::cmp::max(result, required_version);
    }
    result
}

fn provision_version(request: &ProvisionStateRequest) -> ApiVersion {
    let mut result = API_VERSION_MINIMUM;
    if let Some(ConfigDrive::Contents { .. }) = request.configdrive {
        result = API_VERSION_CONFIGDRIVE_DICT;
    }
    if !request.deploy_steps.is_empty() {
        result = std::cmp::max(result, API_VERSION_DEPLOY_STEPS);
    }
    match request.target {
        ProvisionAction::Unhold => std::cmp::max(result, API_VERSION_UNHOLD),
        ProvisionAction::Service => std::cmp::max(result, API_VERSION_SERVICE),
        _ => result,
    }
}

fn list_request(
    session: &Session,
    path: &[&str],
    query: &Query<NodeFilter>,
    paginate: bool,
) -> Pager<BareMetalService> {
    let (name, value) = BAREMETAL.get_version_header(node_query_version(query));
    let pager =
        Pager::new(session.get(BAREMETAL, path).query(query), "nodes").with_header(name, value);
    if paginate {
        pager.linked(NextLink::Field("next".into()))
    } else {
        pager
    }
}

/// Get a node.
pub async fn get_node<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<Node> {
    let api_version = node_api_version(session).await?;
    let root: Node = session
        .get(BAREMETAL, &["nodes", id_or_name.as_ref()])
        .api_version(api_version)
        .fetch()
        .await?;
    trace!("Received {:?}", root);
    Ok(root)
}

/// List nodes.
pub fn list_nodes(
    session: &Session,
    query: &Query<NodeFilter>,
    paginate: bool,
) -> Pager<BareMetalService> {
    trace!("Listing baremetal nodes with {:?}", query);
    list_request(session, &["nodes"], query, paginate)
}

/// List nodes detailed.
pub fn list_nodes_detailed(
    session: &Session,
    query: &Query<NodeFilter>,
    paginate: bool,
) -> Pager<BareMetalService> {
    trace!("Listing detailed baremetal nodes with {:?}", query);
    list_request(session, &["nodes", "detail"], query, paginate)
}

/// Create a node.
pub async fn create_node(session: &Session, request: &NodeCreate) -> Result<Node> {
    debug!("Creating a baremetal node with {:?}", request);
    let api_version = node_api_version(session).await?;
    let node: Node = session
        .post(BAREMETAL, &["nodes"])
        .api_version(api_version)
        .json(request)
        .fetch()
        .await?;
    debug!("Created baremetal node {}", node.id);
    Ok(node)
}

/// Update a node with a JSON patch.
pub async fn update_node<S: AsRef<str>>(session: &Session, id: S, patch: &Patch) -> Result<Node> {
    debug!("Updating baremetal node {} with {:?}", id.as_ref(), patch);
    let api_version = node_api_version(session).await?;
    let node: Node = session
        .request(BAREMETAL, Method::PATCH, &["nodes", id.as_ref()])
        .api_version(api_version)
        .json(patch)
        .fetch()
        .await?;
    trace!("Received updated node {:?}", node);
    Ok(node)
}

/// Delete a node.
pub async fn delete_node<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting baremetal node {}", id.as_ref());
    let _ = session
        .delete(BAREMETAL, &["nodes", id.as_ref()])
        .api_version(API_VERSION_MINIMUM)
        .send()
        .await?;
    debug!("Baremetal node {} was deleted", id.as_ref());
    Ok(())
}

/// Request a power state change.
pub async fn set_power_state<S: AsRef<str>>(
    session: &Session,
    id: S,
    request: &PowerStateRequest,
) -> Result<()> {
    debug!(
        "Requesting power state {} for baremetal node {}",
        request.target,
        id.as_ref()
    );
    let _ = session
        .put(BAREMETAL, &["nodes", id.as_ref(), "states", "power"])
        .api_version(API_VERSION_MINIMUM)
        .json(request)
        .send()
        .await?;
    Ok(())
}

/// Request a provision state change.
pub async fn set_provision_state<S: AsRef<str>>(
    session: &Session,
    id: S,
    request: &ProvisionStateRequest,
) -> Result<()> {
    debug!(
        "Requesting provision action {} for baremetal node {}",
        request.target,
        id.as_ref()
    );
    let _ = session
        .put(BAREMETAL, &["nodes", id.as_ref(), "states", "provision"])
        .api_version(provision_version(request))
        .json(request)
        .send()
        .await?;
    Ok(())
}

/// Put a node into maintenance mode.
pub async fn set_maintenance<S: AsRef<str>>(
    session: &Session,
    id: S,
    request: &MaintenanceRequest,
) -> Result<()> {
    debug!(
        "Setting maintenance on baremetal node {} with reason {:?}",
        id.as_ref(),
        request.reason
    );
    let _ = session
        .put(BAREMETAL, &["nodes", id.as_ref(), "maintenance"])
        .api_version(API_VERSION_MINIMUM)
        .json(request)
        .send()
        .await?;
    Ok(())
}

/// Remove a node from maintenance mode.
pub async fn unset_maintenance<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Removing maintenance from baremetal node {}", id.as_ref());
    let _ = session
        .delete(BAREMETAL, &["nodes", id.as_ref(), "maintenance"])
        .api_version(API_VERSION_MINIMUM)
        .send()
        .await?;
    Ok(())
}

/// Validate driver interfaces of a node.
pub async fn validate_node<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<HashMap<String, InterfaceValidation>> {
    trace!("Validating baremetal node {}", id.as_ref());
    let result: HashMap<String, InterfaceValidation> = session
        .get(BAREMETAL, &["nodes", id.as_ref(), "validate"])
        .api_version(API_VERSION_MINIMUM)
        .fetch()
        .await?;
    trace!("Validation result for {}: {:?}", id.as_ref(), result);
    Ok(result)
}

/// Get the current boot device.
pub async fn get_boot_device<S: AsRef<str>>(session: &Session, id: S) -> Result<BootDeviceInfo> {
    trace!("Fetching boot device of baremetal node {}", id.as_ref());
    let result: BootDeviceInfo = session
        .get(BAREMETAL, &["nodes", id.as_ref(), "management", "boot_device"])
        .api_version(API_VERSION_MINIMUM)
        .fetch()
        .await?;
    trace!("Received boot device {:?}", result);
    Ok(result)
}

/// Set the boot device.
pub async fn set_boot_device<S: AsRef<str>>(
    session: &Session,
    id: S,
    request: &BootDeviceRequest,
) -> Result<()> {
    debug!(
        "Setting boot device {} (persistent: {}) on baremetal node {}",
        request.boot_device,
        request.persistent,
        id.as_ref()
    );
    let _ = session
        .put(BAREMETAL, &["nodes", id.as_ref(), "management", "boot_device"])
        .api_version(API_VERSION_MINIMUM)
        .json(request)
        .send()
        .await?;
    Ok(())
}

/// List supported boot devices.
pub async fn get_supported_boot_devices<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<Vec<BootDevice>> {
    trace!(
        "Fetching supported boot devices of baremetal node {}",
        id.as_ref()
    );
    let root: SupportedBootDevicesRoot = session
        .get(
            BAREMETAL,
            &["nodes", id.as_ref(), "management", "boot_device", "supported"],
        )
        .api_version(API_VERSION_MINIMUM)
        .fetch()
        .await?;
    Ok(root.supported_boot_devices)
}

/// List BIOS settings.
pub async fn list_bios_settings<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<Vec<BiosSetting>> {
    trace!("Listing BIOS settings of baremetal node {}", id.as_ref());
    let root: BiosSettingsRoot = session
        .get(BAREMETAL, &["nodes", id.as_ref(), "bios"])
        .api_version(API_VERSION_MINIMUM)
        .fetch()
        .await?;
    trace!("Received BIOS settings {:?}", root.bios);
    Ok(root.bios)
}

/// Get the hardware inventory.
pub async fn get_inventory<S: AsRef<str>>(session: &Session, id: S) -> Result<InventoryData> {
    trace!("Fetching inventory of baremetal node {}", id.as_ref());
    let result: InventoryData = session
        .get(BAREMETAL, &["nodes", id.as_ref(), "inventory"])
        .api_version(API_VERSION_INVENTORY)
        .fetch()
        .await?;
    trace!("Received inventory {:?}", result.inventory);
    Ok(result)
}
