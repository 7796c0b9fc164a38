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

//! Bare metal nodes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::{Stream, TryStreamExt};
use json_patch::Patch;
use serde_json::{json, Value};

use super::inventory::InventoryData;
use super::protocol::{self, BiosSetting, BootDeviceInfo, InterfaceValidation};
use super::{api, infos::*, types::*};
use crate::common::{DeletionWaiter, Link, Query, Refresh, Waiter};
use crate::{Error, ErrorKind, Result, Session, Sort};

/// Bare metal node - a single physical machine.
#[derive(Debug, Clone)]
pub struct Node {
    session: Session,
    inner: protocol::Node,
}

/// Summary of a bare metal node.
#[derive(Debug, Clone)]
pub struct NodeSummary {
    session: Session,
    inner: protocol::NodeSummary,
}

/// A query to bare metal node list.
#[derive(Clone, Debug)]
pub struct NodeQuery {
    session: Session,
    query: Query<NodeFilter>,
    can_paginate: bool,
}

/// A query to detailed bare metal node list.
#[derive(Clone, Debug)]
pub struct DetailedNodeQuery {
    inner: NodeQuery,
}

/// A request to create a node.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until sent"]
pub struct NewNode {
    session: Session,
    inner: protocol::NodeCreate,
}

/// A request to update a node via JSON patch.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until sent"]
pub struct NodeUpdate {
    node: Node,
    operations: Vec<Value>,
}

/// A request to change the provision state of a node.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until sent"]
pub struct ProvisionRequest {
    node: Node,
    inner: protocol::ProvisionStateRequest,
}

/// Waiter for a provision state change to finish.
#[derive(Debug)]
pub struct ProvisionStateWaiter {
    node: Node,
    expected: Option<ProvisionState>,
}

#[async_trait]
impl Refresh for Node {
    /// Refresh the node.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_node(&self.session, &self.inner.id).await?;
        Ok(())
    }
}

impl Node {
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id_or_name: Id) -> Result<Node> {
        api::get_node(&session, id_or_name)
            .await
            .map(|inner| Node { session, inner })
    }

    transparent_property! {
        /// ID of the allocation claiming this node (if any).
        allocation_id: ref Option<String>
    }

    transparent_property! {
        /// Whether automated clean is explicitly enabled or disabled for this node.
        automated_clean: Option<bool>
    }

    transparent_property! {
        /// BIOS interface that the node's driver is using.
        bios_interface: ref String
    }

    transparent_property! {
        /// Boot interface that the node's driver is using.
        boot_interface: ref String
    }

    transparent_property! {
        /// Current boot mode (if known).
        boot_mode: ref Option<String>
    }

    transparent_property! {
        /// ID of the chassis this node belongs to (if any).
        chassis_id: ref Option<String>
    }

    transparent_property! {
        /// Clean step that is currently executed (if any).
        clean_step: ref Option<CleanStep>
    }

    transparent_property! {
        /// Conductor group this node belongs to.
        conductor_group: ref String
    }

    transparent_property! {
        /// The name of the conductor currently responsible for this node.
        conductor_name: ref Option<String>
    }

    transparent_property! {
        /// Whether serial console is currently enabled for the node.
        console_enabled: bool
    }

    transparent_property! {
        /// Console interface that the node's driver is using.
        console_interface: ref String
    }

    transparent_property! {
        /// When the node was created.
        created_at: DateTime<FixedOffset>
    }

    transparent_property! {
        /// Deploy interface that the node's driver is using.
        deploy_interface: ref String
    }

    transparent_property! {
        /// Deploy step that is currently executed (if any).
        deploy_step: ref Option<DeployStep>
    }

    transparent_property! {
        /// Readable description of the node.
        description: ref Option<String>
    }

    transparent_property! {
        /// The node's driver.
        driver: ref String
    }

    transparent_property! {
        /// Driver-specific configuration.
        driver_info: ref DriverInfo
    }

    transparent_property! {
        /// Operator-provided extra properties.
        extra: ref HashMap<String, Value>
    }

    transparent_property! {
        /// Fault that happened on the node.
        fault: Option<Fault>
    }

    transparent_property! {
        /// Unique ID of the node.
        id: ref String
    }

    transparent_property! {
        /// Inspect interface that the node's driver is using.
        inspect_interface: ref String
    }

    transparent_property! {
        /// The date and time when last inspection was finished.
        inspection_finished_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        /// The date and time when last inspection was started.
        inspection_started_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        /// Instance identifier (server ID in case of OpenStack Compute).
        instance_id: ref Option<String>
    }

    transparent_property! {
        /// Instance information specific to the deploy method.
        instance_info: ref InstanceInfo
    }

    transparent_property! {
        /// Last encountered error (cleared on each successful operation).
        last_error: ref Option<String>
    }

    transparent_property! {
        /// The name of a user/project that borrowed this node.
        lessee: ref Option<String>
    }

    transparent_property! {
        /// Whether this node is in maintenance mode.
        maintenance: bool
    }

    transparent_property! {
        /// Reason for maintenance (if provided).
        maintenance_reason: ref Option<String>
    }

    transparent_property! {
        /// Links to the node.
        links: ref Vec<Link>
    }

    transparent_property! {
        /// Management interface that the node's driver is using.
        management_interface: ref String
    }

    transparent_property! {
        /// Node unique name.
        name: ref Option<String>
    }

    transparent_property! {
        /// Network configuration for the deployed instance.
        network_data: ref Option<Value>
    }

    transparent_property! {
        /// Network interface that the node's driver is using.
        network_interface: ref String
    }

    transparent_property! {
        /// The name of a user/project owning this node.
        owner: ref Option<String>
    }

    transparent_property! {
        /// Parent node (for child nodes such as DPUs).
        parent_node: ref Option<String>
    }

    transparent_property! {
        /// Power interface that the node's driver is using.
        power_interface: ref String
    }

    transparent_property! {
        /// The current power state if the node (if known).
        power_state: Option<PowerState>
    }

    transparent_property! {
        /// Free-form server properties.
        properties: ref Properties
    }

    transparent_property! {
        /// Whether the deployed instance is protected from deletion (undeploy).
        protected: bool
    }

    transparent_property! {
        /// Reason for setting the protected flag (if provided).
        protected_reason: ref Option<String>
    }

    transparent_property! {
        /// The current provision state.
        provision_state: ProvisionState
    }

    transparent_property! {
        /// When the provision state was last updated.
        provision_updated_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        /// RAID interface that the node's driver is using.
        raid_interface: ref String
    }

    transparent_property! {
        /// Rescue interface that the node's driver is using.
        rescue_interface: ref String
    }

    transparent_property! {
        /// Host name of the conductor currently holding a lock on the node.
        reservation: ref Option<String>
    }

    transparent_property! {
        /// Resource class of the node (used for scheduling).
        resource_class: ref Option<String>
    }

    transparent_property! {
        /// Whether the node is marked for retirement.
        retired: bool
    }

    transparent_property! {
        /// The reason the node was marked for retirement (if provided).
        retired_reason: ref Option<String>
    }

    transparent_property! {
        /// Whether secure boot is enabled (if known).
        secure_boot: Option<bool>
    }

    transparent_property! {
        /// The shard this node belongs to.
        shard: ref Option<String>
    }

    transparent_property! {
        /// Storage interface that the node's driver is using.
        storage_interface: ref String
    }

    transparent_property! {
        /// Target power state (the pending power action).
        target_power_state: Option<TargetPowerState>
    }

    transparent_property! {
        /// Target provision state (the pending provisioning action).
        target_provision_state: Option<TargetProvisionState>
    }

    transparent_property! {
        /// Node traits (used for scheduling).
        traits: ref Vec<String>
    }

    transparent_property! {
        /// When the node was last updated.
        updated_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        /// Vendor interface that the node's driver is using.
        vendor_interface: ref String
    }

    /// Start updating the node.
    ///
    /// Changes are sent as a JSON patch when calling `send` on the result.
    pub fn update(&self) -> NodeUpdate {
        NodeUpdate {
            node: self.clone(),
            operations: Vec::new(),
        }
    }

    /// Apply a JSON patch to the node.
    pub async fn apply_patch(&mut self, patch: &Patch) -> Result<()> {
        self.inner = api::update_node(&self.session, &self.inner.id, patch).await?;
        Ok(())
    }

    /// Delete the node.
    pub async fn delete(self) -> Result<DeletionWaiter<Node>> {
        api::delete_node(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::from_secs(120),
            Duration::from_secs(1),
        ))
    }

    /// Request a power state change.
    ///
    /// The change is asynchronous, check `target_power_state` after refreshing.
    pub async fn set_power_state(&mut self, target: TargetPowerState) -> Result<()> {
        let request = protocol::PowerStateRequest {
            target,
            timeout: None,
        };
        api::set_power_state(&self.session, &self.inner.id, &request).await?;
        self.refresh().await
    }

    /// Start a provision state change.
    pub fn provision(&self, action: ProvisionAction) -> ProvisionRequest {
        ProvisionRequest {
            node: self.clone(),
            inner: protocol::ProvisionStateRequest {
                target: action,
                configdrive: None,
                clean_steps: Vec::new(),
                deploy_steps: Vec::new(),
                service_steps: Vec::new(),
                disable_ramdisk: false,
                rescue_password: None,
            },
        }
    }

    /// Wait for the current provision state change to finish.
    pub fn into_waiter(self) -> ProvisionStateWaiter {
        ProvisionStateWaiter {
            node: self,
            expected: None,
        }
    }

    /// Put the node into maintenance mode.
    pub async fn set_maintenance<S: Into<String>>(&mut self, reason: Option<S>) -> Result<()> {
        let request = protocol::MaintenanceRequest {
            reason: reason.map(Into::into),
        };
        api::set_maintenance(&self.session, &self.inner.id, &request).await?;
        self.refresh().await
    }

    /// Remove the node from maintenance mode.
    pub async fn unset_maintenance(&mut self) -> Result<()> {
        api::unset_maintenance(&self.session, &self.inner.id).await?;
        self.refresh().await
    }

    /// Validate the driver interfaces.
    ///
    /// Returns a mapping from the interface name to the validation result.
    pub async fn validate(&self) -> Result<HashMap<String, InterfaceValidation>> {
        api::validate_node(&self.session, &self.inner.id).await
    }

    /// Get the current boot device.
    pub async fn boot_device(&self) -> Result<BootDeviceInfo> {
        api::get_boot_device(&self.session, &self.inner.id).await
    }

    /// Set the boot device.
    pub async fn set_boot_device(&self, device: BootDevice, persistent: bool) -> Result<()> {
        let request = protocol::BootDeviceRequest {
            boot_device: device,
            persistent,
        };
        api::set_boot_device(&self.session, &self.inner.id, &request).await
    }

    /// Get the boot devices supported by the node's driver.
    pub async fn supported_boot_devices(&self) -> Result<Vec<BootDevice>> {
        api::get_supported_boot_devices(&self.session, &self.inner.id).await
    }

    /// Get the cached BIOS settings.
    pub async fn bios_settings(&self) -> Result<Vec<BiosSetting>> {
        api::list_bios_settings(&self.session, &self.inner.id).await
    }

    /// Get the hardware inventory collected by inspection.
    ///
    /// Requires API version 1.81 (2023.1) or newer.
    pub async fn inventory(&self) -> Result<InventoryData> {
        api::get_inventory(&self.session, &self.inner.id).await
    }
}

impl NodeSummary {
    transparent_property! {
        /// Unique ID of the node.
        id: ref String
    }

    transparent_property! {
        /// Instance identifier (server ID in case of OpenStack Compute).
        instance_id: ref Option<String>
    }

    transparent_property! {
        /// Whether this node is in maintenance mode.
        maintenance: bool
    }

    transparent_property! {
        /// Node unique name.
        name: ref Option<String>
    }

    transparent_property! {
        /// The current power state if the node (if known).
        power_state: Option<PowerState>
    }

    transparent_property! {
        /// The current provision state.
        provision_state: ProvisionState
    }

    /// Get details.
    pub async fn details(&self) -> Result<Node> {
        Node::load(self.session.clone(), &self.inner.id).await
    }
}

impl NodeQuery {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: NodeFilter) {
        if let NodeFilter::Marker(..) | NodeFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter)
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: NodeFilter) -> Self {
        self.set(filter);
        self
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<NodeSortKey>) -> Self {
        let (field, direction) = sort.unwrap();
        self.query.push(NodeFilter::SortKey(field));
        self.query.push(NodeFilter::SortDir(direction));
        self
    }

    /// Convert this query into a query for detailed nodes.
    #[inline]
    pub fn detailed(self) -> DetailedNodeQuery {
        DetailedNodeQuery { inner: self }
    }

    /// Convert this query into a stream executing the request.
    ///
    /// This stream yields only `NodeSummary` objects, containing the most important
    /// information. Use `detailed().into_stream()` for full `Node` objects.
    ///
    /// Returns a `TryStream`, which is a stream with each `next`
    /// call returning a `Result`.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<NodeSummary>> {
        debug!("Fetching nodes with {:?}", self.query);
        let session = self.session.clone();
        api::list_nodes(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::NodeSummary>()
            .map_ok(move |inner| NodeSummary {
                session: session.clone(),
                inner,
            })
    }

    /// Execute this request and return all results.
    ///
    /// A convenience shortcut for `self.into_stream().try_collect().await`.
    #[inline]
    pub async fn all(self) -> Result<Vec<NodeSummary>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<NodeSummary> {
        debug!("Fetching one node with {:?}", self.query);
        self.limit_to_two();
        let inner = api::list_nodes(&self.session, &self.query, false)
            .one::<protocol::NodeSummary>()
            .await?;
        Ok(NodeSummary {
            session: self.session,
            inner,
        })
    }

    fn limit_to_two(&mut self) {
        if self.can_paginate {
            // We need only one result. We fetch maximum two to be able
            // to check if the query yieled more than one result.
            self.query.push(NodeFilter::Limit(2));
            self.can_paginate = false;
        }
    }
}

impl DetailedNodeQuery {
    /// Add a filter to the query.
    pub fn set(&mut self, filter: NodeFilter) {
        self.inner.set(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: NodeFilter) -> Self {
        self.inner.set(filter);
        self
    }

    /// Add sorting to the request.
    pub fn sort_by(self, sort: Sort<NodeSortKey>) -> Self {
        Self {
            inner: self.inner.sort_by(sort),
        }
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Node>> {
        debug!("Fetching detailed nodes with {:?}", self.inner.query);
        let session = self.inner.session.clone();
        api::list_nodes_detailed(&self.inner.session, &self.inner.query, self.inner.can_paginate)
            .into_stream::<protocol::Node>()
            .map_ok(move |inner| Node {
                session: session.clone(),
                inner,
            })
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<Node>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Node> {
        debug!("Fetching one detailed node with {:?}", self.inner.query);
        self.inner.limit_to_two();
        let inner = api::list_nodes_detailed(&self.inner.session, &self.inner.query, false)
            .one::<protocol::Node>()
            .await?;
        Ok(Node {
            session: self.inner.session,
            inner,
        })
    }
}

impl NewNode {
    /// Start creating a node with the given driver.
    pub(crate) fn new<S: Into<String>>(session: Session, driver: S) -> NewNode {
        NewNode {
            session,
            inner: protocol::NodeCreate {
                driver: driver.into(),
                ..Default::default()
            },
        }
    }

    /// Request creation of the node.
    ///
    /// New nodes start in the `enroll` provision state.
    pub async fn create(self) -> Result<Node> {
        let inner = api::create_node(&self.session, &self.inner).await?;
        Ok(Node {
            session: self.session,
            inner,
        })
    }

    /// Add an extra field.
    pub fn add_extra<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        let _ = self.inner.extra.insert(key.into(), value.into());
    }

    /// Add an extra field.
    #[inline]
    pub fn with_extra<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.add_extra(key, value);
        self
    }

    creation_field! {
        #[doc = "Enable or disable automated cleaning."]
        set_automated_clean, with_automated_clean -> automated_clean: optional bool
    }

    creation_field! {
        #[doc = "BIOS interface to use."]
        set_bios_interface, with_bios_interface -> bios_interface: optional String
    }

    creation_field! {
        #[doc = "Boot interface to use."]
        set_boot_interface, with_boot_interface -> boot_interface: optional String
    }

    creation_field! {
        #[doc = "Chassis the node belongs to."]
        set_chassis_id, with_chassis_id -> chassis_uuid: optional String
    }

    creation_field! {
        #[doc = "Conductor group to use."]
        set_conductor_group, with_conductor_group -> conductor_group: optional String
    }

    creation_field! {
        #[doc = "Console interface to use."]
        set_console_interface, with_console_interface -> console_interface: optional String
    }

    creation_field! {
        #[doc = "Deploy interface to use."]
        set_deploy_interface, with_deploy_interface -> deploy_interface: optional String
    }

    creation_field! {
        #[doc = "Human-readable description."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Driver-specific information."]
        set_driver_info, with_driver_info -> driver_info: DriverInfo
    }

    creation_field! {
        #[doc = "Unique ID of the node (generated if not provided)."]
        set_id, with_id -> uuid: optional String
    }

    creation_field! {
        #[doc = "Inspect interface to use."]
        set_inspect_interface, with_inspect_interface -> inspect_interface: optional String
    }

    creation_field! {
        #[doc = "Instance information."]
        set_instance_info, with_instance_info -> instance_info: InstanceInfo
    }

    creation_field! {
        #[doc = "Project that leases the node."]
        set_lessee, with_lessee -> lessee: optional String
    }

    creation_field! {
        #[doc = "Management interface to use."]
        set_management_interface, with_management_interface -> management_interface: optional String
    }

    creation_field! {
        #[doc = "Unique name of the node."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Network configuration for the instance."]
        set_network_data, with_network_data -> network_data: optional Value
    }

    creation_field! {
        #[doc = "Network interface to use."]
        set_network_interface, with_network_interface -> network_interface: optional String
    }

    creation_field! {
        #[doc = "Project that owns the node."]
        set_owner, with_owner -> owner: optional String
    }

    creation_field! {
        #[doc = "Power interface to use."]
        set_power_interface, with_power_interface -> power_interface: optional String
    }

    creation_field! {
        #[doc = "Node properties."]
        set_properties, with_properties -> properties: Properties
    }

    creation_field! {
        #[doc = "RAID interface to use."]
        set_raid_interface, with_raid_interface -> raid_interface: optional String
    }

    creation_field! {
        #[doc = "Rescue interface to use."]
        set_rescue_interface, with_rescue_interface -> rescue_interface: optional String
    }

    creation_field! {
        #[doc = "Resource class for scheduling."]
        set_resource_class, with_resource_class -> resource_class: optional String
    }

    creation_field! {
        #[doc = "Shard the node belongs to."]
        set_shard, with_shard -> shard: optional String
    }

    creation_field! {
        #[doc = "Storage interface to use."]
        set_storage_interface, with_storage_interface -> storage_interface: optional String
    }

    creation_field! {
        #[doc = "Vendor interface to use."]
        set_vendor_interface, with_vendor_interface -> vendor_interface: optional String
    }
}

impl NodeUpdate {
    fn push(&mut self, op: &str, path: &str, value: Option<Value>) {
        let mut operation = json!({"op": op, "path": path});
        if let Some(value) = value {
            operation["value"] = value;
        }
        self.operations.push(operation);
    }

    /// Set a field, e.g. `/name` or `/driver_info/ipmi_address`.
    pub fn set<P: AsRef<str>, V: Into<Value>>(mut self, path: P, value: V) -> Self {
        self.push("add", path.as_ref(), Some(value.into()));
        self
    }

    /// Remove a field.
    pub fn remove<P: AsRef<str>>(mut self, path: P) -> Self {
        self.push("remove", path.as_ref(), None);
        self
    }

    /// Build the JSON patch.
    pub fn to_patch(&self) -> Result<Patch> {
        serde_json::from_value(Value::Array(self.operations.clone())).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Invalid node update: {}", e),
            )
        })
    }

    /// Whether the update contains any changes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Send the update.
    ///
    /// Returns the updated node.
    pub async fn send(self) -> Result<Node> {
        let patch = self.to_patch()?;
        let mut node = self.node;
        if patch.0.is_empty() {
            debug!("No changes to node {}", node.inner.id);
            return Ok(node);
        }

        node.apply_patch(&patch).await?;
        Ok(node)
    }
}

impl ProvisionRequest {
    creation_field! {
        #[doc = "Configuration drive (for `active` and `rebuild`)."]
        set_configdrive, with_configdrive -> configdrive: optional ConfigDrive
    }

    /// Add a clean step (for `clean`).
    pub fn add_clean_step(&mut self, step: Step) {
        self.inner.clean_steps.push(step);
    }

    /// Add a clean step (for `clean`).
    #[inline]
    pub fn with_clean_step(mut self, step: Step) -> Self {
        self.add_clean_step(step);
        self
    }

    /// Add a deploy step (for `active` and `rebuild`).
    pub fn add_deploy_step(&mut self, step: Step) {
        self.inner.deploy_steps.push(step);
    }

    /// Add a deploy step (for `active` and `rebuild`).
    #[inline]
    pub fn with_deploy_step(mut self, step: Step) -> Self {
        self.add_deploy_step(step);
        self
    }

    /// Add a service step (for `service`).
    pub fn add_service_step(&mut self, step: Step) {
        self.inner.service_steps.push(step);
    }

    /// Add a service step (for `service`).
    #[inline]
    pub fn with_service_step(mut self, step: Step) -> Self {
        self.add_service_step(step);
        self
    }

    creation_field! {
        #[doc = "Do not boot the ramdisk for steps that do not need it."]
        set_disable_ramdisk, with_disable_ramdisk -> disable_ramdisk: bool
    }

    creation_field! {
        #[doc = "Password for the rescue ramdisk (for `rescue`)."]
        set_rescue_password, with_rescue_password -> rescue_password: optional String
    }

    /// Send the request.
    ///
    /// Returns a waiter for the node to reach a stable state.
    pub async fn send(self) -> Result<ProvisionStateWaiter> {
        let mut node = self.node;
        let action = self.inner.target;
        if action == ProvisionAction::Clean && self.inner.clean_steps.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Manual cleaning requires at least one clean step",
            ));
        }
        api::set_provision_state(&node.session, &node.inner.id, &self.inner).await?;
        node.refresh().await?;
        Ok(ProvisionStateWaiter {
            node,
            expected: action.expected_state(),
        })
    }
}

impl ProvisionStateWaiter {
    /// Current state of the node.
    #[inline]
    pub fn current_state(&self) -> &Node {
        &self.node
    }
}

#[async_trait]
impl Waiter for ProvisionStateWaiter {
    type Output = Node;

    fn default_wait_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(3600))
    }

    fn default_delay(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn timeout_error(&self) -> Error {
        Error::new(
            ErrorKind::OperationTimedOut,
            format!(
                "Timeout waiting for node {} to reach a stable state, current state is {}",
                self.node.id(),
                self.node.provision_state()
            ),
        )
    }

    async fn poll(&mut self) -> Result<Option<Node>> {
        self.node.refresh().await?;
        let state = self.node.provision_state();
        if state.is_failure() {
            debug!(
                "Node {} failed with {:?}",
                self.node.id(),
                self.node.last_error()
            );
            return Err(Error::new(
                ErrorKind::OperationFailed,
                format!(
                    "Node {} got into state {}: {}",
                    self.node.id(),
                    state,
                    self.node.last_error().as_deref().unwrap_or("unknown error")
                ),
            ));
        }

        if self.node.target_provision_state().is_some() || !state.is_stable() {
            trace!(
                "Still waiting for node {}, current state is {}",
                self.node.id(),
                state
            );
            return Ok(None);
        }

        match self.expected {
            Some(expected) if expected != state => Err(Error::new(
                ErrorKind::OperationFailed,
                format!(
                    "Node {} reached state {} instead of {}",
                    self.node.id(),
                    state,
                    expected
                ),
            )),
            _ => {
                debug!("Node {} reached state {}", self.node.id(), state);
                Ok(Some(self.node.clone()))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::auth::NoAuth;

    async fn fake_node() -> Node {
        let session = Session::new(NoAuth::new("http://127.0.0.1:6385").unwrap()).await.unwrap();
        let inner = serde_json::from_value(json!({
            "uuid": "abcd",
            "console_enabled": false,
            "created_at": "2016-08-18T22:28:48.643434+00:00",
            "driver": "ipmi",
            "maintenance": false,
            "provision_state": "manageable",
            "bios_interface": "no-bios",
            "boot_interface": "ipxe",
            "console_interface": "no-console",
            "deploy_interface": "direct",
            "inspect_interface": "agent",
            "management_interface": "ipmitool",
            "network_interface": "noop",
            "power_interface": "ipmitool",
            "raid_interface": "agent",
            "rescue_interface": "agent",
            "storage_interface": "noop",
            "vendor_interface": "no-vendor"
        }))
        .unwrap();
        Node { session, inner }
    }

    #[tokio::test]
    async fn test_node_update_patch() {
        let update = fake_node().await
            .update()
            .set("/name", "node-1")
            .set("/driver_info/ipmi_address", "1.2.3.4")
            .remove("/extra/foo");
        assert!(!update.is_empty());
        let patch = update.to_patch().unwrap();
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!([
                {"op": "add", "path": "/name", "value": "node-1"},
                {"op": "add", "path": "/driver_info/ipmi_address", "value": "1.2.3.4"},
                {"op": "remove", "path": "/extra/foo"}
            ])
        );
    }

    #[tokio::test]
    async fn test_manual_clean_requires_steps() {
        let err = fake_node().await
            .provision(ProvisionAction::Clean)
            .send()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
