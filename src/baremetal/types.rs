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

//! Bare Metal enumerations, steps and filters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::CommaSeparated;
use crate::utils::SortDir;

protocol_enum! {
    /// Provision state of the node.
    enum ProvisionState = Unknown {
        /// Previously deployed node is being adopted.
        Adopting = "adopting",
        /// Adopting a deployed node has failed.
        AdoptFailed = "adopt failed",
        /// Node is deployed.
        Active = "active",
        /// Node is available for deployment.
        Available = "available",
        /// A synchronous cleaning/preparing action is running.
        Cleaning = "cleaning",
        /// Cleaning has failed.
        CleanFailed = "clean failed",
        /// Waiting for an asynchronous cleaning/preparing action.
        CleanWait = "clean wait",
        /// A synchronous deployment action is running.
        Deploying = "deploying",
        /// Deployment has failed.
        DeployFailed = "deploy failed",
        /// Waiting for an asynchronous deployment action.
        DeployWait = "wait call-back",
        /// Processing inspection data.
        Inspecting = "inspecting",
        /// Inspection has failed.
        InspectFailed = "inspect failed",
        /// Waiting for inspection data from the ramdisk.
        InspectWait = "inspect wait",
        /// Node is freshly enrolled.
        Enroll = "enroll",
        /// Node is enrolled and manageable.
        Manageable = "manageable",
        /// Node is in rescue mode.
        Rescue = "rescue",
        /// Node is being prepared for rescue.
        Rescuing = "rescuing",
        /// Rescuing node failed.
        RescueFailed = "rescue failed",
        /// Waiting for rescue ramdisk to come up.
        RescueWait = "rescue wait",
        /// Node is being undeployed (instance deletion).
        Undeploying = "deleting",
        /// Undeployment failed before cleaning.
        UndeployFailed = "error",
        /// Node is exiting rescue mode.
        Unrescuing = "unrescuing",
        /// Exiting rescue mode has failed.
        UnrescueFailed = "unrescue failed",
        /// Management access is being verified.
        Verifying = "verifying",

        /// Reported provision state is not supported.
        Unknown = ""
    }
}

impl ProvisionState {
    /// Whether the state is stable.
    ///
    /// A node will stay in a stable state forever, unless explicitly moved to a different state.
    /// Error states are not considered stable since they require an action.
    pub fn is_stable(&self) -> bool {
        matches!(
            self,
            ProvisionState::Active
                | ProvisionState::Available
                | ProvisionState::Enroll
                | ProvisionState::Manageable
                | ProvisionState::Rescue
        )
    }

    /// Whether the state represents a failure.
    ///
    /// Failure states are similar to stable states since nodes do not leave them automatically.
    /// But they require intervention for recovery.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProvisionState::AdoptFailed
                | ProvisionState::CleanFailed
                | ProvisionState::DeployFailed
                | ProvisionState::InspectFailed
                | ProvisionState::RescueFailed
                | ProvisionState::UndeployFailed
                | ProvisionState::UnrescueFailed
        )
    }
}

protocol_enum! {
    /// Target provision state of the node.
    enum TargetProvisionState {
        /// Node will be deployed (instance active).
        Active = "active",
        /// Node will be undeployed (instance deleted).
        Deleted = "deleted",
        /// Node will be available (after instance deletion and cleaning).
        Available = "available",
        /// Node will be manageable.
        Manageable = "manageable",
        /// Node will be in rescue mode.
        Rescue = "rescue"
    }
}

protocol_enum! {
    /// Power state of the node.
    enum PowerState {
        /// Node is powered off.
        Off = "power off",
        /// Node is powered on.
        On = "power on",
        /// Error when getting power state.
        Error = "error"
    }
}

protocol_enum! {
    /// Target power state of the node.
    enum TargetPowerState {
        /// Power off the node (hard power off).
        Off = "power off",
        /// Power on the node.
        On = "power on",
        /// Reboot the node (hard reboot).
        Reboot = "rebooting",
        /// Power off the node (soft power off).
        SoftOff = "soft power off",
        /// Reboot the node (soft reboot).
        SoftReboot = "soft rebooting"
    }
}

protocol_enum! {
    /// Provision action (the target passed to the provision state API).
    enum ProvisionAction {
        /// Abort the current operation (inspection or cleaning).
        Abort = "abort",
        /// Deploy the node.
        Active = "active",
        /// Adopt a node that was deployed outside of Ironic.
        Adopt = "adopt",
        /// Start manual cleaning.
        Clean = "clean",
        /// Undeploy the node.
        Deleted = "deleted",
        /// Inspect the node.
        Inspect = "inspect",
        /// Move the node into the manageable state.
        Manage = "manage",
        /// Make the node available for deployment.
        Provide = "provide",
        /// Redeploy the node.
        Rebuild = "rebuild",
        /// Boot the rescue ramdisk.
        Rescue = "rescue",
        /// Run service steps on a deployed node.
        Service = "service",
        /// Continue an operation paused on a hold step.
        Unhold = "unhold",
        /// Exit rescue mode.
        Unrescue = "unrescue"
    }
}

impl ProvisionAction {
    /// Provision state expected after a successful action.
    ///
    /// `None` for actions that may end in different states.
    pub fn expected_state(&self) -> Option<ProvisionState> {
        match self {
            ProvisionAction::Active | ProvisionAction::Rebuild => Some(ProvisionState::Active),
            ProvisionAction::Adopt | ProvisionAction::Service => Some(ProvisionState::Active),
            ProvisionAction::Clean | ProvisionAction::Inspect | ProvisionAction::Manage => {
                Some(ProvisionState::Manageable)
            }
            ProvisionAction::Deleted | ProvisionAction::Provide => {
                Some(ProvisionState::Available)
            }
            ProvisionAction::Rescue => Some(ProvisionState::Rescue),
            ProvisionAction::Unrescue => Some(ProvisionState::Active),
            ProvisionAction::Abort | ProvisionAction::Unhold => None,
        }
    }
}

protocol_enum! {
    /// Interface of a deploy or clean step
    #[allow(missing_docs)]
    enum StepInterface {
        BIOS = "bios",
        Deploy = "deploy",
        Firmware = "firmware",
        Management = "management",
        Power = "power",
        RAID = "raid"
    }
}

protocol_enum! {
    /// Boot device of the node.
    enum BootDevice = Unknown {
        /// BIOS setup.
        BIOS = "bios",
        /// CD or DVD drive (including virtual media).
        CDROM = "cdrom",
        /// Local disk.
        Disk = "disk",
        /// Network boot.
        PXE = "pxe",
        /// Safe mode.
        Safe = "safe",
        /// Boot device not known to this library.
        Unknown = "unknown"
    }
}

protocol_enum! {
    /// Type of a fault.
    enum Fault {
        /// Failure to manage the power state.
        Power = "power failure",
        /// Failure of a clean step.
        Clean = "clean failure",
        /// Failure to clean up when aborting rescue.
        RescueAbort = "rescue abort failure"
    }
}

#[derive(Debug, Clone, Deserialize)]
/// A deploy step.
pub struct DeployStep {
    /// Interface to which the step belongs.
    pub interface: StepInterface,
    /// Step name.
    #[serde(rename = "step")]
    pub name: String,
    /// Priority in which the step runs.
    pub priority: u32,
}

#[derive(Debug, Clone, Deserialize)]
/// A clean step.
pub struct CleanStep {
    /// Whether cleaning can be aborted on this step.
    #[serde(default)]
    pub abortable: bool,
    /// Interface to which the step belongs.
    pub interface: StepInterface,
    /// Step name.
    #[serde(rename = "step")]
    pub name: String,
    /// Priority in which the step runs.
    pub priority: u32,
    /// Whether the step requires an agent ramdisk to be running.
    #[serde(default = "crate::utils::some_truth")]
    pub requires_ramdisk: bool,
}

/// A step to run as part of a provision action (clean, deploy or service).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Interface to which the step belongs.
    pub interface: StepInterface,
    /// Step name.
    #[serde(rename = "step")]
    pub name: String,
    /// Step arguments.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub args: HashMap<String, Value>,
    /// Priority (only used for deploy steps).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl Step {
    /// Create a step without arguments.
    pub fn new<S: Into<String>>(interface: StepInterface, name: S) -> Step {
        Step {
            interface,
            name: name.into(),
            args: HashMap::new(),
            priority: None,
        }
    }

    /// Add an argument.
    pub fn with_arg<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Step {
        let _ = self.args.insert(key.into(), value.into());
        self
    }

    /// Set priority.
    #[inline]
    pub fn with_priority(mut self, priority: u32) -> Step {
        self.priority = Some(priority);
        self
    }
}

/// Configuration drive for deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigDrive {
    /// URL or gzipped and base64-encoded ISO image.
    Raw(String),
    /// Contents to build the configuration drive from.
    Contents {
        /// Meta data (merged with the values generated by Ironic).
        #[serde(skip_serializing_if = "Option::is_none")]
        meta_data: Option<Value>,
        /// Network data.
        #[serde(skip_serializing_if = "Option::is_none")]
        network_data: Option<Value>,
        /// User data (a JSON object or a string).
        #[serde(skip_serializing_if = "Option::is_none")]
        user_data: Option<Value>,
        /// Vendor data.
        #[serde(skip_serializing_if = "Option::is_none")]
        vendor_data: Option<Value>,
    },
}

impl ConfigDrive {
    /// Build a configuration drive from user data only.
    pub fn from_user_data<V: Into<Value>>(user_data: V) -> ConfigDrive {
        ConfigDrive::Contents {
            meta_data: None,
            network_data: None,
            user_data: Some(user_data.into()),
            vendor_data: None,
        }
    }
}

impl From<String> for ConfigDrive {
    fn from(value: String) -> ConfigDrive {
        ConfigDrive::Raw(value)
    }
}

impl<'s> From<&'s str> for ConfigDrive {
    fn from(value: &'s str) -> ConfigDrive {
        ConfigDrive::Raw(value.into())
    }
}

protocol_enum! {
    /// Sort key for listing nodes.
    #[allow(missing_docs)]
    enum NodeSortKey {
        AllocationID = "allocation_uuid",
        AutomatedClean = "automated_clean",
        BIOSInterface = "bios_interface",
        BootInterface = "boot_interface",
        ChassisID = "chassis_uuid",
        ConductorGroup = "conductor_group",
        ConsoleEnabled = "console_enabled",
        ConsoleInterface = "console_interface",
        CreatedAt = "created_at",
        DeployInterface = "deploy_interface",
        Description = "description",
        Driver = "driver",
        ID = "uuid",
        InspectInterface = "inspect_interface",
        InspectionFinishedAt = "inspection_finished_at",
        InspectionStartedAt = "inspection_started_at",
        InstanceID = "instance_uuid",
        Lessee = "lessee",
        Maintenance = "maintenance",
        ManagementInterface = "management_interface",
        Name = "name",
        NetworkInterface = "network_interface",
        Owner = "owner",
        PowerInterface = "power_interface",
        PowerState = "power_state",
        Protected = "protected",
        ProvisionState = "provision_state",
        ProvisionUpdatedAt = "provision_updated_at",
        RAIDInterface = "raid_interface",
        RescueInterface = "rescue_interface",
        Reservation = "reservation",
        ResourceClass = "resource_class",
        Retired = "retired",
        Shard = "shard",
        StorageInterface = "storage_interface",
        TargetPowerState = "target_power_state",
        TargetProvisionState = "target_provision_state",
        UpdatedAt = "updated_at",
        VendorInterface = "vendor_interface"
    }
}

query_filter! {
    /// Filter for node objects.
    enum NodeFilter {
        /// Marker (last Node that was fetched).
        Marker(String) = "marker",
        /// Limit on the number of fetched nodes.
        Limit(usize) = "limit",
        /// Key to sort on.
        SortKey(NodeSortKey) = "sort_key",
        /// Sorting direction.
        SortDir(SortDir) = "sort_dir",

        /// Node associated with an instance.
        Associated(bool) = "associated",
        /// Nodes with the given chassis UUID.
        ChassisID(String) = "chassis_uuid",
        /// Nodes managed by this conductor.
        Conductor(String) = "conductor",
        /// Nodes with descriptions containing this string.
        DescriptionContains(String) = "description_contains",
        /// Nodes that belong to this conductor group.
        ConductorGroup(String) = "conductor_group",
        /// Nodes with this driver.
        Driver(String) = "driver",
        /// Nodes that have a fault of this type.
        Fault(Fault) = "fault",
        /// Include nodes with a parent node.
        IncludeChildren(bool) = "include_children",
        /// Nodes associated with this instance.
        InstanceID(String) = "instance_uuid",
        /// Nodes leased by this project or user ID.
        Lessee(String) = "lessee",
        /// Nodes in or not in maintenance mode.
        Maintenance(bool) = "maintenance",
        /// Nodes owned by this project or user ID.
        Owner(String) = "owner",
        /// Nodes that are children of the given node.
        ParentNode(String) = "parent_node",
        /// Nodes owned by or leased to this project ID.
        Project(String) = "project",
        /// Nodes in the given provision state.
        ProvisionState(ProvisionState) = "provision_state",
        /// Nodes with this resource class.
        ResourceClass(String) = "resource_class",
        /// Nodes that are retired.
        Retired(bool) = "retired",
        /// Nodes that have the shard field populated.
        Sharded(bool) = "sharded",
        /// Nodes that belong to one of these shards.
        ShardIn(CommaSeparated<String>) = "shard",
    }
}

impl NodeFilter {
    /// Helper for ShardIn.
    pub fn shard_in<I>(shards: I) -> NodeFilter
    where
        I: IntoIterator,
        String: From<I::Item>,
    {
        NodeFilter::ShardIn(CommaSeparated(shards.into_iter().map(From::from).collect()))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::common::{Query, QueryItem};

    #[test]
    fn test_provision_state_classes() {
        assert!(ProvisionState::Available.is_stable());
        assert!(!ProvisionState::Deploying.is_stable());
        assert!(ProvisionState::DeployFailed.is_failure());
        assert!(!ProvisionState::DeployFailed.is_stable());
        let state: ProvisionState = serde_json::from_value(json!("something new")).unwrap();
        assert_eq!(state, ProvisionState::Unknown);
    }

    #[test]
    fn test_provision_action_expected_state() {
        assert_eq!(
            ProvisionAction::Provide.expected_state(),
            Some(ProvisionState::Available)
        );
        assert_eq!(
            ProvisionAction::Inspect.expected_state(),
            Some(ProvisionState::Manageable)
        );
        assert_eq!(ProvisionAction::Abort.expected_state(), None);
    }

    #[test]
    fn test_step_serialization() {
        let step = Step::new(StepInterface::Deploy, "upgrade_firmware").with_arg("force", "True");
        assert_eq!(
            serde_json::to_value(&step).unwrap(),
            json!({
                "interface": "deploy",
                "step": "upgrade_firmware",
                "args": {"force": "True"}
            })
        );
    }

    #[test]
    fn test_configdrive_serialization() {
        let raw = ConfigDrive::from("http://127.0.0.1/images/configdrive.iso.gz");
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            json!("http://127.0.0.1/images/configdrive.iso.gz")
        );

        let contents = ConfigDrive::from_user_data(json!({"ignition": {"version": "2.2.0"}}));
        assert_eq!(
            serde_json::to_value(&contents).unwrap(),
            json!({"user_data": {"ignition": {"version": "2.2.0"}}})
        );
    }

    #[test]
    fn test_boot_device_unknown() {
        let devices: Vec<BootDevice> =
            serde_json::from_value(json!(["pxe", "disk", "uefi http"])).unwrap();
        assert_eq!(
            devices,
            vec![BootDevice::PXE, BootDevice::Disk, BootDevice::Unknown]
        );
    }

    #[test]
    fn test_node_filter_pairs() {
        let query = Query::default()
            .with(NodeFilter::Maintenance(false))
            .with(NodeFilter::ProvisionState(ProvisionState::Available))
            .with(NodeFilter::shard_in(["a", "b"]));
        let pairs: Vec<(String, String)> = query
            .iter()
            .map(|item| {
                let (key, value) = item.query_item().unwrap();
                (key.to_string(), value.into_owned())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("maintenance".to_string(), "false".to_string()),
                ("provision_state".to_string(), "available".to_string()),
                ("shard".to_string(), "a,b".to_string()),
            ]
        );
    }
}
