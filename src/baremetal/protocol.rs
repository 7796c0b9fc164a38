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

//! JSON structures and protocol bits for the Bare Metal API.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::infos::{DriverInfo, InstanceInfo, Properties};
use super::types::*;
use crate::common::protocol::{deser_datetime, deser_optional_datetime};
use crate::common::Link;
use crate::utils::{empty_map_as_default, is_default};

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default, rename = "allocation_uuid")]
    pub allocation_id: Option<String>,
    #[serde(default)]
    pub automated_clean: Option<bool>,
    pub bios_interface: String,
    pub boot_interface: String,
    #[serde(default)]
    pub boot_mode: Option<String>,
    #[serde(default, rename = "chassis_uuid")]
    pub chassis_id: Option<String>,
    #[serde(default, deserialize_with = "empty_map_as_default")]
    pub clean_step: Option<CleanStep>,
    #[serde(default, rename = "conductor")]
    pub conductor_name: Option<String>,
    #[serde(default)]
    pub conductor_group: String,
    pub console_enabled: bool,
    pub console_interface: String,
    #[serde(deserialize_with = "deser_datetime")]
    pub created_at: DateTime<FixedOffset>,
    pub deploy_interface: String,
    #[serde(default, deserialize_with = "empty_map_as_default")]
    pub deploy_step: Option<DeployStep>,
    #[serde(default)]
    pub description: Option<String>,
    pub driver: String,
    #[serde(default)]
    pub driver_info: DriverInfo,
    #[serde(default)]
    pub extra: HashMap<String, Value>,
    #[serde(default)]
    pub fault: Option<Fault>,
    #[serde(rename = "uuid")]
    pub id: String,
    pub inspect_interface: String,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub inspection_finished_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub inspection_started_at: Option<DateTime<FixedOffset>>,
    #[serde(default, rename = "instance_uuid")]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub instance_info: InstanceInfo,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub lessee: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub maintenance: bool,
    #[serde(default)]
    pub maintenance_reason: Option<String>,
    pub management_interface: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_map_as_default")]
    pub network_data: Option<Value>,
    pub network_interface: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub parent_node: Option<String>,
    pub power_interface: String,
    #[serde(default)]
    pub power_state: Option<PowerState>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub protected_reason: Option<String>,
    pub provision_state: ProvisionState,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub provision_updated_at: Option<DateTime<FixedOffset>>,
    pub raid_interface: String,
    pub rescue_interface: String,
    #[serde(default)]
    pub reservation: Option<String>,
    #[serde(default)]
    pub resource_class: Option<String>,
    #[serde(default)]
    pub retired: bool,
    #[serde(default)]
    pub retired_reason: Option<String>,
    #[serde(default)]
    pub secure_boot: Option<bool>,
    #[serde(default)]
    pub shard: Option<String>,
    pub storage_interface: String,
    #[serde(default)]
    pub target_power_state: Option<TargetPowerState>,
    #[serde(default)]
    pub target_provision_state: Option<TargetProvisionState>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub vendor_interface: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSummary {
    #[serde(rename = "uuid")]
    pub id: String,
    #[serde(default, rename = "instance_uuid")]
    pub instance_id: Option<String>,
    pub maintenance: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub power_state: Option<PowerState>,
    pub provision_state: ProvisionState,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automated_clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bios_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conductor_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub driver: String,
    #[serde(skip_serializing_if = "is_default")]
    pub driver_info: DriverInfo,
    #[serde(skip_serializing_if = "is_default")]
    pub extra: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspect_interface: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub instance_info: InstanceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_interface: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub properties: Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raid_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescue_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_interface: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerStateRequest {
    pub target: TargetPowerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionStateRequest {
    pub target: ProvisionAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configdrive: Option<ConfigDrive>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clean_steps: Vec<Step>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deploy_steps: Vec<Step>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_steps: Vec<Step>,
    #[serde(skip_serializing_if = "is_default")]
    pub disable_ramdisk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescue_password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Current boot device of a node.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootDeviceInfo {
    /// Boot device, `None` if the driver cannot detect it.
    #[serde(default)]
    pub boot_device: Option<BootDevice>,
    /// Whether the boot device is set persistently.
    #[serde(default)]
    pub persistent: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BootDeviceRequest {
    pub boot_device: BootDevice,
    pub persistent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupportedBootDevicesRoot {
    pub supported_boot_devices: Vec<BootDevice>,
}

/// Result of validating one driver interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InterfaceValidation {
    /// `true` if valid, `false` if not, `None` if the interface is not supported.
    #[serde(default)]
    pub result: Option<bool>,
    /// The reason for the failure.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A BIOS setting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BiosSetting {
    /// Setting name.
    pub name: String,
    /// Current value.
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiosSettingsRoot {
    pub bios: Vec<BiosSetting>,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn node_json() -> Value {
        json!({
            "uuid": "abcd",
            "chassis_uuid": None::<String>,
            "conductor_group": "",
            "console_enabled": false,
            "created_at": "2016-08-18T22:28:48.643434+11:11",
            "driver": "ipmi",
            "driver_info": {
                "ipmi_address": "1.2.3.4"
            },
            "extra": {},
            "instance_info": {},
            "last_error": None::<String>,
            "maintenance": false,
            "power_state": "power off",
            "properties": {
                "root_device": {
                    "name": "/dev/sda"
                }
            },
            "provision_state": "available",
            "updated_at": "2016-08-18T22:30:00",

            "bios_interface": "no-bios",
            "boot_interface": "ipxe",
            "console_interface": "no-console",
            "deploy_interface": "direct",
            "inspect_interface": "agent",
            "management_interface": "ipmitool",
            "network_interface": "neutron",
            "power_interface": "ipmitool",
            "raid_interface": "agent",
            "rescue_interface": "agent",
            "storage_interface": "noop",
            "vendor_interface": "no-vendor"
        })
    }

    #[test]
    fn test_minimum_node() {
        let node: Node = serde_json::from_value(node_json()).unwrap();
        assert_eq!(&node.id, "abcd");
        assert_eq!(node.provision_state, ProvisionState::Available);
        assert_eq!(node.power_state, Some(PowerState::Off));
        assert_eq!(node.driver_info.get("ipmi_address"), Some(&json!("1.2.3.4")));
        assert!(node.last_error.is_none());
        assert!(node.extra.is_empty());
        assert!(node.network_data.is_none());
        assert_eq!(
            node.updated_at.unwrap().to_rfc3339(),
            "2016-08-18T22:30:00+00:00"
        );
    }

    #[test]
    fn test_steps() {
        let mut value = node_json();
        value["clean_step"] = json!({
            "step": "write_image",
            "interface": "deploy",
            "priority": 50
        });
        value["deploy_step"] = json!({});

        let node: Node = serde_json::from_value(value).unwrap();
        assert!(node.deploy_step.is_none());
        let step = node.clean_step.unwrap();
        assert_eq!(step.name, "write_image");
        assert_eq!(step.interface, StepInterface::Deploy);
        assert!(step.requires_ramdisk);
    }

    #[test]
    fn test_node_create_skips_empty() {
        let request = NodeCreate {
            driver: "ipmi".into(),
            name: Some("node-1".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"driver": "ipmi", "name": "node-1"})
        );
    }

    #[test]
    fn test_provision_request() {
        let request = ProvisionStateRequest {
            target: ProvisionAction::Active,
            configdrive: Some("http://127.0.0.1/images/test-node-config-drive.iso.gz".into()),
            clean_steps: Vec::new(),
            deploy_steps: Vec::new(),
            service_steps: Vec::new(),
            disable_ramdisk: false,
            rescue_password: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "target": "active",
                "configdrive": "http://127.0.0.1/images/test-node-config-drive.iso.gz"
            })
        );
    }

    #[test]
    fn test_validation() {
        let result: HashMap<String, InterfaceValidation> = serde_json::from_value(json!({
            "bios": {"reason": "Driver ipmi does not support bios", "result": false},
            "power": {"result": true},
            "vendor": {"result": null, "reason": "not supported"}
        }))
        .unwrap();
        assert_eq!(result["bios"].result, Some(false));
        assert_eq!(result["power"].result, Some(true));
        assert!(result["power"].reason.is_none());
        assert!(result["vendor"].result.is_none());
    }
}
