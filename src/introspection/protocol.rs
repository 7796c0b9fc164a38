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

//! JSON structures and protocol bits for the Bare Metal Introspection API.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use macaddr::MacAddr6;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::baremetal::inventory::{ExtraData, Inventory, LldpTlv, NumaTopology, RootDisk};
use crate::common::protocol::{
    deser_datetime, deser_mac, deser_mac_list, deser_optional_datetime, ser_mac, ser_mac_list,
    Link,
};

protocol_enum! {
    #[doc = "State of an introspection process."]
    enum IntrospectionState = Unknown {
        #[doc = "Introspection is being started."]
        Starting = "starting",
        #[doc = "Waiting for the ramdisk to report back."]
        Waiting = "waiting",
        #[doc = "Processing the collected data."]
        Processing = "processing",
        #[doc = "Introspection finished successfully."]
        Finished = "finished",
        #[doc = "Introspection failed."]
        Error = "error",
        #[doc = "Stored data is being processed again."]
        Reapplying = "reapplying",
        #[doc = "Introspection is being aborted."]
        Aborting = "aborting",
        #[doc = "Processing data from an unknown node."]
        Enrolling = "enrolling",
        #[doc = "Unknown state (not recognized by this library)."]
        Unknown = "unknown"
    }
}

impl IntrospectionState {
    /// Whether the introspection is no longer running.
    pub fn is_finished(&self) -> bool {
        matches!(self, IntrospectionState::Finished | IntrospectionState::Error)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionStatus {
    #[serde(default)]
    pub error: Option<String>,
    pub finished: bool,
    #[serde(default, deserialize_with = "deser_optional_datetime")]
    pub finished_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(deserialize_with = "deser_datetime")]
    pub started_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub state: IntrospectionState,
    #[serde(rename = "uuid")]
    pub id: String,
}

/// A network interface as processed by introspection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionInterface {
    /// InfiniBand client ID.
    #[serde(default)]
    pub client_id: Option<String>,
    /// IP address (if any).
    #[serde(default)]
    pub ip: Option<String>,
    /// LLDP data processed by plugins.
    #[serde(default)]
    pub lldp_processed: HashMap<String, Value>,
    /// MAC address.
    #[serde(deserialize_with = "deser_mac", serialize_with = "ser_mac")]
    pub mac: MacAddr6,
    /// Whether this interface was used to boot the node.
    #[serde(default)]
    pub pxe: bool,
}

/// Data collected by introspection.
///
/// The exact contents depend on the ramdisk and on the plugins enabled
/// in the introspection service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionData {
    /// All interfaces found on the node.
    #[serde(default)]
    pub all_interfaces: HashMap<String, IntrospectionInterface>,
    /// MAC address of the interface used for booting.
    #[serde(default)]
    pub boot_interface: Option<String>,
    /// CPU architecture.
    #[serde(default)]
    pub cpu_arch: Option<String>,
    /// Number of CPUs.
    #[serde(default)]
    pub cpus: u32,
    /// Error (if any).
    #[serde(default)]
    pub error: Option<String>,
    /// Extra hardware data (requires the `extra_hardware` plugin).
    #[serde(default)]
    pub extra: ExtraData,
    /// Interfaces considered valid.
    #[serde(default)]
    pub interfaces: HashMap<String, IntrospectionInterface>,
    /// Hardware inventory.
    #[serde(default)]
    pub inventory: Inventory,
    /// BMC address.
    #[serde(default)]
    pub ipmi_address: Option<String>,
    /// Raw LLDP data per interface.
    #[serde(default)]
    pub lldp_raw: HashMap<String, Vec<LldpTlv>>,
    /// Root disk size in GiB.
    #[serde(default)]
    pub local_gb: u64,
    /// MAC addresses of the valid interfaces.
    #[serde(
        default,
        deserialize_with = "deser_mac_list",
        serialize_with = "ser_mac_list"
    )]
    pub macs: Vec<MacAddr6>,
    /// Memory size in MiB.
    #[serde(default)]
    pub memory_mb: u64,
    /// NUMA topology (requires the `numa_topology` plugin).
    #[serde(default)]
    pub numa_topology: NumaTopology,
    /// Root disk.
    #[serde(default)]
    pub root_disk: Option<RootDisk>,
}

query_filter! {
    #[doc = "Available filters for introspection list."]
    enum IntrospectionFilter {
        #[doc = "Marker (ID of the last seen node)."]
        Marker(String) = "marker",
        #[doc = "Limit on the number of results."]
        Limit(usize) = "limit"
    }
}

#[cfg(test)]
mod test {
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;
    use crate::baremetal::inventory::test::inventory_sample;

    #[test]
    fn test_status_without_zone() {
        let status: IntrospectionStatus = serde_json::from_value(json!({
            "error": null,
            "finished": true,
            "finished_at": "2017-08-16T12:24:30",
            "links": [
                {
                    "href": "http://127.0.0.1:5050/v1/introspection/c244557e",
                    "rel": "self"
                }
            ],
            "started_at": "2017-08-16T12:22:01",
            "state": "finished",
            "uuid": "c244557e"
        }))
        .unwrap();
        assert!(status.finished);
        assert_eq!(status.state, IntrospectionState::Finished);
        assert_eq!(status.id, "c244557e");
        assert_eq!(status.started_at.minute(), 22);
        assert_eq!(status.started_at.offset().local_minus_utc(), 0);
        assert_eq!(status.finished_at.unwrap().second(), 30);
        assert_eq!(status.links[0].rel, "self");
    }

    #[test]
    fn test_status_with_zone() {
        let status: IntrospectionStatus = serde_json::from_value(json!({
            "error": "Canceled by operator",
            "finished": true,
            "finished_at": null,
            "started_at": "2017-08-16T12:22:01Z",
            "state": "error",
            "uuid": "c244557e"
        }))
        .unwrap();
        assert_eq!(status.state, IntrospectionState::Error);
        assert!(status.state.is_finished());
        assert_eq!(status.error.as_deref(), Some("Canceled by operator"));
        assert_eq!(status.started_at.year(), 2017);
        assert!(status.finished_at.is_none());
    }

    #[test]
    fn test_unknown_state() {
        let status: IntrospectionStatus = serde_json::from_value(json!({
            "finished": false,
            "started_at": "2017-08-16T12:22:01",
            "state": "teleporting",
            "uuid": "c244557e"
        }))
        .unwrap();
        assert_eq!(status.state, IntrospectionState::Unknown);
        assert!(!status.state.is_finished());
    }

    #[test]
    fn test_data() {
        let data: IntrospectionData = serde_json::from_value(json!({
            "all_interfaces": {
                "eth0": {
                    "client_id": null,
                    "ip": "172.24.42.100",
                    "lldp_processed": {
                        "switch_chassis_id": "11:22:33:aa:bb:cc",
                        "switch_system_name": "sw01-dist-1b-b12"
                    },
                    "mac": "52:54:00:4e:3d:30",
                    "pxe": true
                },
                "eth1": {
                    "client_id": null,
                    "ip": "172.24.42.101",
                    "mac": "52:54:00:47:20:4d",
                    "pxe": false
                }
            },
            "boot_interface": "52:54:00:4e:3d:30",
            "cpu_arch": "x86_64",
            "cpus": 2,
            "error": null,
            "interfaces": {
                "eth0": {
                    "client_id": null,
                    "ip": "172.24.42.100",
                    "mac": "52:54:00:4e:3d:30",
                    "pxe": true
                }
            },
            "inventory": inventory_sample(),
            "ipmi_address": "192.167.2.134",
            "lldp_raw": {
                "eth0": [
                    [1, "04112233aabbcc"],
                    [5, "737730312d646973742d31622d623132"]
                ]
            },
            "local_gb": 12,
            "macs": ["52:54:00:4e:3d:30"],
            "memory_mb": 2048,
            "root_disk": {
                "hctl": null,
                "model": "",
                "name": "/dev/vda",
                "rotational": true,
                "serial": null,
                "size": 13958643712u64,
                "vendor": "0x1af4",
                "wwn": null,
                "wwn_vendor_extension": null,
                "wwn_with_extension": null
            }
        }))
        .unwrap();
        assert_eq!(data.all_interfaces.len(), 2);
        let eth0 = &data.interfaces["eth0"];
        assert!(eth0.pxe);
        assert_eq!(eth0.ip.as_deref(), Some("172.24.42.100"));
        assert_eq!(
            eth0.mac,
            "52:54:00:4e:3d:30".parse::<MacAddr6>().unwrap()
        );
        assert!(eth0.lldp_processed.is_empty());
        assert_eq!(
            data.all_interfaces["eth0"].lldp_processed["switch_system_name"],
            "sw01-dist-1b-b12"
        );
        assert_eq!(data.cpus, 2);
        assert_eq!(data.local_gb, 12);
        assert_eq!(data.memory_mb, 2048);
        assert_eq!(data.macs.len(), 1);
        assert_eq!(data.lldp_raw["eth0"].len(), 2);
        assert_eq!(data.lldp_raw["eth0"][0].tlv_type, 1);
        assert_eq!(data.inventory.hostname.as_deref(), Some("myawesomehost"));
        assert_eq!(data.root_disk.unwrap().size, 13958643712);
        assert!(data.numa_topology.cpus.is_empty());
    }
}
