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

//! Hardware inventory as collected by the ramdisk.
//!
//! The same structures are returned by the Bare Metal API (node inventory) and
//! by the Bare Metal Introspection API (introspection data).

use std::collections::HashMap;

use macaddr::MacAddr6;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::protocol::{deser_mac, deser_mac_list, ser_mac, ser_mac_list};
use crate::error::invalid_response;
use crate::Result;

/// Hardware inventory of a node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct Inventory {
    #[serde(default)]
    pub bmc_address: Option<String>,
    #[serde(default)]
    pub bmc_v6address: Option<String>,
    #[serde(default)]
    pub boot: Boot,
    #[serde(default)]
    pub cpu: Cpu,
    #[serde(default)]
    pub disks: Vec<Disk>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub memory: Memory,
    #[serde(default)]
    pub system_vendor: SystemVendor,
}

/// Network interface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Interface {
    /// Predictable BIOS device name.
    #[serde(default)]
    pub biosdevname: Option<String>,
    /// DHCP client ID (for InfiniBand).
    #[serde(default)]
    pub client_id: Option<String>,
    /// Whether the link is up.
    #[serde(default)]
    pub has_carrier: bool,
    /// IPv4 address (if any).
    #[serde(default)]
    pub ipv4_address: Option<String>,
    /// IPv6 address (if any).
    #[serde(default)]
    pub ipv6_address: Option<String>,
    /// Raw LLDP TLVs received on the interface.
    #[serde(default, deserialize_with = "crate::utils::empty_map_as_default")]
    pub lldp: Vec<LldpTlv>,
    /// MAC address.
    #[serde(deserialize_with = "deser_mac", serialize_with = "ser_mac")]
    pub mac_address: MacAddr6,
    /// Interface name in the ramdisk.
    pub name: String,
    /// Product ID.
    #[serde(default)]
    pub product: Option<String>,
    /// Link speed.
    #[serde(default)]
    pub speed_mbps: Option<u64>,
    /// Vendor ID.
    #[serde(default)]
    pub vendor: Option<String>,
}

/// CPU information.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Cpu {
    /// CPU architecture, e.g. `x86_64`.
    #[serde(default)]
    pub architecture: String,
    /// Number of logical CPUs.
    #[serde(default)]
    pub count: u32,
    /// CPU flags.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Maximum frequency in MHz.
    #[serde(default, deserialize_with = "crate::utils::empty_as_none")]
    pub frequency: Option<String>,
    /// Model name.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Number of sockets.
    #[serde(default)]
    pub socket_count: Option<u32>,
}

/// Block device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct Disk {
    #[serde(default)]
    pub by_path: Option<String>,
    #[serde(default)]
    pub hctl: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub name: String,
    #[serde(default)]
    pub rotational: bool,
    #[serde(default)]
    pub serial: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub wwn: Option<String>,
    #[serde(default)]
    pub wwn_vendor_extension: Option<String>,
    #[serde(default)]
    pub wwn_with_extension: Option<String>,
}

/// The disk picked as the root device.
pub type RootDisk = Disk;

/// Memory information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Memory {
    /// Physical memory in MiB (as reported by DMI).
    #[serde(default)]
    pub physical_mb: u64,
    /// Memory available to the kernel in bytes.
    #[serde(default)]
    pub total: u64,
}

/// Boot information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Boot {
    /// Boot mode used for the ramdisk: `bios` or `uefi`.
    #[serde(default)]
    pub current_boot_mode: String,
    /// MAC address of the interface used for PXE (if known).
    #[serde(default)]
    pub pxe_interface: Option<String>,
}

/// System vendor information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct SystemVendor {
    #[serde(default)]
    pub firmware: SystemFirmware,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}

/// System firmware information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct SystemFirmware {
    #[serde(default)]
    pub build_date: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A raw LLDP TLV: type and hex-encoded value.
///
/// Represented as a two-item array in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "(u16, String)", into = "(u16, String)")]
pub struct LldpTlv {
    /// TLV type.
    pub tlv_type: u16,
    /// Hex-encoded TLV value.
    pub value: String,
}

impl From<(u16, String)> for LldpTlv {
    fn from(value: (u16, String)) -> LldpTlv {
        LldpTlv {
            tlv_type: value.0,
            value: value.1,
        }
    }
}

impl From<LldpTlv> for (u16, String) {
    fn from(value: LldpTlv) -> (u16, String) {
        (value.tlv_type, value.value)
    }
}

/// A section of the extra hardware data.
pub type ExtraDataSection = HashMap<String, Value>;

/// Extra hardware data collected by the `extra-hardware` collector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct ExtraData {
    #[serde(default)]
    pub cpu: ExtraDataSection,
    #[serde(default)]
    pub disk: ExtraDataSection,
    #[serde(default)]
    pub firmware: ExtraDataSection,
    #[serde(default)]
    pub ipmi: ExtraDataSection,
    #[serde(default)]
    pub memory: ExtraDataSection,
    #[serde(default)]
    pub network: ExtraDataSection,
    #[serde(default)]
    pub system: ExtraDataSection,
}

/// NUMA topology of the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NumaTopology {
    /// CPU to NUMA node mapping.
    #[serde(default)]
    pub cpus: Vec<NumaCpu>,
    /// NIC to NUMA node mapping.
    #[serde(default)]
    pub nics: Vec<NumaNic>,
    /// Memory per NUMA node.
    #[serde(default)]
    pub ram: Vec<NumaRam>,
}

/// A CPU in a NUMA node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct NumaCpu {
    pub cpu: u32,
    pub numa_node: u32,
    #[serde(default)]
    pub thread_siblings: Vec<u32>,
}

/// A NIC in a NUMA node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct NumaNic {
    pub name: String,
    pub numa_node: u32,
}

/// Memory of a NUMA node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub struct NumaRam {
    pub numa_node: u32,
    pub size_kb: u64,
}

/// An interface after processing by the inspection plugins.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessedInterface {
    /// Interface as reported in the inventory.
    #[serde(flatten)]
    pub interface: Interface,
    /// Whether the node booted from this interface.
    #[serde(default)]
    pub pxe_enabled: bool,
}

/// Plugin data in the format of the built-in Bare Metal inspection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StandardPluginData {
    /// All interfaces found on the node.
    #[serde(default)]
    pub all_interfaces: HashMap<String, ProcessedInterface>,
    /// MAC address of the interface the node booted from.
    #[serde(default)]
    pub boot_interface: Option<String>,
    /// Error (if any).
    #[serde(default)]
    pub error: Option<String>,
    /// Extra hardware data.
    #[serde(default)]
    pub extra: ExtraData,
    /// MAC addresses of the valid interfaces.
    #[serde(
        default,
        deserialize_with = "deser_mac_list",
        serialize_with = "ser_mac_list"
    )]
    pub macs: Vec<MacAddr6>,
    /// NUMA topology.
    #[serde(default)]
    pub numa_topology: NumaTopology,
    /// Processed LLDP data per interface.
    #[serde(default)]
    pub parsed_lldp: HashMap<String, HashMap<String, Value>>,
    /// Raw LLDP data per interface.
    #[serde(default)]
    pub lldp_raw: HashMap<String, Vec<LldpTlv>>,
    /// Root disk.
    #[serde(default)]
    pub root_disk: Option<RootDisk>,
    /// Interfaces considered valid by the inspection.
    #[serde(default)]
    pub valid_interfaces: HashMap<String, ProcessedInterface>,
}

/// Data from inspection plugins.
///
/// Its format depends on the inspection implementation, so it can be interpreted
/// in several ways.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PluginData(pub Value);

impl PluginData {
    /// Interpret plugin data as a free-form mapping.
    pub fn as_map(&self) -> Result<HashMap<String, Value>> {
        self.convert()
    }

    /// Interpret plugin data as coming from the built-in inspection.
    pub fn as_standard_data(&self) -> Result<StandardPluginData> {
        self.convert()
    }

    /// Interpret plugin data as coming from the standalone introspection service.
    #[cfg(feature = "introspection")]
    pub fn as_introspection_data(&self) -> Result<crate::introspection::IntrospectionData> {
        self.convert()
    }

    /// Guess the format of the data.
    ///
    /// Unknown (but parseable) data is treated as standard.
    #[cfg(feature = "introspection")]
    pub fn guess_format(&self) -> Result<PluginDataFormat> {
        let standard = self.as_standard_data()?;
        // only the built-in inspection has valid_interfaces
        if !standard.valid_interfaces.is_empty() {
            return Ok(PluginDataFormat::Standard(standard));
        }

        let introspection = self.as_introspection_data()?;
        if introspection.interfaces.is_empty() {
            Ok(PluginDataFormat::Standard(standard))
        } else {
            Ok(PluginDataFormat::Introspection(Box::new(introspection)))
        }
    }

    fn convert<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.0.clone()).map_err(invalid_response)
    }
}

/// Detected format of plugin data.
#[cfg(feature = "introspection")]
#[derive(Debug, Clone)]
pub enum PluginDataFormat {
    /// Built-in inspection.
    Standard(StandardPluginData),
    /// Standalone introspection service.
    Introspection(Box<crate::introspection::IntrospectionData>),
}

/// Node inventory with plugin data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InventoryData {
    /// Formally specified inventory.
    pub inventory: Inventory,
    /// Data from inspection plugins.
    #[serde(default)]
    pub plugin_data: PluginData,
}

#[cfg(test)]
pub(crate) mod test {
    use serde_json::{json, Value};

    use super::*;

    pub(crate) fn inventory_sample() -> Value {
        json!({
            "bmc_address": "192.167.2.134",
            "boot": {
                "current_boot_mode": "bios",
                "pxe_interface": "52:54:00:4e:3d:30"
            },
            "cpu": {
                "architecture": "x86_64",
                "count": 2,
                "flags": ["fpu", "mmx", "fxsr", "sse", "sse2"],
                "frequency": "2100.084"
            },
            "disks": [
                {
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
            ],
            "hostname": "myawesomehost",
            "interfaces": [
                {
                    "client_id": null,
                    "has_carrier": true,
                    "ipv4_address": "172.24.42.101",
                    "lldp": [],
                    "mac_address": "52:54:00:47:20:4d",
                    "name": "eth1",
                    "product": "0x0001",
                    "vendor": "0x1af4"
                },
                {
                    "client_id": null,
                    "has_carrier": true,
                    "ipv4_address": "172.24.42.100",
                    "lldp": [
                        [1, "04112233aabbcc"],
                        [5, "737730312d646973742d31622d623132"]
                    ],
                    "mac_address": "52:54:00:4e:3d:30",
                    "name": "eth0",
                    "product": "0x0001",
                    "vendor": "0x1af4",
                    "speed_mbps": 1000
                }
            ],
            "memory": {
                "physical_mb": 2048,
                "total": 2105864192u64
            },
            "system_vendor": {
                "manufacturer": "Bochs",
                "product_name": "Bochs",
                "serial_number": "Not Specified",
                "firmware": {
                    "build_date": "03/11/2020",
                    "vendor": "test",
                    "version": "1.2.3.4"
                }
            }
        })
    }

    #[test]
    fn test_inventory() {
        let inventory: Inventory = serde_json::from_value(inventory_sample()).unwrap();
        assert_eq!(inventory.bmc_address.as_deref(), Some("192.167.2.134"));
        assert_eq!(inventory.boot.current_boot_mode, "bios");
        assert_eq!(inventory.cpu.count, 2);
        assert_eq!(inventory.cpu.frequency.as_deref(), Some("2100.084"));
        assert_eq!(inventory.disks[0].size, 13958643712);
        assert!(inventory.disks[0].rotational);
        assert_eq!(inventory.hostname.as_deref(), Some("myawesomehost"));
        assert_eq!(inventory.memory.physical_mb, 2048);
        assert_eq!(
            inventory.system_vendor.firmware.version.as_deref(),
            Some("1.2.3.4")
        );

        let eth1 = &inventory.interfaces[0];
        assert_eq!(eth1.mac_address, MacAddr6::new(0x52, 0x54, 0x00, 0x47, 0x20, 0x4d));
        assert!(eth1.lldp.is_empty());
        let eth0 = &inventory.interfaces[1];
        assert_eq!(eth0.speed_mbps, Some(1000));
        let lldp = &eth0.lldp;
        assert_eq!(lldp[0].tlv_type, 1);
        assert_eq!(lldp[1].value, "737730312d646973742d31622d623132");
    }

    #[test]
    fn test_lldp_tlv_format() {
        let tlv = LldpTlv {
            tlv_type: 5,
            value: "abcd".into(),
        };
        assert_eq!(serde_json::to_value(&tlv).unwrap(), json!([5, "abcd"]));
    }

    #[test]
    fn test_numa_topology() {
        let numa: NumaTopology = serde_json::from_value(json!({
            "cpus": [{"cpu": 6, "numa_node": 1, "thread_siblings": [3, 27]}],
            "nics": [{"name": "p2p1", "numa_node": 0}],
            "ram": [{"numa_node": 0, "size_kb": 99289532}]
        }))
        .unwrap();
        assert_eq!(numa.cpus[0].thread_siblings, vec![3, 27]);
        assert_eq!(numa.nics[0].name, "p2p1");
        assert_eq!(numa.ram[0].size_kb, 99289532);
    }

    #[test]
    fn test_plugin_data_as_map() {
        let data = PluginData(json!({
            "macs": ["52:54:00:90:35:d6"],
            "local_gb": 10,
            "cpu_arch": "x86_64",
            "memory_mb": 2048
        }));
        let map = data.as_map().unwrap();
        assert_eq!(map.get("local_gb"), Some(&json!(10)));

        let standard = data.as_standard_data().unwrap();
        assert_eq!(standard.macs.len(), 1);
        assert!(standard.valid_interfaces.is_empty());
    }

    #[test]
    fn test_plugin_data_invalid() {
        let data = PluginData(json!(["not", "a", "map"]));
        let err = data.as_map().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_standard_plugin_data() {
        let data = PluginData(json!({
            "valid_interfaces": {
                "eth0": {
                    "name": "eth0",
                    "mac_address": "52:54:00:4e:3d:30",
                    "ipv4_address": "172.24.42.100",
                    "pxe_enabled": true
                }
            },
            "lldp_raw": {"eth0": [[1, "04112233aabbcc"]]},
            "root_disk": {"name": "/dev/vda", "size": 10}
        }));
        let standard = data.as_standard_data().unwrap();
        let eth0 = standard.valid_interfaces.get("eth0").unwrap();
        assert!(eth0.pxe_enabled);
        assert_eq!(eth0.interface.name, "eth0");
        assert_eq!(standard.lldp_raw["eth0"][0].tlv_type, 1);
        assert_eq!(standard.root_disk.unwrap().name, "/dev/vda");
    }
}
