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

//! Bare Metal API implementation bits.
//!
//! # Limitations
//!
//! This module requires Bare Metal API version 1.46 (Rocky) or newer.
//!
//! # Example
//!
//! ```rust,no_run
//! use openstack_bindings::baremetal::ProvisionAction;
//! use openstack_bindings::common::Waiter;
//!
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let node = cloud.get_baremetal_node("node-1").await?;
//! let node = node
//!     .provision(ProvisionAction::Provide)
//!     .send()
//!     .await?
//!     .wait()
//!     .await?;
//! println!("Node {} is {}", node.id(), node.provision_state());
//! # Ok(()) }
//! ```

mod api;
mod constants;
mod infos;
pub mod inventory;
mod nodes;
mod protocol;
mod types;

pub use infos::{DriverInfo, ImageChecksum, InstanceInfo, Properties};
pub use nodes::{
    DetailedNodeQuery, NewNode, Node, NodeQuery, NodeSummary, NodeUpdate, ProvisionRequest,
    ProvisionStateWaiter,
};
pub use protocol::{BiosSetting, BootDeviceInfo, InterfaceValidation};
pub use types::{
    BootDevice, CleanStep, ConfigDrive, DeployStep, Fault, NodeFilter, NodeSortKey, PowerState,
    ProvisionAction, ProvisionState, Step, StepInterface, TargetPowerState, TargetProvisionState,
};
