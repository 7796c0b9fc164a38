// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Asynchronous OpenStack bindings in Rust.
//!
//! The goal of this project is to provide a simple API for working with
//! OpenStack clouds, focusing on the deployment side: orchestration,
//! bare metal provisioning, networking and load balancing.
//!
//! # Usage
//!
//! Start with [authentication](auth/index.html) and [Cloud](struct.Cloud.html):
//!
//! ```rust,no_run
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let nodes = cloud.list_baremetal_nodes().await?;
//! for node in nodes {
//!     println!("{} is {}", node.id(), node.provision_state());
//! }
//!
//! let stack = cloud.get_stack("my-stack").await?;
//! println!("Stack status: {}", stack.status());
//! # Ok(()) }
//! ```
//!
//! # Features
//!
//! * [Bare Metal API](baremetal/index.html) (`baremetal`)
//! * [Bare Metal Introspection API](introspection/index.html) (`introspection`)
//! * [Load Balancer API](load_balancer/index.html) (`load-balancer`)
//! * [Networking API](network/index.html) (`network`): floating IPs, segment ranges,
//!   firewall and VPN policies
//! * [Orchestration API](orchestration/index.html) (`orchestration`): stacks,
//!   resources, template composition
//!
//! # Requirements
//!
//! All calls are asynchronous and require a Tokio 1.x runtime.

// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    missing_debug_implementations,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    unused_import_braces,
    unused_parens,
    while_true
)]
#![warn(missing_docs)]
#![allow(unused_extern_crates)]

#[macro_use]
extern crate log;

#[macro_use]
mod utils;

pub mod auth;
#[cfg(feature = "baremetal")]
pub mod baremetal;
mod cloud;
pub mod common;
mod error;
#[cfg(feature = "introspection")]
pub mod introspection;
#[cfg(feature = "load-balancer")]
pub mod load_balancer;
#[cfg(feature = "network")]
pub mod network;
#[cfg(feature = "orchestration")]
pub mod orchestration;
pub mod services;

pub use crate::cloud::Cloud;
pub use crate::common::{ApiVersion, Refresh};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::utils::{Sort, SortDir};
pub use osauth::Session;
