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

//! Bare Metal Introspection API implementation bits.
//!
//! # Example
//!
//! ```rust,no_run
//! use openstack_bindings::common::Waiter;
//!
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let introspection = cloud
//!     .new_introspection("node-1")
//!     .with_manage_boot(true)
//!     .start()
//!     .await?
//!     .wait()
//!     .await?;
//! let data = introspection.data().await?;
//! println!("Node has {} CPUs", data.cpus);
//! # Ok(()) }
//! ```

mod api;
mod protocol;
mod status;

pub use self::protocol::{
    IntrospectionData, IntrospectionFilter, IntrospectionInterface, IntrospectionState,
};
pub use self::status::{
    Introspection, IntrospectionQuery, IntrospectionWaiter, NewIntrospection,
};
