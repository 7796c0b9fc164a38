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

//! Authentication modules.
//!
//! Usually, accessing OpenStack services requires authentication. This module
//! re-exports the authentication types of [osauth](https://docs.rs/osauth): Identity
//! v3 authentication as well as simple implementations for standalone use.
//!
//! The usual workflow for connecting to OpenStack API is as follows:
//!
//! 1. Create a suitable authentication type.
//! 2. Create a [Cloud](../struct.Cloud.html) or a [Session](../struct.Session.html) with it.
//!
//! # Examples
//!
//! Creating a cloud using project-scoped password authentication:
//!
//! ```rust,no_run
//! # async fn example() -> openstack_bindings::Result<()> {
//! use openstack_bindings::auth::{IdOrName, Password};
//!
//! let auth = Password::new("https://my.cloud.com/identity", "admin", "pa$$w0rd", "Default")?
//!     .with_project_scope(IdOrName::from_name("project1"), IdOrName::from_id("default"));
//! let os = openstack_bindings::Cloud::new(auth).await?;
//! # Ok(()) }
//! ```
//!
//! Creating a dummy authentication type for use against clouds that do not
//! have actual authentication:
//!
//! ```rust,no_run
//! # async fn example() -> openstack_bindings::Result<()> {
//! use openstack_bindings::auth::NoAuth;
//!
//! let auth = NoAuth::new("https://my.cloud.com/baremetal")?;
//! let os = openstack_bindings::Cloud::new(auth).await?;
//! # Ok(()) }
//! ```
//!
//! Loading `clouds.yaml` and `OS_*` environment variables is available via
//! [Cloud::from_config](../struct.Cloud.html#method.from_config) and
//! [Cloud::from_env](../struct.Cloud.html#method.from_env).

pub use osauth::common::IdOrName;
pub use osauth::identity::{ApplicationCredential, Password, Scope, Token};
pub use osauth::{
    AuthType, BasicAuth, CloudConfig, EndpointFilters, InterfaceType, NoAuth, ValidInterfaces,
};
