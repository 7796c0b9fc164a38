// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Stack management via Orchestration API.
//!
//! # Examples
//!
//! Creating a stack from a local template and waiting for it:
//!
//! ```rust,no_run
//! use openstack_bindings::common::Waiter;
//! use openstack_bindings::orchestration::Template;
//!
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let template = Template::from_url("stack.yaml").await?;
//! let stack = cloud
//!     .new_stack("my-stack")
//!     .with_template(template)
//!     .with_parameter("flavor", "m1.small")
//!     .create()
//!     .await?
//!     .wait()
//!     .await?;
//! println!("Stack {} is {}", stack.id(), stack.status());
//! # Ok(()) }
//! ```

mod api;
mod protocol;
mod resources;
mod stacks;
mod template;

pub use self::protocol::{
    AbandonedStack, StackFilter, StackOutput, StackPreview, StackSortKey, StackStatus,
};
pub use self::resources::StackResource;
pub use self::stacks::{
    NewStack, Stack, StackDeletionWaiter, StackQuery, StackStatusWaiter, StackSummary,
    StackUpdate,
};
pub use self::template::{DefaultFetcher, Environment, Template, TemplateFetcher};
