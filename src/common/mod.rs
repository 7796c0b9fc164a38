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

//! Types and traits shared by all API parts.

mod pagination;
pub(crate) mod protocol;
mod query;
#[macro_use]
mod types;
mod waiter;

pub use self::pagination::{NextLink, Page, Pager, PaginationStrategy};
pub use self::protocol::Link;
pub use self::query::CommaSeparated;
pub use self::types::{
    FirewallPolicyRef, FirewallRuleRef, IkePolicyRef, IpsecPolicyRef, ListenerRef,
    LoadBalancerRef, NetworkRef, NodeRef, PoolRef, PortRef, ProjectRef, Refresh, SubnetRef,
    VpnServiceRef,
};
pub use self::waiter::{DeletionWaiter, Waiter};
pub use osauth::{ApiVersion, Query, QueryItem};
