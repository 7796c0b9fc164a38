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

//! Load Balancer API (Octavia).
//!
//! # Examples
//!
//! Creating a load balancer with an HTTP listener and a pool of two members:
//!
//! ```rust,no_run
//! use std::net::Ipv4Addr;
//!
//! use openstack_bindings::common::Waiter;
//! use openstack_bindings::load_balancer::{LbAlgorithm, ListenerProtocol, PoolProtocol};
//!
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let lb = cloud
//!     .new_load_balancer()
//!     .with_name("web")
//!     .with_vip_subnet("private-subnet-id")
//!     .create()
//!     .await?
//!     .into_waiter()
//!     .wait()
//!     .await?;
//! let listener = cloud
//!     .new_listener(lb.id(), ListenerProtocol::Http, 80)
//!     .create()
//!     .await?;
//! let pool = cloud
//!     .new_pool(PoolProtocol::Http, LbAlgorithm::RoundRobin)
//!     .with_listener(listener.id())
//!     .create()
//!     .await?;
//! for last in [10, 11] {
//!     pool.new_member(Ipv4Addr::new(192, 0, 2, last), 8080)
//!         .create()
//!         .await?;
//! }
//! # Ok(()) }
//! ```

mod api;
mod listeners;
mod loadbalancers;
mod members;
mod pools;
mod protocol;

pub use self::listeners::{Listener, ListenerQuery, NewListener};
pub use self::loadbalancers::{
    LoadBalancer, LoadBalancerQuery, LoadBalancerStatusWaiter, NewLoadBalancer,
};
pub use self::members::{Member, MemberQuery, NewMember};
pub use self::pools::{NewPool, Pool, PoolQuery};
pub use self::protocol::{
    HealthMonitorStatus, LbAlgorithm, ListenerFilter, ListenerProtocol, ListenerStatus,
    LoadBalancerFilter, LoadBalancerSortKey, LoadBalancerStats, LoadBalancerStatusTree,
    MemberFilter, MemberSpec, MemberStatus, OperatingStatus, PoolFilter, PoolProtocol,
    PoolStatus, ProvisioningStatus, SessionPersistence, SessionPersistenceType,
};
