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

//! Networking API: floating IPs, segment ranges, firewalls and VPN.
//!
//! # Examples
//!
//! Associating a new floating IP with a port:
//!
//! ```rust,no_run
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let mut fip = cloud
//!     .new_floating_ip("public")
//!     .with_description("web frontend")
//!     .create()
//!     .await?;
//! fip.associate("9a2b5a3e-7f2b-4d7c-8d6e-2f1c2b3a4d5e", None).await?;
//! # Ok(()) }
//! ```
//!
//! Inserting a rule at the top of a firewall policy:
//!
//! ```rust,no_run
//! # async fn example() -> openstack_bindings::Result<()> {
//! let cloud = openstack_bindings::Cloud::from_env().await?;
//! let mut policy = cloud.get_firewall_policy("policy1").await?;
//! policy.insert_rule("allow-ssh").send().await?;
//! # Ok(()) }
//! ```

mod api;
mod firewall;
mod floatingips;
mod protocol;
mod segment_ranges;
mod vpn;

pub use self::firewall::{
    FirewallGroup, FirewallGroupQuery, FirewallPolicy, FirewallPolicyQuery, FirewallRule,
    FirewallRuleQuery, NewFirewallGroup, NewFirewallPolicy, NewFirewallRule, RuleInsertion,
};
pub use self::floatingips::{FloatingIp, FloatingIpQuery, NewFloatingIp};
pub use self::protocol::{
    AuthAlgorithm, DeadPeerDetection, DpdAction, EncapsulationMode, EncryptionAlgorithm,
    FirewallAction, FirewallGroupFilter, FirewallGroupStatus, FirewallPolicyFilter,
    FirewallProtocol, FirewallRuleFilter, FloatingIpFilter, FloatingIpSortKey, FloatingIpStatus,
    IkeVersion, Initiator, IpVersion, Lifetime, LifetimeUnits, NetworkType, Pfs,
    Phase1NegotiationMode, PortForwarding, SegmentRangeFilter, SegmentRangeSortKey,
    SiteConnectionFilter, SiteConnectionStatus, TransformProtocol, VpnPolicyFilter,
};
pub use self::segment_ranges::{NewSegmentRange, SegmentRange, SegmentRangeQuery};
pub use self::vpn::{
    IkePolicy, IkePolicyQuery, IpsecPolicy, IpsecPolicyQuery, NewIkePolicy, NewIpsecPolicy,
    NewSiteConnection, SiteConnection, SiteConnectionQuery,
};
