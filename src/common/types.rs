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

//! Types and traits shared between services.

use async_trait::async_trait;

use crate::Result;

/// Trait representing something that can be refreshed.
#[async_trait]
pub trait Refresh {
    /// Refresh the resource representation.
    async fn refresh(&mut self) -> Result<()>;
}

macro_rules! resource_ref {
    ($(#[$attr:meta])* $name:ident) => (
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            pub(crate) value: String,
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> $name {
                $name { value }
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> $name {
                value.to_string().into()
            }
        }

        impl From<&String> for $name {
            #[inline]
            fn from(value: &String) -> $name {
                value.clone().into()
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(value: $name) -> String {
                value.value
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.value
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(&self.value)
            }
        }
    )
}

resource_ref! {
    /// A firewall policy ID.
    FirewallPolicyRef
}

resource_ref! {
    /// A firewall rule ID.
    FirewallRuleRef
}

resource_ref! {
    /// An IKE policy ID.
    IkePolicyRef
}

resource_ref! {
    /// An IPsec policy ID.
    IpsecPolicyRef
}

resource_ref! {
    /// A load balancer listener ID.
    ListenerRef
}

resource_ref! {
    /// A load balancer ID.
    LoadBalancerRef
}

resource_ref! {
    /// A network ID.
    NetworkRef
}

resource_ref! {
    /// A bare metal node ID or name.
    NodeRef
}

resource_ref! {
    /// A load balancer pool ID.
    PoolRef
}

resource_ref! {
    /// A port ID.
    PortRef
}

resource_ref! {
    /// A project ID.
    ProjectRef
}

resource_ref! {
    /// A subnet ID.
    SubnetRef
}

resource_ref! {
    /// A VPN service ID.
    VpnServiceRef
}

#[cfg(test)]
mod test {
    use super::{NetworkRef, NodeRef};

    #[test]
    fn test_resource_ref_conversions() {
        let name = String::from("node-1");
        let node = NodeRef::from(&name);
        assert_eq!(node, NodeRef::from("node-1"));
        assert_eq!(node.as_ref(), "node-1");
        assert_eq!(format!("<{}>", node), "<node-1>");
        assert_eq!(String::from(node), name);
    }

    #[test]
    fn test_resource_ref_is_plain_string() {
        let net: NetworkRef = serde_json::from_value(serde_json::json!("ext-net")).unwrap();
        assert_eq!(net.as_ref(), "ext-net");
        assert_eq!(
            serde_json::to_value(&net).unwrap(),
            serde_json::json!("ext-net")
        );
        assert!(serde_json::from_value::<NetworkRef>(serde_json::json!(42)).is_err());
    }
}
