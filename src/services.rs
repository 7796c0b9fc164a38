// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
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

//! OpenStack service types.
//!
//! Bare Metal and Networking come from [osauth](https://docs.rs/osauth), the rest are
//! defined here on top of its `ServiceType` trait.

use osauth::ApiVersion;

pub use osauth::services::{
    BareMetalService, GenericService, NetworkService, ServiceType, VersionSelector,
    VersionedService, BAREMETAL, NETWORK,
};

/// Orchestration service.
///
/// Catalog endpoints already include the API version and the project, while the
/// version document is only served at the root. Version discovery is therefore
/// disabled and the catalog endpoint is used as it is.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct OrchestrationService;

impl OrchestrationService {
    /// Create an Orchestration service type.
    pub const fn new() -> OrchestrationService {
        OrchestrationService
    }
}

impl ServiceType for OrchestrationService {
    fn catalog_type(&self) -> &'static str {
        "orchestration"
    }

    fn major_version_supported(&self, version: ApiVersion) -> bool {
        version.0 == 1
    }

    fn version_discovery_supported(&self) -> bool {
        false
    }
}

/// Bare Metal Introspection service.
pub const BAREMETAL_INTROSPECTION: GenericService =
    GenericService::new("baremetal-introspection", VersionSelector::Major(1));

/// Load Balancer service.
pub const LOAD_BALANCER: GenericService =
    GenericService::new("load-balancer", VersionSelector::Major(2));

/// Orchestration service.
pub const ORCHESTRATION: OrchestrationService = OrchestrationService::new();
