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

//! VPN as a service: IKE and IPsec policies and IPsec site connections.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{
    self, AuthAlgorithm, DeadPeerDetection, EncapsulationMode, EncryptionAlgorithm, IkeVersion,
    Initiator, Lifetime, Pfs, Phase1NegotiationMode, SiteConnectionFilter, SiteConnectionStatus,
    TransformProtocol, VpnPolicyFilter,
};
use crate::common::{
    DeletionWaiter, IkePolicyRef, IpsecPolicyRef, ProjectRef, Query, Refresh, VpnServiceRef,
};
use crate::{Error, ErrorKind, Result, Session};

/// An IKE (Internet Key Exchange) policy.
#[derive(Clone, Debug)]
pub struct IkePolicy {
    session: Session,
    inner: protocol::IkePolicy,
    dirty: HashSet<&'static str>,
}

/// A query to IKE policy list.
#[derive(Clone, Debug)]
pub struct IkePolicyQuery {
    session: Session,
    query: Query<VpnPolicyFilter>,
    can_paginate: bool,
}

/// A request to create an IKE policy.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewIkePolicy {
    session: Session,
    inner: protocol::IkePolicyCreate,
}

/// An IPsec policy.
#[derive(Clone, Debug)]
pub struct IpsecPolicy {
    session: Session,
    inner: protocol::IpsecPolicy,
    dirty: HashSet<&'static str>,
}

/// A query to IPsec policy list.
#[derive(Clone, Debug)]
pub struct IpsecPolicyQuery {
    session: Session,
    query: Query<VpnPolicyFilter>,
    can_paginate: bool,
}

/// A request to create an IPsec policy.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewIpsecPolicy {
    session: Session,
    inner: protocol::IpsecPolicyCreate,
}

/// An IPsec site connection between a VPN service and a remote peer.
#[derive(Clone, Debug)]
pub struct SiteConnection {
    session: Session,
    inner: protocol::SiteConnection,
    dirty: HashSet<&'static str>,
}

/// A query to IPsec site connection list.
#[derive(Clone, Debug)]
pub struct SiteConnectionQuery {
    session: Session,
    query: Query<SiteConnectionFilter>,
    can_paginate: bool,
}

/// A request to create an IPsec site connection.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewSiteConnection {
    session: Session,
    inner: protocol::SiteConnectionCreate,
}

impl IkePolicy {
    fn new(session: Session, inner: protocol::IkePolicy) -> IkePolicy {
        IkePolicy {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<IkePolicy> {
        let inner = api::get_ike_policy(&session, id).await?;
        Ok(IkePolicy::new(session, inner))
    }

    transparent_property! {
        #[doc = "Authentication algorithm."]
        auth_algorithm: AuthAlgorithm
    }

    update_field! {
        #[doc = "Update the authentication algorithm."]
        set_auth_algorithm, with_auth_algorithm -> auth_algorithm: AuthAlgorithm
    }

    transparent_property! {
        #[doc = "Policy description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Encryption algorithm."]
        encryption_algorithm: EncryptionAlgorithm
    }

    update_field! {
        #[doc = "Update the encryption algorithm."]
        set_encryption_algorithm, with_encryption_algorithm -> encryption_algorithm: EncryptionAlgorithm
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "IKE version."]
        ike_version: IkeVersion
    }

    update_field! {
        #[doc = "Update the IKE version."]
        set_ike_version, with_ike_version -> ike_version: IkeVersion
    }

    transparent_property! {
        #[doc = "Security association lifetime."]
        lifetime: Lifetime
    }

    update_field! {
        #[doc = "Update the lifetime."]
        set_lifetime, with_lifetime -> lifetime: Lifetime
    }

    transparent_property! {
        #[doc = "Policy name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "Perfect forward secrecy group."]
        pfs: Pfs
    }

    update_field! {
        #[doc = "Update the PFS group."]
        set_pfs, with_pfs -> pfs: Pfs
    }

    transparent_property! {
        #[doc = "Phase 1 negotiation mode."]
        phase1_negotiation_mode: Phase1NegotiationMode
    }

    update_field! {
        #[doc = "Update the phase 1 negotiation mode."]
        set_phase1_negotiation_mode, with_phase1_negotiation_mode -> phase1_negotiation_mode: Phase1NegotiationMode
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    /// Delete the policy.
    pub async fn delete(self) -> Result<DeletionWaiter<IkePolicy>> {
        api::delete_ike_policy(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the policy is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the policy.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::IkePolicyUpdate::default();
        save_fields! {
            self -> update: auth_algorithm encryption_algorithm ike_version lifetime pfs
                phase1_negotiation_mode
        };
        save_option_fields! {
            self -> update: description name
        };
        let inner = api::update_ike_policy(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for IkePolicy {
    /// Refresh the policy.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_ike_policy(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl IkePolicyQuery {
    pub(crate) fn new(session: Session) -> IkePolicyQuery {
        IkePolicyQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: VpnPolicyFilter) {
        if let VpnPolicyFilter::Marker(..) | VpnPolicyFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: VpnPolicyFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<IkePolicy>> {
        debug!("Fetching IKE policies with {:?}", self.query);
        let session = self.session.clone();
        api::list_ike_policies(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::IkePolicy>()
            .map_ok(move |inner| IkePolicy::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<IkePolicy>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<IkePolicy> {
        debug!("Fetching one IKE policy with {:?}", self.query);
        if self.can_paginate {
            self.query.push(VpnPolicyFilter::Limit(2));
        }

        let inner = api::list_ike_policies(&self.session, &self.query, false)
            .one::<protocol::IkePolicy>()
            .await?;
        Ok(IkePolicy::new(self.session, inner))
    }
}

impl NewIkePolicy {
    pub(crate) fn new(session: Session) -> NewIkePolicy {
        NewIkePolicy {
            session,
            inner: protocol::IkePolicyCreate::default(),
        }
    }

    /// Request creation of the policy.
    ///
    /// The service picks defaults for everything not set.
    pub async fn create(self) -> Result<IkePolicy> {
        let inner = api::create_ike_policy(&self.session, self.inner).await?;
        Ok(IkePolicy::new(self.session, inner))
    }

    creation_field! {
        #[doc = "Set the authentication algorithm."]
        set_auth_algorithm, with_auth_algorithm -> auth_algorithm: optional AuthAlgorithm
    }

    creation_field! {
        #[doc = "Set description of the policy."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set the encryption algorithm."]
        set_encryption_algorithm, with_encryption_algorithm -> encryption_algorithm: optional EncryptionAlgorithm
    }

    creation_field! {
        #[doc = "Set the IKE version."]
        set_ike_version, with_ike_version -> ike_version: optional IkeVersion
    }

    creation_field! {
        #[doc = "Set the security association lifetime."]
        set_lifetime, with_lifetime -> lifetime: optional Lifetime
    }

    creation_field! {
        #[doc = "Set name of the policy."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the PFS group."]
        set_pfs, with_pfs -> pfs: optional Pfs
    }

    creation_field! {
        #[doc = "Set the phase 1 negotiation mode."]
        set_phase1_negotiation_mode, with_phase1_negotiation_mode -> phase1_negotiation_mode: optional Phase1NegotiationMode
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }
}

impl IpsecPolicy {
    fn new(session: Session, inner: protocol::IpsecPolicy) -> IpsecPolicy {
        IpsecPolicy {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<IpsecPolicy> {
        let inner = api::get_ipsec_policy(&session, id).await?;
        Ok(IpsecPolicy::new(session, inner))
    }

    transparent_property! {
        #[doc = "Authentication algorithm."]
        auth_algorithm: AuthAlgorithm
    }

    update_field! {
        #[doc = "Update the authentication algorithm."]
        set_auth_algorithm, with_auth_algorithm -> auth_algorithm: AuthAlgorithm
    }

    transparent_property! {
        #[doc = "Policy description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Encapsulation mode."]
        encapsulation_mode: EncapsulationMode
    }

    update_field! {
        #[doc = "Update the encapsulation mode."]
        set_encapsulation_mode, with_encapsulation_mode -> encapsulation_mode: EncapsulationMode
    }

    transparent_property! {
        #[doc = "Encryption algorithm."]
        encryption_algorithm: EncryptionAlgorithm
    }

    update_field! {
        #[doc = "Update the encryption algorithm."]
        set_encryption_algorithm, with_encryption_algorithm -> encryption_algorithm: EncryptionAlgorithm
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Security association lifetime."]
        lifetime: Lifetime
    }

    update_field! {
        #[doc = "Update the lifetime."]
        set_lifetime, with_lifetime -> lifetime: Lifetime
    }

    transparent_property! {
        #[doc = "Policy name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "Perfect forward secrecy group."]
        pfs: Pfs
    }

    update_field! {
        #[doc = "Update the PFS group."]
        set_pfs, with_pfs -> pfs: Pfs
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Transform protocol."]
        transform_protocol: TransformProtocol
    }

    update_field! {
        #[doc = "Update the transform protocol."]
        set_transform_protocol, with_transform_protocol -> transform_protocol: TransformProtocol
    }

    /// Delete the policy.
    pub async fn delete(self) -> Result<DeletionWaiter<IpsecPolicy>> {
        api::delete_ipsec_policy(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the policy is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the policy.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::IpsecPolicyUpdate::default();
        save_fields! {
            self -> update: auth_algorithm encapsulation_mode encryption_algorithm lifetime pfs
                transform_protocol
        };
        save_option_fields! {
            self -> update: description name
        };
        let inner = api::update_ipsec_policy(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for IpsecPolicy {
    /// Refresh the policy.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_ipsec_policy(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl IpsecPolicyQuery {
    pub(crate) fn new(session: Session) -> IpsecPolicyQuery {
        IpsecPolicyQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: VpnPolicyFilter) {
        if let VpnPolicyFilter::Marker(..) | VpnPolicyFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: VpnPolicyFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<IpsecPolicy>> {
        debug!("Fetching IPsec policies with {:?}", self.query);
        let session = self.session.clone();
        api::list_ipsec_policies(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::IpsecPolicy>()
            .map_ok(move |inner| IpsecPolicy::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<IpsecPolicy>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    pub async fn one(mut self) -> Result<IpsecPolicy> {
        debug!("Fetching one IPsec policy with {:?}", self.query);
        if self.can_paginate {
            self.query.push(VpnPolicyFilter::Limit(2));
        }

        let inner = api::list_ipsec_policies(&self.session, &self.query, false)
            .one::<protocol::IpsecPolicy>()
            .await?;
        Ok(IpsecPolicy::new(self.session, inner))
    }
}

impl NewIpsecPolicy {
    pub(crate) fn new(session: Session) -> NewIpsecPolicy {
        NewIpsecPolicy {
            session,
            inner: protocol::IpsecPolicyCreate::default(),
        }
    }

    /// Request creation of the policy.
    pub async fn create(self) -> Result<IpsecPolicy> {
        let inner = api::create_ipsec_policy(&self.session, self.inner).await?;
        Ok(IpsecPolicy::new(self.session, inner))
    }

    creation_field! {
        #[doc = "Set the authentication algorithm."]
        set_auth_algorithm, with_auth_algorithm -> auth_algorithm: optional AuthAlgorithm
    }

    creation_field! {
        #[doc = "Set description of the policy."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set the encapsulation mode."]
        set_encapsulation_mode, with_encapsulation_mode -> encapsulation_mode: optional EncapsulationMode
    }

    creation_field! {
        #[doc = "Set the encryption algorithm."]
        set_encryption_algorithm, with_encryption_algorithm -> encryption_algorithm: optional EncryptionAlgorithm
    }

    creation_field! {
        #[doc = "Set the security association lifetime."]
        set_lifetime, with_lifetime -> lifetime: optional Lifetime
    }

    creation_field! {
        #[doc = "Set name of the policy."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the PFS group."]
        set_pfs, with_pfs -> pfs: optional Pfs
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the transform protocol."]
        set_transform_protocol, with_transform_protocol -> transform_protocol: optional TransformProtocol
    }
}

impl From<IkePolicy> for IkePolicyRef {
    fn from(value: IkePolicy) -> IkePolicyRef {
        value.inner.id.into()
    }
}

impl From<&IkePolicy> for IkePolicyRef {
    fn from(value: &IkePolicy) -> IkePolicyRef {
        (&value.inner.id).into()
    }
}

impl From<IpsecPolicy> for IpsecPolicyRef {
    fn from(value: IpsecPolicy) -> IpsecPolicyRef {
        value.inner.id.into()
    }
}

impl From<&IpsecPolicy> for IpsecPolicyRef {
    fn from(value: &IpsecPolicy) -> IpsecPolicyRef {
        (&value.inner.id).into()
    }
}

impl SiteConnection {
    fn new(session: Session, inner: protocol::SiteConnection) -> SiteConnection {
        SiteConnection {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<SiteConnection> {
        let inner = api::get_site_connection(&session, id).await?;
        Ok(SiteConnection::new(session, inner))
    }

    transparent_property! {
        #[doc = "Administrative state of the connection."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Update the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    transparent_property! {
        #[doc = "Authentication mode (only `psk` is supported by the service)."]
        auth_mode: ref Option<String>
    }

    transparent_property! {
        #[doc = "Connection description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Dead peer detection settings."]
        dpd: Option<DeadPeerDetection>
    }

    update_field! {
        #[doc = "Update the dead peer detection settings."]
        set_dpd, with_dpd -> dpd: optional DeadPeerDetection
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "ID of the IKE policy."]
        ikepolicy_id: ref String
    }

    transparent_property! {
        #[doc = "Which side initiates the connection."]
        initiator: Initiator
    }

    update_field! {
        #[doc = "Update which side initiates the connection."]
        set_initiator, with_initiator -> initiator: Initiator
    }

    transparent_property! {
        #[doc = "ID of the IPsec policy."]
        ipsecpolicy_id: ref String
    }

    transparent_property! {
        #[doc = "ID of the endpoint group with local subnets."]
        local_ep_group_id: ref Option<String>
    }

    update_field! {
        #[doc = "Update the local endpoint group."]
        set_local_ep_group, with_local_ep_group -> local_ep_group_id: optional String
    }

    transparent_property! {
        #[doc = "Local ID used instead of the external IP of the router."]
        local_id: ref Option<String>
    }

    update_field! {
        #[doc = "Update the local ID."]
        set_local_id, with_local_id -> local_id: optional String
    }

    transparent_property! {
        #[doc = "Maximum transmission unit."]
        mtu: u32
    }

    update_field! {
        #[doc = "Update the MTU."]
        set_mtu, with_mtu -> mtu: u32
    }

    transparent_property! {
        #[doc = "Connection name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "Address of the remote peer."]
        peer_address: ref String
    }

    update_field! {
        #[doc = "Update the peer address."]
        set_peer_address, with_peer_address -> peer_address: String
    }

    transparent_property! {
        #[doc = "Remote subnets (when not using endpoint groups)."]
        peer_cidrs: ref Vec<String>
    }

    update_field! {
        #[doc = "Replace the remote subnets."]
        set_peer_cidrs, with_peer_cidrs -> peer_cidrs: Vec<String>
    }

    transparent_property! {
        #[doc = "ID of the endpoint group with remote subnets."]
        peer_ep_group_id: ref Option<String>
    }

    update_field! {
        #[doc = "Update the peer endpoint group."]
        set_peer_ep_group, with_peer_ep_group -> peer_ep_group_id: optional String
    }

    transparent_property! {
        #[doc = "ID of the remote peer."]
        peer_id: ref String
    }

    update_field! {
        #[doc = "Update the peer ID."]
        set_peer_id, with_peer_id -> peer_id: String
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Pre-shared key."]
        psk: ref String
    }

    update_field! {
        #[doc = "Update the pre-shared key."]
        set_psk, with_psk -> psk: String
    }

    transparent_property! {
        #[doc = "Route mode."]
        route_mode: ref Option<String>
    }

    transparent_property! {
        #[doc = "Connection status."]
        status: SiteConnectionStatus
    }

    transparent_property! {
        #[doc = "ID of the VPN service."]
        vpnservice_id: ref String
    }

    /// Delete the connection.
    pub async fn delete(self) -> Result<DeletionWaiter<SiteConnection>> {
        api::delete_site_connection(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(120, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the connection is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the connection.
    pub async fn save(&mut self) -> Result<()> {
        let update = self.pending_update();
        let inner = api::update_site_connection(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }

    fn pending_update(&self) -> protocol::SiteConnectionUpdate {
        let mut update = protocol::SiteConnectionUpdate::default();
        save_fields! {
            self -> update: admin_state_up initiator mtu peer_address peer_cidrs peer_id psk
        };
        save_option_fields! {
            self -> update: description dpd local_ep_group_id local_id name peer_ep_group_id
        };
        update
    }
}

#[async_trait]
impl Refresh for SiteConnection {
    /// Refresh the connection.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_site_connection(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl SiteConnectionQuery {
    pub(crate) fn new(session: Session) -> SiteConnectionQuery {
        SiteConnectionQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: SiteConnectionFilter) {
        if let SiteConnectionFilter::Marker(..) | SiteConnectionFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: SiteConnectionFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<SiteConnection>> {
        debug!("Fetching IPsec site connections with {:?}", self.query);
        let session = self.session.clone();
        api::list_site_connections(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::SiteConnection>()
            .map_ok(move |inner| SiteConnection::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<SiteConnection>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<SiteConnection> {
        debug!("Fetching one IPsec site connection with {:?}", self.query);
        if self.can_paginate {
            self.query.push(SiteConnectionFilter::Limit(2));
        }

        let inner = api::list_site_connections(&self.session, &self.query, false)
            .one::<protocol::SiteConnection>()
            .await?;
        Ok(SiteConnection::new(self.session, inner))
    }
}

impl NewSiteConnection {
    pub(crate) fn new(
        session: Session,
        vpn_service: VpnServiceRef,
        ike_policy: IkePolicyRef,
        ipsec_policy: IpsecPolicyRef,
    ) -> NewSiteConnection {
        NewSiteConnection {
            session,
            inner: protocol::SiteConnectionCreate {
                admin_state_up: None,
                description: None,
                dpd: None,
                ikepolicy_id: ike_policy,
                initiator: None,
                ipsecpolicy_id: ipsec_policy,
                local_ep_group_id: None,
                local_id: None,
                mtu: None,
                name: None,
                peer_address: None,
                peer_cidrs: Vec::new(),
                peer_ep_group_id: None,
                peer_id: None,
                project_id: None,
                psk: None,
                vpnservice_id: vpn_service,
            },
        }
    }

    /// Request creation of the connection.
    ///
    /// The peer address, the peer ID and the pre-shared key are required.
    pub async fn create(self) -> Result<SiteConnection> {
        let required = [
            ("PeerAddress", self.inner.peer_address.is_some()),
            ("PeerID", self.inner.peer_id.is_some()),
            ("PSK", self.inner.psk.is_some()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, present)| !present) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Missing input for argument [{}]", name),
            ));
        }

        let inner = api::create_site_connection(&self.session, self.inner).await?;
        Ok(SiteConnection::new(self.session, inner))
    }

    /// Add a remote subnet.
    pub fn add_peer_cidr<S: Into<String>>(&mut self, cidr: S) {
        self.inner.peer_cidrs.push(cidr.into());
    }

    /// Add a remote subnet.
    #[inline]
    pub fn with_peer_cidr<S: Into<String>>(mut self, cidr: S) -> Self {
        self.add_peer_cidr(cidr);
        self
    }

    creation_field! {
        #[doc = "Set the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: optional bool
    }

    creation_field! {
        #[doc = "Set description of the connection."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set the dead peer detection settings."]
        set_dpd, with_dpd -> dpd: optional DeadPeerDetection
    }

    creation_field! {
        #[doc = "Set which side initiates the connection."]
        set_initiator, with_initiator -> initiator: optional Initiator
    }

    creation_field! {
        #[doc = "Set the endpoint group with local subnets."]
        set_local_ep_group, with_local_ep_group -> local_ep_group_id: optional String
    }

    creation_field! {
        #[doc = "Set the local ID."]
        set_local_id, with_local_id -> local_id: optional String
    }

    creation_field! {
        #[doc = "Set the MTU."]
        set_mtu, with_mtu -> mtu: optional u32
    }

    creation_field! {
        #[doc = "Set name of the connection."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the address of the remote peer."]
        set_peer_address, with_peer_address -> peer_address: optional String
    }

    creation_field! {
        #[doc = "Set the endpoint group with remote subnets."]
        set_peer_ep_group, with_peer_ep_group -> peer_ep_group_id: optional String
    }

    creation_field! {
        #[doc = "Set the ID of the remote peer."]
        set_peer_id, with_peer_id -> peer_id: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the pre-shared key."]
        set_psk, with_psk -> psk: optional String
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::auth::NoAuth;

    async fn ike_policy() -> IkePolicy {
        let session = Session::new(NoAuth::new("http://127.0.0.1:9696").unwrap()).await.unwrap();
        let inner = serde_json::from_value(json!({
            "name": "ikepolicy1",
            "tenant_id": "ccb81365fe36411a9011e90491fe1330",
            "auth_algorithm": "sha1",
            "encryption_algorithm": "aes-256",
            "pfs": "group5",
            "phase1_negotiation_mode": "main",
            "lifetime": {"units": "seconds", "value": 3600},
            "ike_version": "v1",
            "id": "5522aff7-1b3c-48dd-9c3c-b50f016b73db",
            "description": ""
        }))
        .unwrap();
        IkePolicy::new(session, inner)
    }

    #[tokio::test]
    async fn test_ike_policy_properties() {
        let policy = ike_policy().await;
        assert_eq!(policy.auth_algorithm(), AuthAlgorithm::Sha1);
        assert_eq!(policy.encryption_algorithm(), EncryptionAlgorithm::Aes256);
        assert_eq!(policy.lifetime(), Lifetime::seconds(3600));
        assert_eq!(policy.pfs(), Pfs::Group5);
        assert!(policy.description().is_none());
        assert!(!policy.is_dirty());
    }

    #[tokio::test]
    async fn test_ike_policy_update_body() {
        let mut policy = ike_policy().await;
        policy.set_pfs(Pfs::Group14);
        policy.set_name("renamed");
        assert!(policy.is_dirty());

        let this = &policy;
        let mut update = protocol::IkePolicyUpdate::default();
        save_fields! {
            this -> update: auth_algorithm encryption_algorithm ike_version lifetime pfs
                phase1_negotiation_mode
        };
        save_option_fields! {
            this -> update: description name
        };
        assert_eq!(
            serde_json::to_value(protocol::IkePolicyUpdateRoot { ikepolicy: update }).unwrap(),
            json!({"ikepolicy": {"name": "renamed", "pfs": "group14"}})
        );
    }

    #[test]
    fn test_unknown_algorithm() {
        let policy: protocol::IpsecPolicy = serde_json::from_value(json!({
            "id": "ipsec",
            "auth_algorithm": "md5",
            "encapsulation_mode": "tunnel",
            "encryption_algorithm": "3des",
            "lifetime": {"units": "kilobytes", "value": 1000},
            "pfs": "group2",
            "transform_protocol": "esp"
        }))
        .unwrap();
        assert_eq!(policy.auth_algorithm, AuthAlgorithm::Unknown);
        assert_eq!(policy.encryption_algorithm, EncryptionAlgorithm::TripleDes);
        assert_eq!(policy.transform_protocol, TransformProtocol::Esp);
    }

    const CONNECTION: &str = r#"{
        "status": "PENDING_CREATE",
        "psk": "secret",
        "initiator": "bi-directional",
        "name": "vpnconnection1",
        "admin_state_up": true,
        "project_id": "10039663455a446d8ba2cbb058b0f578",
        "tenant_id": "10039663455a446d8ba2cbb058b0f578",
        "auth_mode": "psk",
        "peer_cidrs": [],
        "mtu": 1500,
        "peer_ep_group_id": "9ad5a7e0-6dac-41b4-b20d-a7b8645fddf1",
        "ikepolicy_id": "9b00d6b0-6c93-4ca5-9747-b8ade7bb514f",
        "vpnservice_id": "5c561d9d-eaea-45f6-ae3e-08d1a7080828",
        "dpd": {"action": "hold", "interval": 30, "timeout": 120},
        "route_mode": "static",
        "ipsecpolicy_id": "e6e23d0c-9519-4d52-8ea4-5b1f96d857b1",
        "local_ep_group_id": "3e1815dd-e212-43d0-8f13-b494fa553e68",
        "peer_address": "172.24.4.233",
        "peer_id": "172.24.4.233",
        "id": "851f280f-5639-4ea3-81aa-e298525ab74b",
        "description": ""
    }"#;

    async fn site_connection() -> SiteConnection {
        let session = Session::new(NoAuth::new("http://127.0.0.1:9696").unwrap()).await.unwrap();
        SiteConnection::new(session, serde_json::from_str(CONNECTION).unwrap())
    }

    #[tokio::test]
    async fn test_site_connection_properties() {
        let conn = site_connection().await;
        assert_eq!(conn.status(), SiteConnectionStatus::PendingCreate);
        assert_eq!(conn.initiator(), Initiator::BiDirectional);
        assert_eq!(
            conn.dpd(),
            Some(DeadPeerDetection {
                action: protocol::DpdAction::Hold,
                interval: 30,
                timeout: 120,
            })
        );
        assert_eq!(conn.mtu(), 1500);
        assert!(conn.description().is_none());
        assert!(conn.peer_cidrs().is_empty());
        assert_eq!(conn.route_mode().as_deref(), Some("static"));
    }

    #[tokio::test]
    async fn test_site_connection_update_body() {
        let mut conn = site_connection().await;
        conn.set_psk("new-secret");
        conn.set_initiator(Initiator::ResponseOnly);
        conn.set_description("to the branch office");
        assert!(conn.is_dirty());
        assert_eq!(
            serde_json::to_value(conn.pending_update()).unwrap(),
            json!({
                "description": "to the branch office",
                "initiator": "response-only",
                "psk": "new-secret"
            })
        );
    }

    #[tokio::test]
    async fn test_new_site_connection_requires_peer() {
        let conn = site_connection().await;
        let err = NewSiteConnection::new(
            conn.session.clone(),
            "5c561d9d".into(),
            "9b00d6b0".into(),
            "e6e23d0c".into(),
        )
        .with_peer_address("172.24.4.233")
        .with_psk("secret")
        .create()
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err
            .to_string()
            .contains("Missing input for argument [PeerID]"));
    }
}
