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

//! Firewall as a service (v2): groups, policies and rules.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};

use super::api;
use super::protocol::{
    self, FirewallAction, FirewallGroupFilter, FirewallGroupStatus, FirewallPolicyFilter,
    FirewallProtocol, FirewallRuleFilter, IpVersion,
};
use crate::common::{
    DeletionWaiter, FirewallPolicyRef, FirewallRuleRef, PortRef, ProjectRef, Query, Refresh,
};
use crate::{Error, ErrorKind, Result, Session};

/// A firewall group: ingress and egress policies applied to a set of ports.
#[derive(Clone, Debug)]
pub struct FirewallGroup {
    session: Session,
    inner: protocol::FirewallGroup,
    dirty: HashSet<&'static str>,
}

/// A query to firewall group list.
#[derive(Clone, Debug)]
pub struct FirewallGroupQuery {
    session: Session,
    query: Query<FirewallGroupFilter>,
    can_paginate: bool,
}

/// A request to create a firewall group.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewFirewallGroup {
    session: Session,
    inner: protocol::FirewallGroupCreate,
}

/// A firewall policy: an ordered list of firewall rules.
#[derive(Clone, Debug)]
pub struct FirewallPolicy {
    session: Session,
    inner: protocol::FirewallPolicy,
    dirty: HashSet<&'static str>,
}

/// A query to firewall policy list.
#[derive(Clone, Debug)]
pub struct FirewallPolicyQuery {
    session: Session,
    query: Query<FirewallPolicyFilter>,
    can_paginate: bool,
}

/// A request to create a firewall policy.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewFirewallPolicy {
    session: Session,
    inner: protocol::FirewallPolicyCreate,
}

/// A request to insert a rule into a firewall policy.
#[derive(Debug)]
#[must_use = "a request does nothing until sent"]
pub struct RuleInsertion<'p> {
    policy: &'p mut FirewallPolicy,
    inner: protocol::InsertRule,
}

/// A firewall rule.
#[derive(Clone, Debug)]
pub struct FirewallRule {
    session: Session,
    inner: protocol::FirewallRule,
    dirty: HashSet<&'static str>,
}

/// A query to firewall rule list.
#[derive(Clone, Debug)]
pub struct FirewallRuleQuery {
    session: Session,
    query: Query<FirewallRuleFilter>,
    can_paginate: bool,
}

/// A request to create a firewall rule.
#[derive(Clone, Debug)]
#[must_use = "a request does nothing until created"]
pub struct NewFirewallRule {
    session: Session,
    inner: protocol::FirewallRuleCreate,
}

impl FirewallGroup {
    fn new(session: Session, inner: protocol::FirewallGroup) -> FirewallGroup {
        FirewallGroup {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<FirewallGroup> {
        let inner = api::get_firewall_group(&session, id).await?;
        Ok(FirewallGroup::new(session, inner))
    }

    transparent_property! {
        #[doc = "Administrative state of the group."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Update the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    transparent_property! {
        #[doc = "Group description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "ID of the policy applied to outgoing traffic."]
        egress_firewall_policy_id: ref Option<String>
    }

    update_field! {
        #[doc = "Apply a policy to outgoing traffic."]
        set_egress_firewall_policy, with_egress_firewall_policy -> egress_firewall_policy_id: optional String
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "ID of the policy applied to incoming traffic."]
        ingress_firewall_policy_id: ref Option<String>
    }

    update_field! {
        #[doc = "Apply a policy to incoming traffic."]
        set_ingress_firewall_policy, with_ingress_firewall_policy -> ingress_firewall_policy_id: optional String
    }

    transparent_property! {
        #[doc = "Group name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "IDs of the ports the group is applied to."]
        ports: ref Vec<String>
    }

    update_field! {
        #[doc = "Replace the ports."]
        set_ports, with_ports -> ports: Vec<String>
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether the group is shared with other projects."]
        shared: bool
    }

    update_field! {
        #[doc = "Update whether the group is shared."]
        set_shared, with_shared -> shared: bool
    }

    transparent_property! {
        #[doc = "Group status."]
        status: FirewallGroupStatus
    }

    /// Delete the group.
    pub async fn delete(self) -> Result<DeletionWaiter<FirewallGroup>> {
        api::delete_firewall_group(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Stop applying any policy to incoming traffic.
    pub async fn remove_ingress_policy(&mut self) -> Result<()> {
        let update = protocol::FirewallGroupUpdate {
            ingress_firewall_policy_id: Some(None),
            ..Default::default()
        };
        self.inner = api::update_firewall_group(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Stop applying any policy to outgoing traffic.
    pub async fn remove_egress_policy(&mut self) -> Result<()> {
        let update = protocol::FirewallGroupUpdate {
            egress_firewall_policy_id: Some(None),
            ..Default::default()
        };
        self.inner = api::update_firewall_group(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Whether the group is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the group.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::FirewallGroupUpdate::default();
        save_fields! {
            self -> update: admin_state_up egress_firewall_policy_id ingress_firewall_policy_id
                ports shared
        };
        save_option_fields! {
            self -> update: description name
        };
        let inner = api::update_firewall_group(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for FirewallGroup {
    /// Refresh the group.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_firewall_group(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl FirewallGroupQuery {
    pub(crate) fn new(session: Session) -> FirewallGroupQuery {
        FirewallGroupQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: FirewallGroupFilter) {
        if let FirewallGroupFilter::Marker(..) | FirewallGroupFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: FirewallGroupFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<FirewallGroup>> {
        debug!("Fetching firewall groups with {:?}", self.query);
        let session = self.session.clone();
        api::list_firewall_groups(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::FirewallGroup>()
            .map_ok(move |inner| FirewallGroup::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<FirewallGroup>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<FirewallGroup> {
        debug!("Fetching one firewall group with {:?}", self.query);
        if self.can_paginate {
            self.query.push(FirewallGroupFilter::Limit(2));
        }

        let inner = api::list_firewall_groups(&self.session, &self.query, false)
            .one::<protocol::FirewallGroup>()
            .await?;
        Ok(FirewallGroup::new(self.session, inner))
    }
}

impl NewFirewallGroup {
    pub(crate) fn new(session: Session) -> NewFirewallGroup {
        NewFirewallGroup {
            session,
            inner: protocol::FirewallGroupCreate::default(),
        }
    }

    /// Request creation of the group.
    pub async fn create(self) -> Result<FirewallGroup> {
        let inner = api::create_firewall_group(&self.session, self.inner).await?;
        Ok(FirewallGroup::new(self.session, inner))
    }

    /// Apply the group to a port.
    pub fn add_port<P: Into<PortRef>>(&mut self, port: P) {
        self.inner.ports.push(port.into());
    }

    /// Apply the group to a port.
    #[inline]
    pub fn with_port<P: Into<PortRef>>(mut self, port: P) -> Self {
        self.add_port(port);
        self
    }

    creation_field! {
        #[doc = "Set the administrative state."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: optional bool
    }

    creation_field! {
        #[doc = "Set description of the group."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set the policy for outgoing traffic."]
        set_egress_firewall_policy, with_egress_firewall_policy -> egress_firewall_policy_id: optional FirewallPolicyRef
    }

    creation_field! {
        #[doc = "Set the policy for incoming traffic."]
        set_ingress_firewall_policy, with_ingress_firewall_policy -> ingress_firewall_policy_id: optional FirewallPolicyRef
    }

    creation_field! {
        #[doc = "Set name of the group."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set whether the group is shared."]
        set_shared, with_shared -> shared: optional bool
    }
}

impl From<FirewallPolicy> for FirewallPolicyRef {
    fn from(value: FirewallPolicy) -> FirewallPolicyRef {
        value.inner.id.into()
    }
}

impl From<&FirewallPolicy> for FirewallPolicyRef {
    fn from(value: &FirewallPolicy) -> FirewallPolicyRef {
        (&value.inner.id).into()
    }
}

impl FirewallPolicy {
    fn new(session: Session, inner: protocol::FirewallPolicy) -> FirewallPolicy {
        FirewallPolicy {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<FirewallPolicy> {
        let inner = api::get_firewall_policy(&session, id).await?;
        Ok(FirewallPolicy::new(session, inner))
    }

    transparent_property! {
        #[doc = "Whether the policy was audited since the last change."]
        audited: bool
    }

    update_field! {
        #[doc = "Update the audited flag."]
        set_audited, with_audited -> audited: bool
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
        #[doc = "IDs of the rules in order of evaluation."]
        firewall_rules: ref Vec<String>
    }

    update_field! {
        #[doc = "Replace the rules."]
        set_firewall_rules, with_firewall_rules -> firewall_rules: Vec<String>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
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
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether the policy is shared with other projects."]
        shared: bool
    }

    update_field! {
        #[doc = "Update whether the policy is shared."]
        set_shared, with_shared -> shared: bool
    }

    /// Delete the policy.
    pub async fn delete(self) -> Result<DeletionWaiter<FirewallPolicy>> {
        api::delete_firewall_policy(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Start inserting a rule into the policy.
    ///
    /// Without a position the rule is inserted at the top.
    pub fn insert_rule<R: Into<FirewallRuleRef>>(&mut self, rule: R) -> RuleInsertion<'_> {
        RuleInsertion {
            policy: self,
            inner: protocol::InsertRule {
                firewall_rule_id: rule.into(),
                insert_after: None,
                insert_before: None,
            },
        }
    }

    /// Remove a rule from the policy.
    pub async fn remove_rule<R: Into<FirewallRuleRef>>(&mut self, rule: R) -> Result<()> {
        let request = protocol::RemoveRule {
            firewall_rule_id: rule.into(),
        };
        self.inner = api::remove_firewall_rule(&self.session, &self.inner.id, request).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Whether the policy is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the policy.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::FirewallPolicyUpdate::default();
        save_fields! {
            self -> update: audited firewall_rules shared
        };
        save_option_fields! {
            self -> update: description name
        };
        let inner = api::update_firewall_policy(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for FirewallPolicy {
    /// Refresh the policy.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_firewall_policy(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl<'p> RuleInsertion<'p> {
    /// Insert the rule after the given one.
    pub fn after<R: Into<FirewallRuleRef>>(mut self, rule: R) -> Self {
        self.inner.insert_after = Some(rule.into());
        self
    }

    /// Insert the rule before the given one.
    pub fn before<R: Into<FirewallRuleRef>>(mut self, rule: R) -> Self {
        self.inner.insert_before = Some(rule.into());
        self
    }

    /// Send the request, updating the policy.
    pub async fn send(self) -> Result<()> {
        if self.inner.insert_after.is_some() && self.inner.insert_before.is_some() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Exactly one of InsertBefore and InsertAfter must be provided",
            ));
        }

        let policy = self.policy;
        policy.inner =
            api::insert_firewall_rule(&policy.session, &policy.inner.id, self.inner).await?;
        policy.dirty.clear();
        Ok(())
    }
}

impl FirewallPolicyQuery {
    pub(crate) fn new(session: Session) -> FirewallPolicyQuery {
        FirewallPolicyQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: FirewallPolicyFilter) {
        if let FirewallPolicyFilter::Marker(..) | FirewallPolicyFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: FirewallPolicyFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<FirewallPolicy>> {
        debug!("Fetching firewall policies with {:?}", self.query);
        let session = self.session.clone();
        api::list_firewall_policies(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::FirewallPolicy>()
            .map_ok(move |inner| FirewallPolicy::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<FirewallPolicy>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<FirewallPolicy> {
        debug!("Fetching one firewall policy with {:?}", self.query);
        if self.can_paginate {
            self.query.push(FirewallPolicyFilter::Limit(2));
        }

        let inner = api::list_firewall_policies(&self.session, &self.query, false)
            .one::<protocol::FirewallPolicy>()
            .await?;
        Ok(FirewallPolicy::new(self.session, inner))
    }
}

impl NewFirewallPolicy {
    pub(crate) fn new(session: Session) -> NewFirewallPolicy {
        NewFirewallPolicy {
            session,
            inner: protocol::FirewallPolicyCreate::default(),
        }
    }

    /// Request creation of the policy.
    pub async fn create(self) -> Result<FirewallPolicy> {
        let inner = api::create_firewall_policy(&self.session, self.inner).await?;
        Ok(FirewallPolicy::new(self.session, inner))
    }

    /// Append a rule to the policy.
    pub fn add_firewall_rule<R: Into<FirewallRuleRef>>(&mut self, rule: R) {
        self.inner.firewall_rules.push(rule.into());
    }

    /// Append a rule to the policy.
    #[inline]
    pub fn with_firewall_rule<R: Into<FirewallRuleRef>>(mut self, rule: R) -> Self {
        self.add_firewall_rule(rule);
        self
    }

    creation_field! {
        #[doc = "Set the audited flag."]
        set_audited, with_audited -> audited: optional bool
    }

    creation_field! {
        #[doc = "Set description of the policy."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set name of the policy."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set whether the policy is shared."]
        set_shared, with_shared -> shared: optional bool
    }
}

impl FirewallRule {
    fn new(session: Session, inner: protocol::FirewallRule) -> FirewallRule {
        FirewallRule {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<FirewallRule> {
        let inner = api::get_firewall_rule(&session, id).await?;
        Ok(FirewallRule::new(session, inner))
    }

    transparent_property! {
        #[doc = "Action taken on matching traffic."]
        action: FirewallAction
    }

    update_field! {
        #[doc = "Update the action."]
        set_action, with_action -> action: FirewallAction
    }

    transparent_property! {
        #[doc = "Rule description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Destination IP address or CIDR."]
        destination_ip_address: ref Option<String>
    }

    update_field! {
        #[doc = "Update the destination IP address or CIDR."]
        set_destination_ip_address, with_destination_ip_address -> destination_ip_address: optional String
    }

    transparent_property! {
        #[doc = "Destination port or range (e.g. `80:90`)."]
        destination_port: ref Option<String>
    }

    update_field! {
        #[doc = "Update the destination port or range."]
        set_destination_port, with_destination_port -> destination_port: optional String
    }

    transparent_property! {
        #[doc = "Whether the rule is enabled."]
        enabled: bool
    }

    update_field! {
        #[doc = "Enable or disable the rule."]
        set_enabled, with_enabled -> enabled: bool
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "IP version."]
        ip_version: IpVersion
    }

    update_field! {
        #[doc = "Update the IP version."]
        set_ip_version, with_ip_version -> ip_version: IpVersion
    }

    transparent_property! {
        #[doc = "Rule name."]
        name: ref Option<String>
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: optional String
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "IP protocol (`None` for any)."]
        protocol: Option<FirewallProtocol>
    }

    update_field! {
        #[doc = "Update the IP protocol."]
        set_protocol, with_protocol -> protocol: optional FirewallProtocol
    }

    transparent_property! {
        #[doc = "Whether the rule is shared with other projects."]
        shared: bool
    }

    update_field! {
        #[doc = "Update whether the rule is shared."]
        set_shared, with_shared -> shared: bool
    }

    transparent_property! {
        #[doc = "Source IP address or CIDR."]
        source_ip_address: ref Option<String>
    }

    update_field! {
        #[doc = "Update the source IP address or CIDR."]
        set_source_ip_address, with_source_ip_address -> source_ip_address: optional String
    }

    transparent_property! {
        #[doc = "Source port or range."]
        source_port: ref Option<String>
    }

    update_field! {
        #[doc = "Update the source port or range."]
        set_source_port, with_source_port -> source_port: optional String
    }

    /// Delete the rule.
    pub async fn delete(self) -> Result<DeletionWaiter<FirewallRule>> {
        api::delete_firewall_rule(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the rule is modified.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the rule.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::FirewallRuleUpdate::default();
        save_fields! {
            self -> update: action enabled ip_version shared
        };
        save_option_fields! {
            self -> update: description destination_ip_address destination_port name
                protocol source_ip_address source_port
        };
        let inner = api::update_firewall_rule(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        self.inner = inner;
        Ok(())
    }
}

#[async_trait]
impl Refresh for FirewallRule {
    /// Refresh the rule.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_firewall_rule(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl FirewallRuleQuery {
    pub(crate) fn new(session: Session) -> FirewallRuleQuery {
        FirewallRuleQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: FirewallRuleFilter) {
        if let FirewallRuleFilter::Marker(..) | FirewallRuleFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter);
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: FirewallRuleFilter) -> Self {
        self.set(filter);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<FirewallRule>> {
        debug!("Fetching firewall rules with {:?}", self.query);
        let session = self.session.clone();
        api::list_firewall_rules(&self.session, &self.query, self.can_paginate)
            .into_stream::<protocol::FirewallRule>()
            .map_ok(move |inner| FirewallRule::new(session.clone(), inner))
    }

    /// Execute this request and return all results.
    #[inline]
    pub async fn all(self) -> Result<Vec<FirewallRule>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<FirewallRule> {
        debug!("Fetching one firewall rule with {:?}", self.query);
        if self.can_paginate {
            self.query.push(FirewallRuleFilter::Limit(2));
        }

        let inner = api::list_firewall_rules(&self.session, &self.query, false)
            .one::<protocol::FirewallRule>()
            .await?;
        Ok(FirewallRule::new(self.session, inner))
    }
}

impl NewFirewallRule {
    pub(crate) fn new(session: Session) -> NewFirewallRule {
        NewFirewallRule {
            session,
            inner: protocol::FirewallRuleCreate::default(),
        }
    }

    /// Request creation of the rule.
    pub async fn create(self) -> Result<FirewallRule> {
        let inner = api::create_firewall_rule(&self.session, self.inner).await?;
        Ok(FirewallRule::new(self.session, inner))
    }

    creation_field! {
        #[doc = "Set the action (defaults to deny)."]
        set_action, with_action -> action: optional FirewallAction
    }

    creation_field! {
        #[doc = "Set description of the rule."]
        set_description, with_description -> description: optional String
    }

    creation_field! {
        #[doc = "Set the destination IP address or CIDR."]
        set_destination_ip_address, with_destination_ip_address -> destination_ip_address: optional String
    }

    creation_field! {
        #[doc = "Set the destination port or range."]
        set_destination_port, with_destination_port -> destination_port: optional String
    }

    creation_field! {
        #[doc = "Enable or disable the rule."]
        set_enabled, with_enabled -> enabled: optional bool
    }

    creation_field! {
        #[doc = "Set the IP version."]
        set_ip_version, with_ip_version -> ip_version: optional IpVersion
    }

    creation_field! {
        #[doc = "Set name of the rule."]
        set_name, with_name -> name: optional String
    }

    creation_field! {
        #[doc = "Set the owning project (admin only)."]
        set_project, with_project -> project_id: optional ProjectRef
    }

    creation_field! {
        #[doc = "Set the IP protocol."]
        set_protocol, with_protocol -> protocol: optional FirewallProtocol
    }

    creation_field! {
        #[doc = "Set whether the rule is shared."]
        set_shared, with_shared -> shared: optional bool
    }

    creation_field! {
        #[doc = "Set the source IP address or CIDR."]
        set_source_ip_address, with_source_ip_address -> source_ip_address: optional String
    }

    creation_field! {
        #[doc = "Set the source port or range."]
        set_source_port, with_source_port -> source_port: optional String
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::auth::NoAuth;

    async fn policy() -> FirewallPolicy {
        let session = Session::new(NoAuth::new("http://127.0.0.1:9696").unwrap()).await.unwrap();
        let inner = serde_json::from_value(json!({
            "name": "policy1",
            "firewall_rules": [
                "75452b36-268e-4e75-aaf4-f0e7ed50bc97",
                "c9e77ca0-1bc8-497d-904d-948107873dc6"
            ],
            "tenant_id": "9145d91459d248b1b02fdaca97c6a75d",
            "audited": true,
            "shared": false,
            "id": "f2b08c1e-aa81-4668-8ae1-1401bcb0576c",
            "description": "Firewall policy 1"
        }))
        .unwrap();
        FirewallPolicy::new(session, inner)
    }

    #[tokio::test]
    async fn test_policy_properties() {
        let policy = policy().await;
        assert!(policy.audited());
        assert_eq!(policy.firewall_rules().len(), 2);
        assert_eq!(
            policy.project_id().as_deref(),
            Some("9145d91459d248b1b02fdaca97c6a75d")
        );
    }

    #[tokio::test]
    async fn test_insert_rule_both_positions() {
        let mut policy = policy().await;
        let err = policy
            .insert_rule("unknown")
            .before("1")
            .after("2")
            .send()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err
            .to_string()
            .contains("Exactly one of InsertBefore and InsertAfter must be provided"));
    }

    #[test]
    fn test_insert_rule_body() {
        let request = protocol::InsertRule {
            firewall_rule_id: "7d305689".into(),
            insert_after: None,
            insert_before: Some("3062ed90".into()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"firewall_rule_id": "7d305689", "insert_before": "3062ed90"})
        );
    }

    #[test]
    fn test_rule_defaults() {
        let rule: protocol::FirewallRule = serde_json::from_value(json!({
            "action": "allow",
            "id": "rule",
            "ip_version": 4,
            "protocol": null,
            "source_ip_address": "",
            "enabled": true
        }))
        .unwrap();
        assert_eq!(rule.action, FirewallAction::Allow);
        assert_eq!(rule.ip_version, IpVersion::V4);
        assert!(rule.protocol.is_none());
        assert!(rule.source_ip_address.is_none());
    }

    #[test]
    fn test_group_parse() {
        let group: protocol::FirewallGroup = serde_json::from_value(json!({
            "id": "3af94f0e-b52d-491a-87d2-704497305948",
            "tenant_id": "9f98fc0e5f944cd1b51798b668dc8778",
            "name": "test",
            "description": "fancy group",
            "ingress_firewall_policy_id": "e3f11142-3792-454b-8d3e-91ac1bf127b4",
            "egress_firewall_policy_id": null,
            "admin_state_up": true,
            "ports": ["a6af1e56-b12b-4733-8f77-49166afd5719"],
            "status": "ACTIVE",
            "shared": false
        }))
        .unwrap();
        assert_eq!(
            group.ingress_firewall_policy_id.as_deref(),
            Some("e3f11142-3792-454b-8d3e-91ac1bf127b4")
        );
        assert!(group.egress_firewall_policy_id.is_none());
        assert_eq!(group.status, FirewallGroupStatus::Active);
        assert_eq!(
            group.project_id.as_deref(),
            Some("9f98fc0e5f944cd1b51798b668dc8778")
        );
    }

    #[test]
    fn test_group_remove_policy_body() {
        let update = protocol::FirewallGroupUpdate {
            egress_firewall_policy_id: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(protocol::FirewallGroupUpdateRoot {
                firewall_group: update
            })
            .unwrap(),
            json!({"firewall_group": {"egress_firewall_policy_id": null}})
        );
    }

    #[tokio::test]
    async fn test_group_policy_from_object() {
        let policy = policy().await;
        let request = NewFirewallGroup::new(policy.session.clone())
            .with_ingress_firewall_policy(&policy)
            .with_port("a6af1e56");
        assert_eq!(
            serde_json::to_value(&request.inner).unwrap(),
            json!({
                "ingress_firewall_policy_id": "f2b08c1e-aa81-4668-8ae1-1401bcb0576c",
                "ports": ["a6af1e56"]
            })
        );
    }
}
