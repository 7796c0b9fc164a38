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

//! Load Balancer API calls.

use super::protocol::*;
use crate::common::{NextLink, Pager, Query, QueryItem};
use crate::services::{GenericService, LOAD_BALANCER};
use crate::{Result, Session};

fn list_request<T: QueryItem>(
    session: &Session,
    path: &[&str],
    query: &Query<T>,
    items_key: &str,
    paginate: bool,
) -> Pager<GenericService> {
    let pager = Pager::new(session.get(LOAD_BALANCER, path).query(query), items_key);
    if paginate {
        pager.linked(NextLink::Links(format!("{}_links", items_key)))
    } else {
        pager
    }
}

/// Create a load balancer.
pub async fn create_load_balancer(
    session: &Session,
    request: LoadBalancerCreate,
) -> Result<LoadBalancer> {
    debug!("Creating a new load balancer with {:?}", request);
    let body = LoadBalancerCreateRoot {
        loadbalancer: request,
    };
    let root: LoadBalancerRoot = session
        .post(LOAD_BALANCER, &["lbaas", "loadbalancers"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created load balancer {:?}", root.loadbalancer);
    Ok(root.loadbalancer)
}

/// Delete a load balancer, optionally with all its children.
pub async fn delete_load_balancer<S: AsRef<str>>(
    session: &Session,
    id: S,
    cascade: bool,
) -> Result<()> {
    debug!(
        "Deleting load balancer {} (cascade: {})",
        id.as_ref(),
        cascade
    );
    let mut request = session.delete(LOAD_BALANCER, &["lbaas", "loadbalancers", id.as_ref()]);
    if cascade {
        request = request.query(&[("cascade", true)]);
    }
    let _ = request.send().await?;
    debug!("Load balancer {} was scheduled for deletion", id.as_ref());
    Ok(())
}

/// Fail over a load balancer.
pub async fn failover_load_balancer<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Requesting failover of load balancer {}", id.as_ref());
    let _ = session
        .put(
            LOAD_BALANCER,
            &["lbaas", "loadbalancers", id.as_ref(), "failover"],
        )
        .send()
        .await?;
    debug!("Failover of load balancer {} was accepted", id.as_ref());
    Ok(())
}

/// Get a load balancer.
pub async fn get_load_balancer<S: AsRef<str>>(session: &Session, id: S) -> Result<LoadBalancer> {
    trace!("Get load balancer by ID {}", id.as_ref());
    let root: LoadBalancerRoot = session
        .get(LOAD_BALANCER, &["lbaas", "loadbalancers", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.loadbalancer);
    Ok(root.loadbalancer)
}

/// Get statistics of a load balancer.
pub async fn get_load_balancer_stats<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<LoadBalancerStats> {
    trace!("Get statistics of load balancer {}", id.as_ref());
    let root: LoadBalancerStatsRoot = session
        .get(
            LOAD_BALANCER,
            &["lbaas", "loadbalancers", id.as_ref(), "stats"],
        )
        .fetch()
        .await?;
    trace!("Received {:?}", root.stats);
    Ok(root.stats)
}

/// Get the status tree of a load balancer.
pub async fn get_load_balancer_status<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<LoadBalancerStatusTree> {
    trace!("Get status tree of load balancer {}", id.as_ref());
    let root: LoadBalancerStatusRoot = session
        .get(
            LOAD_BALANCER,
            &["lbaas", "loadbalancers", id.as_ref(), "status"],
        )
        .fetch()
        .await?;
    trace!("Received {:?}", root.statuses.loadbalancer);
    Ok(root.statuses.loadbalancer)
}

/// List load balancers.
pub fn list_load_balancers(
    session: &Session,
    query: &Query<LoadBalancerFilter>,
    paginate: bool,
) -> Pager<GenericService> {
    trace!("Listing load balancers with {:?}", query);
    list_request(
        session,
        &["lbaas", "loadbalancers"],
        query,
        "loadbalancers",
        paginate,
    )
}

/// Update a load balancer.
pub async fn update_load_balancer<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: LoadBalancerUpdate,
) -> Result<LoadBalancer> {
    debug!("Updating load balancer {} with {:?}", id.as_ref(), update);
    let body = LoadBalancerUpdateRoot {
        loadbalancer: update,
    };
    let root: LoadBalancerRoot = session
        .put(LOAD_BALANCER, &["lbaas", "loadbalancers", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated load balancer {:?}", root.loadbalancer);
    Ok(root.loadbalancer)
}

/// Create a listener.
pub async fn create_listener(session: &Session, request: ListenerCreate) -> Result<Listener> {
    debug!("Creating a new listener with {:?}", request);
    let body = ListenerCreateRoot { listener: request };
    let root: ListenerRoot = session
        .post(LOAD_BALANCER, &["lbaas", "listeners"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created listener {:?}", root.listener);
    Ok(root.listener)
}

/// Delete a listener.
pub async fn delete_listener<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting listener {}", id.as_ref());
    let _ = session
        .delete(LOAD_BALANCER, &["lbaas", "listeners", id.as_ref()])
        .send()
        .await?;
    debug!("Listener {} was deleted", id.as_ref());
    Ok(())
}

/// Get a listener.
pub async fn get_listener<S: AsRef<str>>(session: &Session, id: S) -> Result<Listener> {
    trace!("Get listener by ID {}", id.as_ref());
    let root: ListenerRoot = session
        .get(LOAD_BALANCER, &["lbaas", "listeners", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.listener);
    Ok(root.listener)
}

/// List listeners.
pub fn list_listeners(
    session: &Session,
    query: &Query<ListenerFilter>,
    paginate: bool,
) -> Pager<GenericService> {
    trace!("Listing listeners with {:?}", query);
    list_request(
        session,
        &["lbaas", "listeners"],
        query,
        "listeners",
        paginate,
    )
}

/// Update a listener.
pub async fn update_listener<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: ListenerUpdate,
) -> Result<Listener> {
    debug!("Updating listener {} with {:?}", id.as_ref(), update);
    let body = ListenerUpdateRoot { listener: update };
    let root: ListenerRoot = session
        .put(LOAD_BALANCER, &["lbaas", "listeners", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated listener {:?}", root.listener);
    Ok(root.listener)
}

/// Create a pool.
pub async fn create_pool(session: &Session, request: PoolCreate) -> Result<Pool> {
    debug!("Creating a new pool with {:?}", request);
    let body = PoolCreateRoot { pool: request };
    let root: PoolRoot = session
        .post(LOAD_BALANCER, &["lbaas", "pools"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created pool {:?}", root.pool);
    Ok(root.pool)
}

/// Delete a pool.
pub async fn delete_pool<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting pool {}", id.as_ref());
    let _ = session
        .delete(LOAD_BALANCER, &["lbaas", "pools", id.as_ref()])
        .send()
        .await?;
    debug!("Pool {} was deleted", id.as_ref());
    Ok(())
}

/// Get a pool.
pub async fn get_pool<S: AsRef<str>>(session: &Session, id: S) -> Result<Pool> {
    trace!("Get pool by ID {}", id.as_ref());
    let root: PoolRoot = session
        .get(LOAD_BALANCER, &["lbaas", "pools", id.as_ref()])
        .fetch()
        .await?;
    trace!("Received {:?}", root.pool);
    Ok(root.pool)
}

/// List pools.
pub fn list_pools(
    session: &Session,
    query: &Query<PoolFilter>,
    paginate: bool,
) -> Pager<GenericService> {
    trace!("Listing pools with {:?}", query);
    list_request(session, &["lbaas", "pools"], query, "pools", paginate)
}

/// Update a pool.
pub async fn update_pool<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: PoolUpdate,
) -> Result<Pool> {
    debug!("Updating pool {} with {:?}", id.as_ref(), update);
    let body = PoolUpdateRoot { pool: update };
    let root: PoolRoot = session
        .put(LOAD_BALANCER, &["lbaas", "pools", id.as_ref()])
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated pool {:?}", root.pool);
    Ok(root.pool)
}

/// Replace all members of a pool.
pub async fn batch_update_members<S: AsRef<str>>(
    session: &Session,
    pool: S,
    members: Vec<MemberSpec>,
) -> Result<()> {
    debug!(
        "Replacing members of pool {} with {:?}",
        pool.as_ref(),
        members
    );
    let body = MembersBatchRoot { members };
    let _ = session
        .put(LOAD_BALANCER, &["lbaas", "pools", pool.as_ref(), "members"])
        .json(&body)
        .send()
        .await?;
    debug!("Batch update of pool {} members was accepted", pool.as_ref());
    Ok(())
}

/// Create a pool member.
pub async fn create_member<S: AsRef<str>>(
    session: &Session,
    pool: S,
    request: MemberSpec,
) -> Result<Member> {
    debug!(
        "Creating a new member of pool {} with {:?}",
        pool.as_ref(),
        request
    );
    let body = MemberCreateRoot { member: request };
    let root: MemberRoot = session
        .post(LOAD_BALANCER, &["lbaas", "pools", pool.as_ref(), "members"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created member {:?}", root.member);
    Ok(root.member)
}

/// Delete a pool member.
pub async fn delete_member<S1, S2>(session: &Session, pool: S1, id: S2) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug!("Deleting member {} of pool {}", id.as_ref(), pool.as_ref());
    let _ = session
        .delete(
            LOAD_BALANCER,
            &["lbaas", "pools", pool.as_ref(), "members", id.as_ref()],
        )
        .send()
        .await?;
    debug!("Member {} was deleted", id.as_ref());
    Ok(())
}

/// Get a pool member.
pub async fn get_member<S1, S2>(session: &Session, pool: S1, id: S2) -> Result<Member>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    trace!("Get member {} of pool {}", id.as_ref(), pool.as_ref());
    let root: MemberRoot = session
        .get(
            LOAD_BALANCER,
            &["lbaas", "pools", pool.as_ref(), "members", id.as_ref()],
        )
        .fetch()
        .await?;
    trace!("Received {:?}", root.member);
    Ok(root.member)
}

/// List members of a pool.
pub fn list_members<S: AsRef<str>>(
    session: &Session,
    pool: S,
    query: &Query<MemberFilter>,
    paginate: bool,
) -> Pager<GenericService> {
    trace!("Listing members of pool {} with {:?}", pool.as_ref(), query);
    list_request(
        session,
        &["lbaas", "pools", pool.as_ref(), "members"],
        query,
        "members",
        paginate,
    )
}

/// Update a pool member.
pub async fn update_member<S1, S2>(
    session: &Session,
    pool: S1,
    id: S2,
    update: MemberUpdate,
) -> Result<Member>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug!(
        "Updating member {} of pool {} with {:?}",
        id.as_ref(),
        pool.as_ref(),
        update
    );
    let body = MemberUpdateRoot { member: update };
    let root: MemberRoot = session
        .put(
            LOAD_BALANCER,
            &["lbaas", "pools", pool.as_ref(), "members", id.as_ref()],
        )
        .json(&body)
        .fetch()
        .await?;
    debug!("Updated member {:?}", root.member);
    Ok(root.member)
}
