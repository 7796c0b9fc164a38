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

//! Waiters.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use super::Refresh;
use crate::{Error, ErrorKind, Result};

/// An asynchronous operation that can be polled until it finishes.
#[async_trait]
pub trait Waiter: Send {
    /// The result of a successful wait.
    type Output: Send;

    /// Default timeout for this operation (`None` to wait forever).
    fn default_wait_timeout(&self) -> Option<Duration>;

    /// Default delay between two polls.
    fn default_delay(&self) -> Duration;

    /// Error to return on timeout.
    fn timeout_error(&self) -> Error;

    /// Check the current state.
    ///
    /// Returns `Some` when the operation is finished.
    async fn poll(&mut self) -> Result<Option<Self::Output>>;

    /// Wait for the default amount of time.
    async fn wait(self) -> Result<Self::Output>
    where
        Self: Sized,
    {
        let timeout = self.default_wait_timeout();
        self.wait_for(timeout).await
    }

    /// Wait for the given amount of time (`None` to wait forever).
    async fn wait_for(mut self, timeout: Option<Duration>) -> Result<Self::Output>
    where
        Self: Sized,
    {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(result) = self.poll().await? {
                return Ok(result);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(self.timeout_error());
                }
            }

            sleep(self.default_delay()).await;
        }
    }
}

/// Wait for resource deletion.
#[derive(Debug)]
pub struct DeletionWaiter<T> {
    inner: T,
    wait_timeout: Duration,
    delay: Duration,
}

impl<T> DeletionWaiter<T> {
    #[allow(dead_code)] // unused with --no-default-features
    pub(crate) fn new(inner: T, wait_timeout: Duration, delay: Duration) -> DeletionWaiter<T> {
        DeletionWaiter {
            inner,
            wait_timeout,
            delay,
        }
    }

    /// Current state of the resource.
    #[inline]
    pub fn current_state(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T> Waiter for DeletionWaiter<T>
where
    T: Refresh + Debug + Send,
{
    type Output = ();

    fn default_wait_timeout(&self) -> Option<Duration> {
        Some(self.wait_timeout)
    }

    fn default_delay(&self) -> Duration {
        self.delay
    }

    fn timeout_error(&self) -> Error {
        Error::new(
            ErrorKind::OperationTimedOut,
            format!(
                "Timeout waiting for resource {:?} to be deleted",
                self.inner
            ),
        )
    }

    async fn poll(&mut self) -> Result<Option<()>> {
        match self.inner.refresh().await {
            Ok(..) => {
                trace!("Still waiting for resource {:?} to be deleted", self.inner);
                Ok(None)
            }
            Err(ref e) if e.kind() == ErrorKind::ResourceNotFound => {
                debug!("Resource {:?} was deleted", self.inner);
                Ok(Some(()))
            }
            Err(e) => {
                debug!("Failed to delete resource {:?} - {}", self.inner, e);
                Err(e)
            }
        }
    }
}
