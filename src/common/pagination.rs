// Copyright 2023 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Paginated listing of resources.
//!
//! A [Pager](struct.Pager.html) walks over the pages of a collection using one of
//! the supported [strategies](enum.PaginationStrategy.html). The walk can be driven
//! with a callback or consumed as a stream.

use async_stream::try_stream;
use futures::{pin_mut, Stream, TryStreamExt};
use osauth::services::ServiceType;
use osauth::ServiceRequestBuilder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::protocol::Link;
use crate::error::{check, invalid_response, send_checked};
use crate::{Error, ErrorKind, Result};

/// Where to find the next page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLink {
    /// An array of links under the given key, the one with `rel` equal to `next` is used.
    Links(String),
    /// A plain string field with the given name.
    Field(String),
}

/// Pagination strategy of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// The collection is returned in one response.
    Single,
    /// Each page links to the next one.
    Linked(NextLink),
    /// The next page is requested with the ID of the last item as a marker.
    Marker {
        /// Field of an item holding its ID.
        id_key: String,
    },
}

/// One page of a collection.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    status: StatusCode,
    body: Value,
    items_key: String,
    next_url: Option<Url>,
}

/// A walker over paginated collections of the service `S`.
#[derive(Debug)]
#[must_use = "a pager does nothing until iterated"]
pub struct Pager<S: ServiceType> {
    request: ServiceRequestBuilder<S>,
    headers: HeaderMap,
    items_key: String,
    strategy: PaginationStrategy,
    limit: Option<usize>,
}

enum PageRequest<S: ServiceType> {
    Service(ServiceRequestBuilder<S>),
    Absolute(osauth::client::RequestBuilder),
}

impl Page {
    /// URL this page was fetched from.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status of the response.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw JSON body (`null` for empty responses).
    #[inline]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Deserialize items on this page.
    ///
    /// A missing items key yields no items.
    pub fn items<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        match self.body.get(&self.items_key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items) => Vec::<T>::deserialize(items)
                .map_err(|e| invalid_response(format!("items under {}: {}", self.items_key, e))),
        }
    }

    /// URL of the next page (only for linked pagination).
    #[inline]
    pub fn next_url(&self) -> Option<&Url> {
        self.next_url.as_ref()
    }

    /// Whether the page contains no items.
    pub fn is_empty(&self) -> bool {
        if self.status == StatusCode::NO_CONTENT {
            return true;
        }

        match self.body.get(&self.items_key) {
            Some(Value::Array(items)) => items.is_empty(),
            _ => true,
        }
    }

    fn last_item(&self) -> Option<&Value> {
        self.body
            .get(&self.items_key)
            .and_then(Value::as_array)
            .and_then(|items| items.last())
    }

    fn item_count(&self) -> usize {
        self.body
            .get(&self.items_key)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn find_next_url(body: &Value, link: &NextLink, current: &Url) -> Result<Option<Url>> {
    let href = match link {
        NextLink::Links(key) => match body.get(key) {
            None | Some(Value::Null) => None,
            Some(value @ Value::Array(..)) => Vec::<Link>::deserialize(value)
                .map_err(|e| invalid_response(format!("{}: {}", key, e)))?
                .into_iter()
                .find(|link| link.rel == "next")
                .map(|link| link.href),
            Some(other) => {
                return Err(invalid_response(format!(
                    "expected an array of links in {}, got {}",
                    key, other
                )))
            }
        },
        NextLink::Field(key) => match body.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(href)) if href.is_empty() => None,
            Some(Value::String(href)) => Some(href.clone()),
            Some(other) => {
                return Err(invalid_response(format!(
                    "expected a URL in {}, got {}",
                    key, other
                )))
            }
        },
    };

    match href {
        Some(href) => {
            let next = current
                .join(&href)
                .map_err(|e| invalid_response(format!("invalid next link {}: {}", href, e)))?;
            if &next == current {
                warn!("Next page link {} points to the current page", next);
                Ok(None)
            } else {
                Ok(Some(next))
            }
        }
        None => Ok(None),
    }
}

impl<S> Pager<S>
where
    S: ServiceType + Clone + Send,
{
    /// Create a pager returning exactly one page.
    pub fn new<K: Into<String>>(request: ServiceRequestBuilder<S>, items_key: K) -> Pager<S> {
        Pager {
            request,
            headers: HeaderMap::new(),
            items_key: items_key.into(),
            strategy: PaginationStrategy::Single,
            limit: None,
        }
    }

    /// Use linked pagination.
    #[inline]
    pub fn linked(mut self, next: NextLink) -> Pager<S> {
        self.strategy = PaginationStrategy::Linked(next);
        self
    }

    /// Use marker-based pagination.
    #[inline]
    pub fn marker<K: Into<String>>(mut self, id_key: K) -> Pager<S> {
        self.strategy = PaginationStrategy::Marker {
            id_key: id_key.into(),
        };
        self
    }

    /// Use the given strategy.
    #[inline]
    pub fn with_strategy(mut self, strategy: PaginationStrategy) -> Pager<S> {
        self.strategy = strategy;
        self
    }

    /// Request pages of the given size (only for marker-based pagination).
    #[inline]
    pub fn with_limit(mut self, limit: usize) -> Pager<S> {
        self.limit = Some(limit);
        self
    }

    /// Send a header with every page request, including the linked ones.
    #[inline]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Pager<S> {
        let _ = self.headers.insert(name, value);
        self
    }

    /// Pagination strategy in use.
    #[inline]
    pub fn strategy(&self) -> &PaginationStrategy {
        &self.strategy
    }

    /// Call the callback on each non-empty page.
    ///
    /// Iteration stops when the callback returns `Ok(false)` or an error.
    pub async fn each_page<F>(self, mut callback: F) -> Result<()>
    where
        F: FnMut(Page) -> Result<bool>,
    {
        let pages = self.into_pages();
        pin_mut!(pages);
        while let Some(page) = pages.try_next().await? {
            if !callback(page)? {
                trace!("Pagination stopped by the caller");
                break;
            }
        }
        Ok(())
    }

    /// Convert this pager into a stream of non-empty pages.
    pub fn into_pages(self) -> impl Stream<Item = Result<Page>> {
        try_stream! {
            let mut request = self.initial_request()?;
            loop {
                let page = self.fetch_page(request).await?;
                if page.is_empty() {
                    trace!("Page at {} is empty, stopping", page.url);
                    break;
                }

                let next = self.next_request(&page)?;
                yield page;
                match next {
                    Some(next) => request = next,
                    None => break,
                }
            }
        }
    }

    /// Convert this pager into a stream of items.
    pub fn into_stream<T>(self) -> impl Stream<Item = Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        try_stream! {
            let pages = self.into_pages();
            pin_mut!(pages);
            while let Some(page) = pages.try_next().await? {
                for item in page.items::<T>()? {
                    yield item;
                }
            }
        }
    }

    /// Fetch all items.
    #[inline]
    pub async fn all<T>(self) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one item.
    ///
    /// Fails with `ResourceNotFound` if there are no items and with `TooManyItems`
    /// if there is more than one.
    pub async fn one<T>(self) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let stream = self.into_stream::<T>();
        pin_mut!(stream);
        match stream.try_next().await? {
            Some(result) => {
                if stream.try_next().await?.is_some() {
                    Err(Error::new(
                        ErrorKind::TooManyItems,
                        "Query returned more than one result",
                    ))
                } else {
                    Ok(result)
                }
            }
            None => Err(Error::new(
                ErrorKind::ResourceNotFound,
                "Query returned no results",
            )),
        }
    }

    fn clone_request(&self) -> Result<ServiceRequestBuilder<S>> {
        self.request
            .try_clone()
            .map(|request| request.headers(self.headers.clone()))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "Requests with a streaming body cannot be paginated",
                )
            })
    }

    fn first_request(&self) -> Result<ServiceRequestBuilder<S>> {
        let request = self.clone_request()?;
        Ok(match (&self.strategy, self.limit) {
            (PaginationStrategy::Marker { .. }, Some(limit)) => request.query(&[("limit", limit)]),
            _ => request,
        })
    }

    fn initial_request(&self) -> Result<PageRequest<S>> {
        self.first_request().map(PageRequest::Service)
    }

    async fn fetch_page(&self, request: PageRequest<S>) -> Result<Page> {
        let response: Response = match request {
            PageRequest::Service(request) => send_checked(request).await?,
            PageRequest::Absolute(request) => check(request.send_unchecked().await?).await?,
        };
        let url = response.url().clone();
        let status = response.status();
        let body = if status == StatusCode::NO_CONTENT {
            Value::Null
        } else {
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).map_err(invalid_response)?
            }
        };
        trace!("Received page from {} with status {}", url, status);

        let next_url = match self.strategy {
            PaginationStrategy::Linked(ref link) => find_next_url(&body, link, &url)?,
            _ => None,
        };

        Ok(Page {
            url,
            status,
            body,
            items_key: self.items_key.clone(),
            next_url,
        })
    }

    fn next_request(&self, page: &Page) -> Result<Option<PageRequest<S>>> {
        match self.strategy {
            PaginationStrategy::Single => Ok(None),
            PaginationStrategy::Linked(..) => Ok(page.next_url.clone().map(|url| {
                PageRequest::Absolute(
                    self.request
                        .client()
                        .request(Method::GET, url)
                        .headers(self.headers.clone()),
                )
            })),
            PaginationStrategy::Marker { ref id_key } => {
                if let Some(limit) = self.limit {
                    if page.item_count() < limit {
                        return Ok(None);
                    }
                }

                let marker = match page.last_item().and_then(|item| item.get(id_key)) {
                    Some(Value::String(value)) => value.clone(),
                    Some(Value::Number(value)) => value.to_string(),
                    _ => {
                        return Err(invalid_response(format!(
                            "the last item on page {} has no {}",
                            page.url, id_key
                        )))
                    }
                };

                let request = self.first_request()?.query(&[("marker", marker)]);
                Ok(Some(PageRequest::Service(request)))
            }
        }
    }
}
