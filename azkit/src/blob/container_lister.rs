// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use azkit_core::time::{parse_http_date, DateTime};
use azkit_core::{Error, Result};
use bytes::{Buf, Bytes};
use futures::Stream;
use http::{Request, StatusCode};
use log::debug;
use quick_xml::de;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};

use super::non_empty;
use crate::error::parse_error;
use crate::path::{percent_encode_path, percent_encode_query};
use crate::ServiceClient;

/// One entry of a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerItem {
    /// Container name.
    pub name: String,
    /// Container url.
    pub url: String,
    /// Entity tag.
    pub etag: Option<String>,
    /// Time of the last change to the container or its properties.
    pub last_modified: Option<DateTime>,
    /// User metadata, only filled when listed with
    /// [`ContainerLister::with_metadata`].
    pub metadata: HashMap<String, String>,
}

/// Pager over the containers of an account.
///
/// Works like [`super::BlobLister`]: one `List Containers` call per page,
/// following `NextMarker`.
///
/// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/list-containers2>
#[derive(Debug)]
pub struct ContainerLister {
    client: ServiceClient,
    prefix: Option<String>,
    max_results: Option<usize>,
    include_metadata: bool,

    next_marker: String,
    done: bool,
    buffer: VecDeque<ContainerItem>,
}

impl ContainerLister {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self {
            client,
            prefix: None,
            max_results: None,
            include_metadata: false,

            next_marker: String::new(),
            done: false,
            buffer: VecDeque::new(),
        }
    }

    /// Only list containers whose name starts with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Ask for at most `max_results` containers per page.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Return each container's user metadata too.
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    /// Fetch the next page, `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ContainerItem>>> {
        if self.done {
            return Ok(None);
        }

        let mut url = format!("{}/?comp=list", self.client.url());
        if let Some(prefix) = &self.prefix {
            url.push_str(&format!("&prefix={}", percent_encode_query(prefix)));
        }
        if let Some(max_results) = self.max_results {
            url.push_str(&format!("&maxresults={max_results}"));
        }
        if self.include_metadata {
            url.push_str("&include=metadata");
        }
        if !self.next_marker.is_empty() {
            url.push_str(&format!("&marker={}", percent_encode_query(&self.next_marker)));
        }

        let req = Request::get(url).body(Bytes::new())?;
        let resp = self.client.send(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(parse_error(resp));
        }

        let output: Output = de::from_reader(resp.into_body().reader()).map_err(|e| {
            Error::unexpected("failed to deserialize list containers response").with_source(e)
        })?;

        self.next_marker = output.next_marker.unwrap_or_default();
        self.done = self.next_marker.is_empty();

        let items = output
            .containers
            .container
            .into_iter()
            .map(|c| self.to_item(c))
            .collect::<Result<Vec<_>>>()?;
        debug!("listed {} containers, done: {}", items.len(), self.done);

        Ok(Some(items))
    }

    /// Fetch the next container, `None` once the listing is exhausted.
    pub async fn next(&mut self) -> Result<Option<ContainerItem>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.buffer.extend(page),
                None => return Ok(None),
            }
        }
    }

    /// Drain every remaining container.
    pub async fn collect(mut self) -> Result<Vec<ContainerItem>> {
        let mut items: Vec<_> = self.buffer.drain(..).collect();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }

    /// Turn the lister into a stream of containers.
    pub fn into_stream(self) -> impl Stream<Item = Result<ContainerItem>> {
        futures::stream::try_unfold(self, |mut lister| async move {
            Ok(lister.next().await?.map(|item| (item, lister)))
        })
    }

    fn to_item(&self, container: Container) -> Result<ContainerItem> {
        let props = container.properties;
        let last_modified = if props.last_modified.is_empty() {
            None
        } else {
            Some(parse_http_date(&props.last_modified)?)
        };

        Ok(ContainerItem {
            url: format!("{}/{}", self.client.url(), percent_encode_path(&container.name)),
            name: container.name,
            etag: non_empty(props.etag),
            last_modified,
            metadata: container.metadata,
        })
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Output {
    containers: Containers,
    #[serde(rename = "NextMarker")]
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Containers {
    container: Vec<Container>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Container {
    name: String,
    properties: Properties,
    metadata: HashMap<String, String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Properties {
    #[serde(rename = "Last-Modified")]
    last_modified: String,
    etag: String,
}
