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
use std::collections::VecDeque;

use super::{non_empty, ContainerClient};
use crate::error::parse_error;
use crate::path::{percent_encode_path, percent_encode_query};

/// One entry of a blob listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    /// Blob name.
    pub name: String,
    /// Blob url.
    pub url: String,
    /// Size in bytes.
    pub content_length: u64,
    /// Content type stored with the blob.
    pub content_type: Option<String>,
    /// Entity tag.
    pub etag: Option<String>,
    /// Time of the last write.
    pub last_modified: Option<DateTime>,
}

/// One entry of a hierarchical blob listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobEntry {
    /// A blob directly under the listed prefix.
    Blob(BlobItem),
    /// A virtual directory: every blob name sharing this prefix up to and
    /// including the delimiter.
    Prefix(String),
}

impl BlobEntry {
    /// Blob name or virtual directory prefix.
    pub fn name(&self) -> &str {
        match self {
            BlobEntry::Blob(item) => &item.name,
            BlobEntry::Prefix(prefix) => prefix,
        }
    }
}

/// Pager over the blobs of a container.
///
/// Each page is one `List Blobs` call, following `NextMarker` until the
/// service returns an empty one. Items can be pulled page by page with
/// [`BlobLister::next_page`], one by one with [`BlobLister::next`], or as a
/// [`Stream`] via [`BlobLister::into_stream`].
///
/// The listing is flat unless [`BlobLister::with_delimiter`] turns it into a
/// [`BlobHierarchyLister`].
///
/// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/list-blobs>
#[derive(Debug)]
pub struct BlobLister {
    container: ContainerClient,
    prefix: Option<String>,
    max_results: Option<usize>,
    delimiter: Option<String>,

    next_marker: String,
    done: bool,
    buffer: VecDeque<BlobItem>,
}

impl BlobLister {
    pub(crate) fn new(container: ContainerClient) -> Self {
        Self {
            container,
            prefix: None,
            max_results: None,
            delimiter: None,

            next_marker: String::new(),
            done: false,
            buffer: VecDeque::new(),
        }
    }

    /// Only list blobs whose name starts with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Ask for at most `max_results` blobs per page.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// List one level of the blob namespace, grouping names on `delimiter`.
    ///
    /// Blob names are split on `delimiter` after the prefix: names without
    /// it are returned as [`BlobEntry::Blob`], the others are folded into one
    /// [`BlobEntry::Prefix`] per virtual directory.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> BlobHierarchyLister {
        self.delimiter = Some(delimiter.into());
        BlobHierarchyLister {
            lister: self,
            buffer: VecDeque::new(),
        }
    }

    /// Fetch the next page, `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<BlobItem>>> {
        Ok(self.fetch_page().await?.map(|(blobs, _)| blobs))
    }

    async fn fetch_page(&mut self) -> Result<Option<(Vec<BlobItem>, Vec<String>)>> {
        if self.done {
            return Ok(None);
        }

        let mut url = format!("{}?restype=container&comp=list", self.container.url());
        if let Some(prefix) = &self.prefix {
            url.push_str(&format!("&prefix={}", percent_encode_query(prefix)));
        }
        if let Some(delimiter) = &self.delimiter {
            url.push_str(&format!("&delimiter={}", percent_encode_query(delimiter)));
        }
        if let Some(max_results) = self.max_results {
            url.push_str(&format!("&maxresults={max_results}"));
        }
        if !self.next_marker.is_empty() {
            url.push_str(&format!("&marker={}", percent_encode_query(&self.next_marker)));
        }

        let req = Request::get(url).body(Bytes::new())?;
        let resp = self.container.service().send(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(parse_error(resp));
        }

        let output: Output = de::from_reader(resp.into_body().reader()).map_err(|e| {
            Error::unexpected("failed to deserialize list blobs response").with_source(e)
        })?;

        self.next_marker = output.next_marker.unwrap_or_default();
        self.done = self.next_marker.is_empty();

        let items = output
            .blobs
            .blob
            .into_iter()
            .map(|blob| self.to_item(blob))
            .collect::<Result<Vec<_>>>()?;
        let prefixes: Vec<String> = output
            .blobs
            .blob_prefix
            .into_iter()
            .map(|v| v.name)
            .collect();
        debug!(
            "listed {} blobs and {} prefixes in {}, done: {}",
            items.len(),
            prefixes.len(),
            self.container.name(),
            self.done
        );

        Ok(Some((items, prefixes)))
    }

    /// Fetch the next blob, `None` once the listing is exhausted.
    pub async fn next(&mut self) -> Result<Option<BlobItem>> {
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

    /// Drain every remaining blob.
    pub async fn collect(mut self) -> Result<Vec<BlobItem>> {
        let mut items: Vec<_> = self.buffer.drain(..).collect();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }

    /// Turn the lister into a stream of blobs.
    pub fn into_stream(self) -> impl Stream<Item = Result<BlobItem>> {
        futures::stream::try_unfold(self, |mut lister| async move {
            Ok(lister.next().await?.map(|item| (item, lister)))
        })
    }

    fn to_item(&self, blob: Blob) -> Result<BlobItem> {
        let props = blob.properties;
        let last_modified = if props.last_modified.is_empty() {
            None
        } else {
            Some(parse_http_date(&props.last_modified)?)
        };

        Ok(BlobItem {
            url: format!("{}/{}", self.container.url(), percent_encode_path(&blob.name)),
            name: blob.name,
            content_length: props.content_length,
            content_type: non_empty(props.content_type),
            etag: non_empty(props.etag),
            last_modified,
        })
    }
}

/// Pager over one level of a container, built by
/// [`BlobLister::with_delimiter`].
///
/// Entries of a page come in name order, prefixes and blobs mixed.
#[derive(Debug)]
pub struct BlobHierarchyLister {
    lister: BlobLister,
    buffer: VecDeque<BlobEntry>,
}

impl BlobHierarchyLister {
    /// Fetch the next page, `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<BlobEntry>>> {
        let Some((blobs, prefixes)) = self.lister.fetch_page().await? else {
            return Ok(None);
        };

        let mut entries: Vec<BlobEntry> = prefixes
            .into_iter()
            .map(BlobEntry::Prefix)
            .chain(blobs.into_iter().map(BlobEntry::Blob))
            .collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(Some(entries))
    }

    /// Fetch the next entry, `None` once the listing is exhausted.
    pub async fn next(&mut self) -> Result<Option<BlobEntry>> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Ok(Some(entry));
            }
            match self.next_page().await? {
                Some(page) => self.buffer.extend(page),
                None => return Ok(None),
            }
        }
    }

    /// Drain every remaining entry.
    pub async fn collect(mut self) -> Result<Vec<BlobEntry>> {
        let mut entries: Vec<_> = self.buffer.drain(..).collect();
        while let Some(page) = self.next_page().await? {
            entries.extend(page);
        }
        Ok(entries)
    }

    /// Turn the lister into a stream of entries.
    pub fn into_stream(self) -> impl Stream<Item = Result<BlobEntry>> {
        futures::stream::try_unfold(self, |mut lister| async move {
            Ok(lister.next().await?.map(|entry| (entry, lister)))
        })
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Output {
    blobs: Blobs,
    #[serde(rename = "NextMarker")]
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Blobs {
    blob: Vec<Blob>,
    blob_prefix: Vec<BlobPrefix>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobPrefix {
    name: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Blob {
    name: String,
    properties: Properties,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Properties {
    #[serde(rename = "Content-Length")]
    content_length: u64,
    #[serde(rename = "Last-Modified")]
    last_modified: String,
    #[serde(rename = "Content-Type")]
    content_type: String,
    etag: String,
}
