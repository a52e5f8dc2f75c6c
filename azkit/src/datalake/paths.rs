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
use http::{Request, StatusCode};
use log::debug;
use serde::Deserialize;
use serde_json::de;
use std::collections::VecDeque;

use super::{FileSystemClient, X_MS_CONTINUATION};
use crate::error::parse_error;
use crate::path::percent_encode_query;
use crate::response::header_string;

/// One entry of a path listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    /// Path relative to the file system root.
    pub name: String,
    /// Whether the path is a directory.
    pub is_directory: bool,
    /// Size in bytes, `0` for directories.
    pub content_length: u64,
    /// Entity tag.
    pub etag: Option<String>,
    /// Time of the last write.
    pub last_modified: Option<DateTime>,
}

/// Pager over the direct children of a directory.
///
/// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/datalakestoragegen2/path/list>
#[derive(Debug)]
pub struct PathLister {
    file_system: FileSystemClient,
    directory: String,
    max_results: Option<usize>,

    continuation: String,
    done: bool,
    buffer: VecDeque<PathItem>,
}

impl PathLister {
    pub(crate) fn new(file_system: FileSystemClient, directory: &str) -> Self {
        Self {
            file_system,
            directory: directory.to_string(),
            max_results: None,

            continuation: String::new(),
            done: false,
            buffer: VecDeque::new(),
        }
    }

    /// Ask for at most `max_results` paths per page.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Fetch the next page, `None` once the listing is exhausted.
    ///
    /// Listing a directory that doesn't exist yields no page at all.
    pub async fn next_page(&mut self) -> Result<Option<Vec<PathItem>>> {
        if self.done {
            return Ok(None);
        }

        let mut url = format!(
            "{}?resource=filesystem&recursive=false",
            self.file_system.url()
        );
        if !self.directory.is_empty() {
            url.push_str(&format!(
                "&directory={}",
                percent_encode_query(&self.directory)
            ));
        }
        if let Some(max_results) = self.max_results {
            url.push_str(&format!("&maxResults={max_results}"));
        }
        if !self.continuation.is_empty() {
            url.push_str(&format!(
                "&continuation={}",
                percent_encode_query(&self.continuation)
            ));
        }

        let req = Request::get(url).body(Bytes::new())?;
        let resp = self.file_system.service().send(req).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            self.done = true;
            return Ok(None);
        }
        if resp.status() != StatusCode::OK {
            return Err(parse_error(resp));
        }

        self.continuation = header_string(resp.headers(), X_MS_CONTINUATION).unwrap_or_default();
        self.done = self.continuation.is_empty();

        let output: Output = de::from_reader(resp.into_body().reader()).map_err(|e| {
            Error::unexpected("failed to deserialize list paths response").with_source(e)
        })?;
        let items = output
            .paths
            .into_iter()
            .map(Path::into_item)
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "listed {} paths in {}/{}, done: {}",
            items.len(),
            self.file_system.name(),
            self.directory,
            self.done
        );

        Ok(Some(items))
    }

    /// Fetch the next path, `None` once the listing is exhausted.
    pub async fn next(&mut self) -> Result<Option<PathItem>> {
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

    /// Drain every remaining path.
    pub async fn collect(mut self) -> Result<Vec<PathItem>> {
        let mut items: Vec<_> = self.buffer.drain(..).collect();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

/// ```json
/// {"paths":[{"contentLength":"13","etag":"0x8DACF9B0061305F","isDirectory":"false","lastModified":"Sat, 26 Nov 2022 10:43:05 GMT","name":"my-directory/uploaded-file.txt"}]}
/// ```
#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct Output {
    paths: Vec<Path>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Path {
    content_length: String,
    etag: String,
    /// `"true"` or `"false"`, and absent for files.
    is_directory: String,
    last_modified: String,
    name: String,
}

impl Path {
    fn into_item(self) -> Result<PathItem> {
        let content_length = if self.content_length.is_empty() {
            0
        } else {
            self.content_length.parse().map_err(|e| {
                Error::unexpected(format!(
                    "content length {} of {} is not a valid integer",
                    self.content_length, self.name
                ))
                .with_source(e)
            })?
        };
        let last_modified = if self.last_modified.is_empty() {
            None
        } else {
            Some(parse_http_date(&self.last_modified)?)
        };

        Ok(PathItem {
            is_directory: self.is_directory == "true",
            content_length,
            etag: (!self.etag.is_empty()).then_some(self.etag),
            last_modified,
            name: self.name,
        })
    }
}
