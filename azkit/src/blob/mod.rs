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

//! Blob service: containers, block blobs and listing.

use http::HeaderMap;
use std::collections::HashMap;

mod container;
pub use container::ContainerClient;

mod container_lister;
pub use container_lister::{ContainerItem, ContainerLister};

mod blob_client;
pub use blob_client::{BlobClient, BlobHttpHeaders, BlobProperties, DownloadResponse};

mod lister;
pub use lister::{BlobEntry, BlobHierarchyLister, BlobItem, BlobLister};

const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
const BLOCK_BLOB: &str = "BlockBlob";
const X_MS_META_PREFIX: &str = "x-ms-meta-";

fn non_empty(v: String) -> Option<String> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

/// Attach `metadata` as `x-ms-meta-*` headers.
fn with_metadata(
    mut req: http::request::Builder,
    metadata: &HashMap<String, String>,
) -> http::request::Builder {
    for (key, value) in metadata {
        req = req.header(format!("{X_MS_META_PREFIX}{key}"), value);
    }
    req
}

/// Collect `x-ms-meta-*` headers. Names come back lowercased.
fn metadata_from_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            let key = k.as_str().strip_prefix(X_MS_META_PREFIX)?;
            Some((key.to_string(), v.to_str().ok()?.to_string()))
        })
        .collect()
}
