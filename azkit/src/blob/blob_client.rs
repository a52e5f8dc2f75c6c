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
use azkit_core::Result;
use bytes::Bytes;
use http::header::{
    CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LENGTH,
    CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use http::Request;
use log::debug;
use std::collections::HashMap;

use super::{metadata_from_headers, with_metadata, ContainerClient, BLOCK_BLOB, X_MS_BLOB_TYPE};
use crate::error::parse_error;
use crate::path::percent_encode_path;
use crate::response::{header_string, into_operation, OperationResponse};
use azkit_azure_storage::X_MS_REQUEST_ID;

const X_MS_BLOB_CONTENT_TYPE: &str = "x-ms-blob-content-type";
const X_MS_BLOB_CONTENT_ENCODING: &str = "x-ms-blob-content-encoding";
const X_MS_BLOB_CONTENT_LANGUAGE: &str = "x-ms-blob-content-language";
const X_MS_BLOB_CONTENT_DISPOSITION: &str = "x-ms-blob-content-disposition";
const X_MS_BLOB_CACHE_CONTROL: &str = "x-ms-blob-cache-control";

/// Client for one block blob.
#[derive(Debug, Clone)]
pub struct BlobClient {
    container: ContainerClient,
    name: String,
    url: String,
}

/// Content of a downloaded blob.
#[derive(Debug, Clone)]
pub struct DownloadResponse {
    /// Blob content.
    pub content: Bytes,
    /// Value of `x-ms-request-id`.
    pub request_id: Option<String>,
    /// Content type stored with the blob.
    pub content_type: Option<String>,
}

impl DownloadResponse {
    /// Decode the content as utf-8 text.
    pub fn content_as_text(&self) -> Result<String> {
        Ok(String::from_utf8(self.content.to_vec())?)
    }
}

/// Blob metadata returned by a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobProperties {
    /// Size in bytes.
    pub content_length: u64,
    /// Content type stored with the blob.
    pub content_type: Option<String>,
    /// Content encoding stored with the blob.
    pub content_encoding: Option<String>,
    /// Content language stored with the blob.
    pub content_language: Option<String>,
    /// Content disposition stored with the blob.
    pub content_disposition: Option<String>,
    /// Cache control stored with the blob.
    pub cache_control: Option<String>,
    /// Entity tag, quoted as sent by the service.
    pub etag: Option<String>,
    /// Time of the last write.
    pub last_modified: Option<DateTime>,
    /// User metadata, names lowercased.
    pub metadata: HashMap<String, String>,
}

impl BlobProperties {
    /// The HTTP headers currently stored with the blob.
    ///
    /// [`BlobClient::set_http_headers`] replaces all of them at once, start
    /// from this to change only some.
    pub fn http_headers(&self) -> BlobHttpHeaders {
        BlobHttpHeaders {
            content_type: self.content_type.clone(),
            content_encoding: self.content_encoding.clone(),
            content_language: self.content_language.clone(),
            content_disposition: self.content_disposition.clone(),
            cache_control: self.cache_control.clone(),
        }
    }
}

/// HTTP headers the service returns when the blob is downloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobHttpHeaders {
    /// `Content-Type`
    pub content_type: Option<String>,
    /// `Content-Encoding`
    pub content_encoding: Option<String>,
    /// `Content-Language`
    pub content_language: Option<String>,
    /// `Content-Disposition`
    pub content_disposition: Option<String>,
    /// `Cache-Control`
    pub cache_control: Option<String>,
}

impl BlobClient {
    pub(crate) fn new(container: ContainerClient, name: &str) -> Self {
        let url = format!("{}/{}", container.url(), percent_encode_path(name));
        Self {
            container,
            name: name.to_string(),
            url,
        }
    }

    /// Blob name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blob url.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload `content` as a block blob, replacing any existing blob.
    pub async fn upload(&self, content: impl Into<Bytes>) -> Result<OperationResponse> {
        self.upload_with_content_type(content, "application/octet-stream")
            .await
    }

    /// Upload `content` as a block blob stored with `content_type`.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/put-blob>
    pub async fn upload_with_content_type(
        &self,
        content: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<OperationResponse> {
        let content = content.into();
        debug!("uploading {} bytes to {}", content.len(), self.name);

        let req = Request::put(&self.url)
            .header(X_MS_BLOB_TYPE, BLOCK_BLOB)
            .header(CONTENT_LENGTH, content.len())
            .header(CONTENT_TYPE, content_type)
            .body(content)?;

        into_operation(self.container.service().send(req).await?)
    }

    /// Download the whole blob.
    pub async fn download(&self) -> Result<DownloadResponse> {
        let req = Request::get(&self.url).body(Bytes::new())?;

        let resp = self.container.service().send(req).await?;
        if !resp.status().is_success() {
            return Err(parse_error(resp));
        }

        let request_id = header_string(resp.headers(), X_MS_REQUEST_ID);
        let content_type = header_string(resp.headers(), CONTENT_TYPE.as_str());
        Ok(DownloadResponse {
            content: resp.into_body(),
            request_id,
            content_type,
        })
    }

    /// Fetch the blob's properties without its content.
    pub async fn properties(&self) -> Result<BlobProperties> {
        let req = Request::head(&self.url).body(Bytes::new())?;

        let resp = self.container.service().send(req).await?;
        if !resp.status().is_success() {
            return Err(parse_error(resp));
        }

        let headers = resp.headers();
        Ok(BlobProperties {
            content_length: header_string(headers, CONTENT_LENGTH.as_str())
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            content_type: header_string(headers, CONTENT_TYPE.as_str()),
            content_encoding: header_string(headers, CONTENT_ENCODING.as_str()),
            content_language: header_string(headers, CONTENT_LANGUAGE.as_str()),
            content_disposition: header_string(headers, CONTENT_DISPOSITION.as_str()),
            cache_control: header_string(headers, CACHE_CONTROL.as_str()),
            etag: header_string(headers, ETAG.as_str()),
            last_modified: header_string(headers, LAST_MODIFIED.as_str())
                .map(|v| parse_http_date(&v))
                .transpose()?,
            metadata: metadata_from_headers(headers),
        })
    }

    /// Replace the blob's user metadata with `metadata`.
    ///
    /// Names must be valid HTTP header names, the service stores them
    /// case-insensitively.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/set-blob-metadata>
    pub async fn set_metadata(
        &self,
        metadata: &HashMap<String, String>,
    ) -> Result<OperationResponse> {
        let req = Request::put(format!("{}?comp=metadata", self.url)).header(CONTENT_LENGTH, 0);
        let req = with_metadata(req, metadata).body(Bytes::new())?;

        into_operation(self.container.service().send(req).await?)
    }

    /// Replace the blob's HTTP headers. Headers left `None` are cleared.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/set-blob-properties>
    pub async fn set_http_headers(&self, headers: &BlobHttpHeaders) -> Result<OperationResponse> {
        let mut req =
            Request::put(format!("{}?comp=properties", self.url)).header(CONTENT_LENGTH, 0);
        for (name, value) in [
            (X_MS_BLOB_CONTENT_TYPE, &headers.content_type),
            (X_MS_BLOB_CONTENT_ENCODING, &headers.content_encoding),
            (X_MS_BLOB_CONTENT_LANGUAGE, &headers.content_language),
            (X_MS_BLOB_CONTENT_DISPOSITION, &headers.content_disposition),
            (X_MS_BLOB_CACHE_CONTROL, &headers.cache_control),
        ] {
            if let Some(value) = value {
                req = req.header(name, value);
            }
        }

        into_operation(self.container.service().send(req.body(Bytes::new())?).await?)
    }

    /// Delete the blob.
    pub async fn delete(&self) -> Result<OperationResponse> {
        let req = Request::delete(&self.url).body(Bytes::new())?;

        into_operation(self.container.service().send(req).await?)
    }
}
