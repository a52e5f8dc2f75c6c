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

use azkit_core::Result;
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Request, StatusCode};

use std::collections::HashMap;

use super::{with_metadata, BlobClient, BlobLister};
use crate::error::parse_error;
use crate::path::percent_encode_path;
use crate::response::{into_operation, OperationResponse};
use crate::ServiceClient;

/// Client for one container.
#[derive(Debug, Clone)]
pub struct ContainerClient {
    client: ServiceClient,
    name: String,
    url: String,
}

impl ContainerClient {
    pub(crate) fn new(client: ServiceClient, name: &str) -> Self {
        let url = format!("{}/{}", client.url(), percent_encode_path(name));
        Self {
            client,
            name: name.to_string(),
            url,
        }
    }

    /// Container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Container url.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn service(&self) -> &ServiceClient {
        &self.client
    }

    /// Client for the blob `name` in this container. No request is sent.
    pub fn blob_client(&self, name: &str) -> BlobClient {
        BlobClient::new(self.clone(), name)
    }

    /// Create the container.
    ///
    /// Fails with `AlreadyExists` if a container with this name exists.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/create-container>
    pub async fn create(&self) -> Result<OperationResponse> {
        self.create_with_metadata(&HashMap::new()).await
    }

    /// Create the container with user `metadata`.
    pub async fn create_with_metadata(
        &self,
        metadata: &HashMap<String, String>,
    ) -> Result<OperationResponse> {
        let req = Request::put(format!("{}?restype=container", self.url))
            .header(CONTENT_LENGTH, 0);
        let req = with_metadata(req, metadata).body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// Delete the container and every blob in it.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/delete-container>
    pub async fn delete(&self) -> Result<OperationResponse> {
        let req = Request::delete(format!("{}?restype=container", self.url)).body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// Check whether the container exists.
    pub async fn exists(&self) -> Result<bool> {
        let req = Request::head(format!("{}?restype=container", self.url)).body(Bytes::new())?;

        let resp = self.client.send(req).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(parse_error(resp)),
        }
    }

    /// List the blobs of this container, flat.
    ///
    /// Nothing is sent until the lister is polled. Listing again means
    /// calling this method again.
    pub fn list_blobs(&self) -> BlobLister {
        BlobLister::new(self.clone())
    }
}
