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

use azkit_core::{Error, Result};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::Request;
use log::debug;

use super::{PathLister, X_MS_RENAME_SOURCE};
use crate::error::parse_error;
use crate::path::percent_encode_path;
use crate::response::{into_operation, OperationResponse};
use crate::ServiceClient;

/// Client for one Data Lake file system.
///
/// Paths are relative to the file system root, separated by `/`. Leading
/// and trailing slashes are ignored.
#[derive(Debug, Clone)]
pub struct FileSystemClient {
    client: ServiceClient,
    name: String,
    url: String,
}

impl FileSystemClient {
    pub(crate) fn new(client: ServiceClient, name: &str) -> Self {
        let url = format!("{}/{}", client.url(), percent_encode_path(name));
        Self {
            client,
            name: name.to_string(),
            url,
        }
    }

    /// File system name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File system url.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn service(&self) -> &ServiceClient {
        &self.client
    }

    fn path_url(&self, path: &str) -> Result<String> {
        let path = normalize(path);
        if path.is_empty() {
            return Err(Error::request_invalid("path cannot be empty"));
        }
        Ok(format!("{}/{}", self.url, percent_encode_path(path)))
    }

    /// Create the file system.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/datalakestoragegen2/filesystem/create>
    pub async fn create(&self) -> Result<OperationResponse> {
        let req = Request::put(format!("{}?resource=filesystem", self.url))
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// Delete the file system and everything in it.
    pub async fn delete(&self) -> Result<OperationResponse> {
        let req = Request::delete(format!("{}?resource=filesystem", self.url)).body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// Create the directory `path`, parents included.
    ///
    /// ref: <https://learn.microsoft.com/en-us/rest/api/storageservices/datalakestoragegen2/path/create>
    pub async fn create_directory(&self, path: &str) -> Result<OperationResponse> {
        let req = Request::put(format!("{}?resource=directory", self.path_url(path)?))
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// Move the directory `from` to `to` inside this file system.
    ///
    /// Renaming to another parent moves the directory with its content.
    pub async fn rename_directory(&self, from: &str, to: &str) -> Result<OperationResponse> {
        let source = normalize(from);
        if source.is_empty() {
            return Err(Error::request_invalid("rename source cannot be empty"));
        }

        let req = Request::put(self.path_url(to)?)
            .header(
                X_MS_RENAME_SOURCE,
                format!(
                    "/{}/{}",
                    percent_encode_path(&self.name),
                    percent_encode_path(source)
                ),
            )
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// Delete the directory `path` and everything below it.
    pub async fn delete_directory(&self, path: &str) -> Result<OperationResponse> {
        let url = format!("{}?recursive=true", self.path_url(path)?);
        let req = Request::delete(url).body(Bytes::new())?;

        into_operation(self.client.send(req).await?)
    }

    /// List the direct children of `directory`, or of the root when empty.
    pub fn list_paths(&self, directory: &str) -> PathLister {
        PathLister::new(self.clone(), normalize(directory))
    }

    /// Create the file `path` and write `content` into it.
    ///
    /// A file upload is three calls: create, append the data at offset 0,
    /// then flush at the final length to commit it.
    pub async fn upload_file(
        &self,
        path: &str,
        content: impl Into<Bytes>,
    ) -> Result<OperationResponse> {
        let content = content.into();
        let url = self.path_url(path)?;
        let size = content.len();
        debug!("uploading {size} bytes to {}/{}", self.name, normalize(path));

        let req = Request::put(format!("{url}?resource=file"))
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())?;
        into_operation(self.client.send(req).await?)?;

        // Appending nothing is rejected by the service.
        if size > 0 {
            let req = Request::patch(format!("{url}?action=append&position=0"))
                .header(CONTENT_LENGTH, size)
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(content)?;
            into_operation(self.client.send(req).await?)?;
        }

        let req = Request::patch(format!("{url}?action=flush&position={size}"))
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())?;
        into_operation(self.client.send(req).await?)
    }

    /// Read the whole file `path`.
    pub async fn read_file(&self, path: &str) -> Result<Bytes> {
        let req = Request::get(self.path_url(path)?).body(Bytes::new())?;

        let resp = self.client.send(req).await?;
        if !resp.status().is_success() {
            return Err(parse_error(resp));
        }
        Ok(resp.into_body())
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}
