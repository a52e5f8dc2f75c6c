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

//! The blob storage quickstart: create a container, upload one blob, list
//! the container, download the blob back and delete the container.
//!
//! [`run`] drives the steps against any [`QuickstartStore`] and writes its
//! progress to a [`Write`], so that the flow can be checked without an
//! account. [`ServiceClient`] is the store used against Azure.

use async_trait::async_trait;
use azkit_azure_storage::Config;
use azkit_core::{Context, Error, ErrorKind, Result};
use bytes::Bytes;
use log::{debug, info};
use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::blob::{BlobItem, DownloadResponse};
use crate::{Endpoint, OperationResponse, ServiceClient};

/// Content uploaded by the quickstart.
pub const QUICKSTART_CONTENT: &str = "Hello, World!";

/// Env value overriding the blob endpoint, for example an Azurite url.
pub const AZKIT_STORAGE_ENDPOINT: &str = "AZKIT_STORAGE_ENDPOINT";

/// Settings of the quickstart, read from the environment.
#[derive(Debug, Clone)]
pub struct QuickstartConfig {
    /// Storage account to work in.
    pub account_name: String,
    /// Blob endpoint, or [`AZKIT_STORAGE_ENDPOINT`] when set.
    pub endpoint: Endpoint,
    /// Credential settings handed to the default credential chain.
    pub storage: Config,
}

impl QuickstartConfig {
    /// Load the config from the env of `ctx`.
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`] when no account name is set.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let storage = Config::default().from_env(ctx);
        let account_name = storage
            .account_name
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config_invalid(
                    "AZURE_STORAGE_ACCOUNT_NAME is not set, export the storage account name first",
                )
            })?;

        let endpoint = match ctx.env_var(AZKIT_STORAGE_ENDPOINT) {
            Some(url) if !url.is_empty() => Endpoint::Custom(url),
            _ => Endpoint::Blob,
        };

        Ok(Self {
            account_name,
            endpoint,
            storage,
        })
    }
}

/// Operations the quickstart needs from a blob store.
#[async_trait]
pub trait QuickstartStore: Send + Sync {
    /// Create the container `container`.
    async fn create_container(&self, container: &str) -> Result<OperationResponse>;

    /// Upload `content` to `blob` in `container`.
    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        content: Bytes,
    ) -> Result<OperationResponse>;

    /// List every blob of `container`.
    async fn list_blobs(&self, container: &str) -> Result<Vec<BlobItem>>;

    /// Download `blob` from `container`.
    async fn download_blob(&self, container: &str, blob: &str) -> Result<DownloadResponse>;

    /// Delete `container` with its blobs.
    async fn delete_container(&self, container: &str) -> Result<OperationResponse>;

    /// Url of `container`.
    fn container_url(&self, container: &str) -> String;

    /// Url of `blob` in `container`.
    fn blob_url(&self, container: &str, blob: &str) -> String;
}

#[async_trait]
impl QuickstartStore for ServiceClient {
    async fn create_container(&self, container: &str) -> Result<OperationResponse> {
        self.container_client(container).create().await
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        content: Bytes,
    ) -> Result<OperationResponse> {
        self.container_client(container)
            .blob_client(blob)
            .upload(content)
            .await
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<BlobItem>> {
        self.container_client(container).list_blobs().collect().await
    }

    async fn download_blob(&self, container: &str, blob: &str) -> Result<DownloadResponse> {
        self.container_client(container)
            .blob_client(blob)
            .download()
            .await
    }

    async fn delete_container(&self, container: &str) -> Result<OperationResponse> {
        self.container_client(container).delete().await
    }

    fn container_url(&self, container: &str) -> String {
        self.container_client(container).url().to_string()
    }

    fn blob_url(&self, container: &str, blob: &str) -> String {
        self.container_client(container)
            .blob_client(blob)
            .url()
            .to_string()
    }
}

/// A step of the quickstart, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Create the container.
    CreateContainer,
    /// Upload the blob.
    UploadBlob,
    /// List the container.
    ListBlobs,
    /// Download the blob.
    DownloadBlob,
    /// Delete the container.
    DeleteContainer,
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Step::CreateContainer => "create container",
            Step::UploadBlob => "upload blob",
            Step::ListBlobs => "list blobs",
            Step::DownloadBlob => "download blob",
            Step::DeleteContainer => "delete container",
        };
        f.write_str(s)
    }
}

/// Failure of one quickstart step. No later step was run.
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {source}")]
pub struct QuickstartError {
    /// The step that failed.
    pub step: Step,
    /// What went wrong.
    #[source]
    pub source: Error,
}

impl QuickstartError {
    fn new(step: Step, source: impl Into<Error>) -> Self {
        Self {
            step,
            source: source.into(),
        }
    }

    /// Kind of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// What a successful quickstart did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickstartSummary {
    /// Name of the container, already deleted.
    pub container: String,
    /// Name of the uploaded blob.
    pub blob: String,
    /// Blob names returned by the listing.
    pub listed: Vec<String>,
    /// Downloaded content.
    pub downloaded: String,
}

/// Run the quickstart with freshly generated container and blob names.
pub async fn run<S, W>(
    store: &S,
    out: &mut W,
) -> std::result::Result<QuickstartSummary, QuickstartError>
where
    S: QuickstartStore + ?Sized,
    W: Write,
{
    let container = format!("quickstart{}", uuid::Uuid::new_v4());
    let blob = format!("quickstart{}.txt", uuid::Uuid::new_v4());
    run_with_names(store, out, &container, &blob).await
}

/// Run the quickstart on the given container and blob names.
///
/// Steps run one after the other and the first failure stops the run. The
/// container is left in place when a step after its creation fails.
pub async fn run_with_names<S, W>(
    store: &S,
    out: &mut W,
    container: &str,
    blob: &str,
) -> std::result::Result<QuickstartSummary, QuickstartError>
where
    S: QuickstartStore + ?Sized,
    W: Write,
{
    let step = Step::CreateContainer;
    let fail = |e: Error| QuickstartError::new(step, e);
    let io = |e: std::io::Error| QuickstartError::new(step, e);
    writeln!(out, "Azure Blob storage quickstart sample").map_err(io)?;
    writeln!(out, "\nCreating container...\n\t {container}").map_err(io)?;
    let resp = store.create_container(container).await.map_err(fail)?;
    writeln!(
        out,
        "Container was created successfully.\n\trequestId:{}\n\tURL: {}",
        resp.request_id_or_dash(),
        store.container_url(container)
    )
    .map_err(io)?;
    info!("created container {container}");

    let step = Step::UploadBlob;
    let fail = |e: Error| QuickstartError::new(step, e);
    let io = |e: std::io::Error| QuickstartError::new(step, e);
    writeln!(
        out,
        "\nUploading to Azure storage as blob\n\tname: {blob}:\n\tURL: {}",
        store.blob_url(container, blob)
    )
    .map_err(io)?;
    let resp = store
        .upload_blob(container, blob, Bytes::from_static(QUICKSTART_CONTENT.as_bytes()))
        .await
        .map_err(fail)?;
    writeln!(
        out,
        "Blob was uploaded successfully. requestId: {}",
        resp.request_id_or_dash()
    )
    .map_err(io)?;

    let step = Step::ListBlobs;
    let fail = |e: Error| QuickstartError::new(step, e);
    let io = |e: std::io::Error| QuickstartError::new(step, e);
    writeln!(out, "\nListing blobs...").map_err(io)?;
    let items = store.list_blobs(container).await.map_err(fail)?;
    for item in &items {
        writeln!(out, "\n\tname: {}\n\tURL: {}\n", item.name, item.url).map_err(io)?;
    }
    debug!("container {container} holds {} blobs", items.len());

    let step = Step::DownloadBlob;
    let fail = |e: Error| QuickstartError::new(step, e);
    let io = |e: std::io::Error| QuickstartError::new(step, e);
    let downloaded = store
        .download_blob(container, blob)
        .await
        .and_then(|resp| resp.content_as_text())
        .map_err(fail)?;
    writeln!(out, "\nDownloaded blob content...\n\t {downloaded}").map_err(io)?;

    let step = Step::DeleteContainer;
    let fail = |e: Error| QuickstartError::new(step, e);
    let io = |e: std::io::Error| QuickstartError::new(step, e);
    writeln!(out, "\nDeleting container...").map_err(io)?;
    let resp = store.delete_container(container).await.map_err(fail)?;
    writeln!(
        out,
        "Container was deleted successfully. requestId: {}",
        resp.request_id_or_dash()
    )
    .map_err(io)?;
    info!("deleted container {container}");

    Ok(QuickstartSummary {
        container: container.to_string(),
        blob: blob.to_string(),
        listed: items.into_iter().map(|v| v.name).collect(),
        downloaded,
    })
}
