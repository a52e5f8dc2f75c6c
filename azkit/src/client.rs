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

use azkit_azure_storage::{
    Config, Credential, DefaultCredentialProvider, InteractiveCredentialProvider, RequestSigner,
    StaticCredentialProvider,
};
use azkit_core::{Context, Error, Result, Signer};
use bytes::Bytes;
use log::debug;
use std::fmt::{Debug, Formatter};

use crate::blob::{ContainerClient, ContainerLister};
use crate::datalake::FileSystemClient;
use crate::quickstart::QuickstartConfig;
use crate::{default_context, Endpoint};

/// Handle on the root of one storage account.
///
/// Cloning is cheap and clones share the signer, so a credential is loaded
/// at most once for all of them.
#[derive(Clone)]
pub struct ServiceClient {
    ctx: Context,
    endpoint_url: String,
    host: String,
    signer: Signer<Credential>,
}

impl Debug for ServiceClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("endpoint_url", &self.endpoint_url)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl ServiceClient {
    /// Create a client for `endpoint_url`, signing requests with `signer`.
    pub fn new(
        ctx: Context,
        endpoint_url: impl Into<String>,
        signer: Signer<Credential>,
    ) -> Result<Self> {
        let endpoint_url = endpoint_url.into();
        let uri: http::Uri = endpoint_url.parse()?;
        let host = uri
            .host()
            .ok_or_else(|| {
                Error::config_invalid(format!("endpoint {endpoint_url} has no host"))
            })?
            .to_string();

        Ok(Self {
            ctx,
            endpoint_url,
            host,
            signer,
        })
    }

    /// Service root url, without trailing slash.
    pub fn url(&self) -> &str {
        &self.endpoint_url
    }

    /// Host of the service root, for example `myaccount.dfs.core.windows.net`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Context used to send requests.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signer applied to every request.
    pub fn signer(&self) -> &Signer<Credential> {
        &self.signer
    }

    /// Client for the container `name`. No request is sent.
    pub fn container_client(&self, name: &str) -> ContainerClient {
        ContainerClient::new(self.clone(), name)
    }

    /// List the containers of this account.
    ///
    /// Nothing is sent until the lister is polled.
    pub fn list_containers(&self) -> ContainerLister {
        ContainerLister::new(self.clone())
    }

    /// Client for the data lake file system `name`. No request is sent.
    pub fn file_system_client(&self, name: &str) -> FileSystemClient {
        FileSystemClient::new(self.clone(), name)
    }

    pub(crate) async fn send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        // Logged before signing so that SAS tokens never reach the logs.
        debug!("sending {} {}", req.method(), req.uri());

        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts).await?;
        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;

        debug!("got response {}", resp.status());
        Ok(resp)
    }
}

/// Interactive login shared by every client built from it.
///
/// Build it once at startup and pass it to [`client_with_interactive_auth`]
/// as often as needed: the user is prompted at most once, and later logins
/// are served from the token cache.
#[derive(Clone, Debug)]
pub struct InteractiveCredential {
    signer: Signer<Credential>,
}

impl Default for InteractiveCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveCredential {
    /// Interactive credential configured from the process environment.
    pub fn new() -> Self {
        let ctx = default_context();
        let config = Config::default().from_env(&ctx);
        Self::with_provider(ctx, InteractiveCredentialProvider::from_config(&config))
    }

    /// Interactive credential using an explicit context and provider.
    pub fn with_provider(ctx: Context, provider: InteractiveCredentialProvider) -> Self {
        Self {
            signer: Signer::new(ctx, provider, RequestSigner::new()),
        }
    }

    /// Log in now instead of on the first request.
    pub async fn login(&self) -> Result<Credential> {
        self.signer
            .credential()
            .await?
            .ok_or_else(|| Error::credential_invalid("interactive login yielded no credential"))
    }
}

/// Options shared by the factory functions.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Service root, [`Endpoint::DataLake`] by default.
    pub endpoint: Endpoint,
    /// Context to send requests with, [`default_context`] when `None`.
    pub context: Option<Context>,
}

impl ClientOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another endpoint.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Use another context.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.context = Some(ctx);
        self
    }

    fn context(&self) -> Context {
        self.context.clone().unwrap_or_else(default_context)
    }

    /// See [`client_with_key`].
    pub fn client_with_key(&self, account_name: &str, account_key: &str) -> Result<ServiceClient> {
        let url = self.endpoint.url(account_name)?;
        if account_key.is_empty() {
            return Err(Error::config_invalid("account key cannot be empty"));
        }

        let ctx = self.context();
        let provider = StaticCredentialProvider::new_shared_key(account_name, account_key);
        let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
        ServiceClient::new(ctx, url, signer)
    }

    /// See [`client_with_interactive_auth`].
    ///
    /// Requests go through the context the credential was built with.
    pub fn client_with_interactive_auth(
        &self,
        account_name: &str,
        credential: &InteractiveCredential,
    ) -> Result<ServiceClient> {
        let url = self.endpoint.url(account_name)?;
        let signer = credential.signer.clone();
        ServiceClient::new(signer.context().clone(), url, signer)
    }

    /// See [`client_with_sas`].
    pub fn client_with_sas(&self, account_name: &str, sas_token: &str) -> Result<ServiceClient> {
        let url = self.endpoint.url(account_name)?;
        if sas_token.trim_start_matches('?').is_empty() {
            return Err(Error::config_invalid("sas token cannot be empty"));
        }

        let ctx = self.context();
        let provider = StaticCredentialProvider::new_sas_token(sas_token);
        let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
        ServiceClient::new(ctx, url, signer)
    }
}

/// Client authorized with the account's shared key.
///
/// An empty or malformed account name fails here. A key that isn't valid
/// base64 fails when the first request is signed.
pub fn client_with_key(account_name: &str, account_key: &str) -> Result<ServiceClient> {
    ClientOptions::default().client_with_key(account_name, account_key)
}

/// Client authorized by an interactive login.
///
/// The first request may prompt the user, see [`InteractiveCredential`].
pub fn client_with_interactive_auth(
    account_name: &str,
    credential: &InteractiveCredential,
) -> Result<ServiceClient> {
    ClientOptions::default().client_with_interactive_auth(account_name, credential)
}

/// Client authorized with a SAS token, with or without the leading `?`.
pub fn client_with_sas(account_name: &str, sas_token: &str) -> Result<ServiceClient> {
    ClientOptions::default().client_with_sas(account_name, sas_token)
}

/// Blob endpoint client for the account named in the environment, using
/// [`DefaultCredentialProvider`].
///
/// Fails with [`azkit_core::ErrorKind::ConfigInvalid`] when
/// `AZURE_STORAGE_ACCOUNT_NAME` is not set.
pub fn client_from_env(ctx: &Context) -> Result<ServiceClient> {
    let config = QuickstartConfig::from_env(ctx)?;
    let url = config.endpoint.url(&config.account_name)?;

    let provider = DefaultCredentialProvider::from_config(&config.storage);
    let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
    ServiceClient::new(ctx.clone(), url, signer)
}
