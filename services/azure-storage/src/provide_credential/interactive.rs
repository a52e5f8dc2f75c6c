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

use async_trait::async_trait;
use azkit_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use bytes::Bytes;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::constants::*;
use crate::credential::Credential;
use crate::token_cache::{CachedToken, TokenCache};
use crate::Config;

const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
/// Extra delay requested by the identity platform on `slow_down`.
const SLOW_DOWN_STEP_SECS: u64 = 5;

/// Instructions the user has to follow to finish an interactive login.
#[derive(Debug, Clone)]
pub struct DeviceCodePrompt {
    /// Code to enter on the verification page.
    pub user_code: String,
    /// Page where the code must be entered.
    pub verification_uri: String,
    /// Ready to display message from the identity platform.
    pub message: String,
    /// Seconds until the code expires.
    pub expires_in: u64,
}

type PromptFn = Arc<dyn Fn(&DeviceCodePrompt) + Send + Sync>;

/// InteractiveCredentialProvider signs the user in through the OAuth 2.0
/// device authorization grant and keeps the result in a [`TokenCache`].
///
/// Loading a credential goes through these steps:
///
/// 1. a still valid access token from the cache is returned as is;
/// 2. an expired one is renewed with its refresh token;
/// 3. otherwise the user is prompted with a device code and the provider
///    polls the token endpoint until the login completes.
///
/// Step 3 is skipped for providers built with [`Self::cache_only`], which
/// makes them safe to use in unattended credential chains.
///
/// Reference: <https://learn.microsoft.com/en-us/entra/identity-platform/v2-oauth2-device-code>
#[derive(Clone)]
pub struct InteractiveCredentialProvider {
    tenant_id: Option<String>,
    client_id: Option<String>,
    authority_host: Option<String>,
    cache: TokenCache,
    prompt: Option<PromptFn>,
    allow_login: bool,
    // Serializes logins so that concurrent callers share one prompt.
    login: Arc<Mutex<()>>,
}

impl Debug for InteractiveCredentialProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractiveCredentialProvider")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .field("cache", &self.cache)
            .field("allow_login", &self.allow_login)
            .finish_non_exhaustive()
    }
}

impl Default for InteractiveCredentialProvider {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            authority_host: None,
            cache: TokenCache::default(),
            prompt: None,
            allow_login: true,
            login: Arc::new(Mutex::new(())),
        }
    }
}

impl InteractiveCredentialProvider {
    /// Create a new interactive provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider from loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut provider = Self::new();
        provider.tenant_id = config.tenant_id.clone();
        provider.client_id = config.client_id.clone();
        provider.authority_host = config.authority_host.clone();
        if let Some(name) = &config.token_cache_name {
            provider.cache = TokenCache::new(name);
        }
        provider
    }

    /// Set the tenant to sign in to.
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the public client application id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the identity platform host, for example a sovereign cloud.
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = Some(authority_host.into());
        self
    }

    /// Use the given token cache.
    pub fn with_token_cache(mut self, cache: TokenCache) -> Self {
        self.cache = cache;
        self
    }

    /// Show device code instructions through `prompt` instead of stderr.
    pub fn with_prompt(
        mut self,
        prompt: impl Fn(&DeviceCodePrompt) + Send + Sync + 'static,
    ) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    /// Never prompt, only use or renew cached tokens.
    pub fn cache_only(mut self) -> Self {
        self.allow_login = false;
        self
    }

    fn token_url(&self, ctx: &Context, endpoint: &str) -> String {
        let authority = self
            .authority_host
            .clone()
            .or_else(|| ctx.env_var(AZURE_AUTHORITY_HOST))
            .unwrap_or_else(|| AZURE_PUBLIC_CLOUD.to_string());
        let tenant = self
            .tenant_id
            .clone()
            .or_else(|| ctx.env_var(AZURE_TENANT_ID))
            .unwrap_or_else(|| DEFAULT_INTERACTIVE_TENANT.to_string());

        format!(
            "{}/{}/oauth2/v2.0/{}",
            authority.trim_end_matches('/'),
            tenant,
            endpoint
        )
    }

    fn client_id(&self, ctx: &Context) -> String {
        self.client_id
            .clone()
            .or_else(|| ctx.env_var(AZURE_CLIENT_ID))
            .unwrap_or_else(|| DEFAULT_INTERACTIVE_CLIENT_ID.to_string())
    }

    async fn refresh(&self, ctx: &Context, refresh_token: &str) -> Result<CachedToken> {
        let client_id = self.client_id(ctx);
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &client_id)
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token)
            .append_pair("scope", &scope())
            .finish();

        let resp = post_form(ctx, &self.token_url(ctx, "token"), body).await?;
        if !resp.status().is_success() {
            return Err(oauth_error(&resp, "failed to refresh access token"));
        }

        let token: TokenResponse = parse_json(resp.body(), "token")?;
        Ok(token.into_cached(Some(refresh_token)))
    }

    async fn login(&self, ctx: &Context) -> Result<CachedToken> {
        let client_id = self.client_id(ctx);
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &client_id)
            .append_pair("scope", &scope())
            .finish();

        let resp = post_form(ctx, &self.token_url(ctx, "devicecode"), body).await?;
        if !resp.status().is_success() {
            return Err(oauth_error(&resp, "failed to start device code login"));
        }
        let device: DeviceCodeResponse = parse_json(resp.body(), "device code")?;

        let prompt = DeviceCodePrompt {
            message: device.message.clone().unwrap_or_else(|| {
                format!(
                    "To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
                    device.verification_uri, device.user_code
                )
            }),
            user_code: device.user_code.clone(),
            verification_uri: device.verification_uri.clone(),
            expires_in: device.expires_in,
        };
        match &self.prompt {
            Some(f) => f(&prompt),
            None => eprintln!("{}", prompt.message),
        }
        info!("waiting for device code login at {}", prompt.verification_uri);

        let token_url = self.token_url(ctx, "token");
        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval = device.interval;
        loop {
            tokio::time::sleep(Duration::from_secs(interval)).await;
            if Instant::now() > deadline {
                return Err(Error::credential_expired(
                    "device code expired before the login was completed",
                ));
            }

            let body = form_urlencoded::Serializer::new(String::new())
                .append_pair("client_id", &client_id)
                .append_pair("grant_type", DEVICE_CODE_GRANT_TYPE)
                .append_pair("device_code", &device.device_code)
                .finish();
            let resp = post_form(ctx, &token_url, body).await?;
            if resp.status().is_success() {
                let token: TokenResponse = parse_json(resp.body(), "token")?;
                info!("device code login completed");
                return Ok(token.into_cached(None));
            }

            let err: OAuthErrorResponse = parse_json(resp.body(), "token error")?;
            match err.error.as_str() {
                "authorization_pending" => debug!("device code login is still pending"),
                "slow_down" => interval += SLOW_DOWN_STEP_SECS,
                "expired_token" => {
                    return Err(Error::credential_expired(err.describe())
                        .with_status(resp.status())
                        .with_code(err.error))
                }
                _ => {
                    return Err(Error::credential_denied(err.describe())
                        .with_status(resp.status())
                        .with_code(err.error))
                }
            }
        }
    }

    async fn persist(&self, ctx: &Context, token: &CachedToken) {
        if let Err(err) = self.cache.save(ctx, token).await {
            warn!("failed to save token cache {}: {err}", self.cache.name());
        }
    }
}

#[async_trait]
impl ProvideCredential for InteractiveCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let _guard = self.login.lock().await;

        if let Some(cached) = self.cache.load(ctx).await {
            match cached.to_credential() {
                Ok(cred) if cred.is_valid() => {
                    debug!("using cached token from {}", self.cache.name());
                    return Ok(Some(cred));
                }
                Ok(_) => debug!("cached token from {} has expired", self.cache.name()),
                Err(err) => warn!("ignoring cached token from {}: {err}", self.cache.name()),
            }

            if let Some(refresh_token) = &cached.refresh_token {
                match self.refresh(ctx, refresh_token).await {
                    Ok(token) => {
                        self.persist(ctx, &token).await;
                        return Ok(Some(token.to_credential()?));
                    }
                    Err(err) => warn!("failed to refresh cached token: {err}"),
                }
            }
        }

        if !self.allow_login {
            return Ok(None);
        }

        let token = self.login(ctx).await?;
        self.persist(ctx, &token).await;
        Ok(Some(token.to_credential()?))
    }
}

fn scope() -> String {
    format!("{AZURE_STORAGE_SCOPE} offline_access")
}

async fn post_form(ctx: &Context, url: &str, body: String) -> Result<http::Response<Bytes>> {
    let req = http::Request::post(url)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Bytes::from(body))?;
    ctx.http_send(req).await
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::unexpected(format!("failed to parse {what} response")).with_source(e))
}

fn oauth_error(resp: &http::Response<Bytes>, context: &str) -> Error {
    let status = resp.status();
    match serde_json::from_slice::<OAuthErrorResponse>(resp.body()) {
        Ok(err) => Error::credential_denied(format!("{context}: {}", err.describe()))
            .with_status(status)
            .with_code(err.error),
        Err(_) => Error::credential_denied(format!(
            "{context}: {status} {}",
            String::from_utf8_lossy(resp.body())
        ))
        .with_status(status),
    }
}

#[derive(Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_interval")]
    interval: u64,
    message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

impl TokenResponse {
    /// Identity platform may omit the refresh token on renewal, keep the old one then.
    fn into_cached(self, previous_refresh_token: Option<&str>) -> CachedToken {
        let refresh_token = self
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string));
        CachedToken::new(self.access_token, refresh_token, self.expires_in)
    }
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl OAuthErrorResponse {
    fn describe(&self) -> String {
        match &self.error_description {
            Some(desc) => format!("{}: {}", self.error, desc),
            None => self.error.clone(),
        }
    }
}
