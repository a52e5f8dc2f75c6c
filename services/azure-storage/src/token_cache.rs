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

use azkit_core::time::{now, parse_timestamp, DateTime};
use azkit_core::utils::Redact;
use azkit_core::{Context, Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

use crate::constants::DEFAULT_TOKEN_CACHE_NAME;
use crate::Credential;

/// Token persisted between interactive logins.
#[derive(Clone, Serialize, Deserialize)]
pub struct CachedToken {
    /// Access token sent as bearer.
    pub access_token: String,
    /// Refresh token used to renew the access token without prompting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry of the access token as unix seconds.
    pub expires_on: i64,
}

impl Debug for CachedToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &Redact::from(&self.access_token))
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

impl CachedToken {
    /// Build a cached token expiring `expires_in` seconds from now.
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_on: now().timestamp() + expires_in,
        }
    }

    /// Expiry of the access token.
    pub fn expires_at(&self) -> Result<DateTime> {
        parse_timestamp(self.expires_on)
    }

    /// Convert into a bearer credential.
    pub fn to_credential(&self) -> Result<Credential> {
        Ok(Credential::with_bearer_token(
            &self.access_token,
            Some(self.expires_at()?),
        ))
    }
}

/// TokenCache stores the interactive login result under the user's home.
///
/// The cache lives at `~/.azkit/{name}.json` unless an explicit path is
/// given. Using different names keeps logins for different tenants or
/// clouds apart.
#[derive(Debug, Clone)]
pub struct TokenCache {
    name: String,
    path: Option<String>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_CACHE_NAME)
    }
}

impl TokenCache {
    /// Create a cache with given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Use an explicit file path instead of the home based one.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Name of this cache.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the file backing this cache.
    pub fn path(&self, ctx: &Context) -> Option<String> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        ctx.expand_home_dir(&format!("~/.azkit/{}.json", self.name))
    }

    /// Load the cached token.
    ///
    /// A missing, unreadable or corrupted cache is not an error, it only
    /// means the user has to log in again. A token whose expiry can't be
    /// represented counts as corrupted.
    pub async fn load(&self, ctx: &Context) -> Option<CachedToken> {
        let path = self.path(ctx)?;
        let content = match ctx.file_read(&path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("token cache {path} is not readable: {err}");
                return None;
            }
        };

        let token: CachedToken = match serde_json::from_slice(&content) {
            Ok(token) => token,
            Err(err) => {
                warn!("token cache {path} is corrupted, ignoring it: {err}");
                return None;
            }
        };
        if let Err(err) = token.expires_at() {
            warn!("token cache {path} has an invalid expiry, ignoring it: {err}");
            return None;
        }
        Some(token)
    }

    /// Persist the token, replacing the previous one.
    pub async fn save(&self, ctx: &Context, token: &CachedToken) -> Result<()> {
        let path = self.path(ctx).ok_or_else(|| {
            Error::config_invalid("home directory is unknown, token cache can't be saved")
        })?;
        let content = serde_json::to_vec_pretty(token)
            .map_err(|e| Error::unexpected("failed to serialize token cache").with_source(e))?;

        ctx.file_write(&path, content).await?;
        debug!("token cache saved to {path}");
        Ok(())
    }
}
