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
use azkit_core::time::{parse_timestamp, DateTime};
use azkit_core::{Context, Error, ProvideCredential, Result};
use log::debug;
use serde::Deserialize;

use crate::constants::AZURE_STORAGE_RESOURCE;
use crate::credential::Credential;

#[cfg(windows)]
const AZ_PROGRAM: &str = "az.cmd";
#[cfg(not(windows))]
const AZ_PROGRAM: &str = "az";

/// AzureCliCredentialProvider borrows the login of the Azure CLI.
///
/// It runs `az account get-access-token` through the context's
/// [`azkit_core::CommandExecute`]. A missing CLI or a logged out user yields
/// `Ok(None)` so that a chain can move on.
#[derive(Debug, Default, Clone)]
pub struct AzureCliCredentialProvider {
    tenant_id: Option<String>,
}

impl AzureCliCredentialProvider {
    /// Create a new Azure CLI provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the token for a specific tenant.
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    async fn get_access_token(&self, ctx: &Context) -> Result<AzureCliToken> {
        let mut args = vec![
            "account",
            "get-access-token",
            "--resource",
            AZURE_STORAGE_RESOURCE,
            "--output",
            "json",
        ];
        if let Some(tenant_id) = &self.tenant_id {
            args.extend(["--tenant", tenant_id.as_str()]);
        }

        let output = ctx.command_execute(AZ_PROGRAM, &args).await?;
        if !output.success() {
            return Err(Error::credential_invalid(format!(
                "azure cli exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            Error::unexpected("failed to parse azure cli output").with_source(e)
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzureCliToken {
    access_token: String,
    expires_on: Option<String>,
    #[serde(rename = "expires_on")]
    expires_on_timestamp: Option<i64>,
}

impl AzureCliToken {
    /// Newer CLIs report a unix timestamp, older ones only a local time string.
    fn expires_at(&self) -> Option<DateTime> {
        if let Some(ts) = self.expires_on_timestamp {
            return parse_timestamp(ts).ok();
        }

        let expires_on = self.expires_on.as_deref()?;
        chrono::NaiveDateTime::parse_from_str(expires_on, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|dt| dt.and_local_timezone(chrono::Local).single())
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

#[async_trait]
impl ProvideCredential for AzureCliCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        match self.get_access_token(ctx).await {
            Ok(token) => Ok(Some(Credential::with_bearer_token(
                &token.access_token,
                token.expires_at(),
            ))),
            Err(err) => {
                debug!("azure cli credential is not available: {err}");
                Ok(None)
            }
        }
    }
}
