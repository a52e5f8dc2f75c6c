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

use azkit_core::utils::{Redact, RedactSas};
use azkit_core::Context;
use std::fmt::{Debug, Formatter};

use crate::constants::*;

/// Config carries all the configuration for Azure Storage services.
#[derive(Clone, Default)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`]
    /// - env value: [`AZBLOB_ACCOUNT_NAME`]
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`]
    /// - env value: [`AZBLOB_ACCOUNT_KEY`]
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_SAS_TOKEN`]
    pub sas_token: Option<String>,
    /// `tenant_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_TENANT_ID`]
    pub tenant_id: Option<String>,
    /// `client_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_CLIENT_ID`]
    pub client_id: Option<String>,
    /// `authority_host` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_AUTHORITY_HOST`]
    /// - [`AZURE_PUBLIC_CLOUD`] otherwise
    pub authority_host: Option<String>,
    /// Name of the interactive token cache, see [`crate::TokenCache`].
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZKIT_TOKEN_CACHE_NAME`]
    pub token_cache_name: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &RedactSas::from(&self.sas_token))
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .field("token_cache_name", &self.token_cache_name)
            .finish()
    }
}

impl Config {
    /// Load config from the env of given context.
    ///
    /// Values already set on the config take precedence.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.account_name.is_none() {
            self.account_name = envs
                .get(AZURE_STORAGE_ACCOUNT_NAME)
                .or_else(|| envs.get(AZBLOB_ACCOUNT_NAME))
                .cloned();
        }

        if self.account_key.is_none() {
            self.account_key = envs
                .get(AZURE_STORAGE_ACCOUNT_KEY)
                .or_else(|| envs.get(AZBLOB_ACCOUNT_KEY))
                .cloned();
        }

        if self.sas_token.is_none() {
            self.sas_token = envs.get(AZURE_STORAGE_SAS_TOKEN).cloned();
        }

        if self.tenant_id.is_none() {
            self.tenant_id = envs.get(AZURE_TENANT_ID).cloned();
        }

        if self.client_id.is_none() {
            self.client_id = envs.get(AZURE_CLIENT_ID).cloned();
        }

        if self.authority_host.is_none() {
            self.authority_host = Some(
                envs.get(AZURE_AUTHORITY_HOST)
                    .cloned()
                    .unwrap_or_else(|| AZURE_PUBLIC_CLOUD.to_string()),
            );
        }

        if self.token_cache_name.is_none() {
            self.token_cache_name = envs.get(AZKIT_TOKEN_CACHE_NAME).cloned();
        }

        self
    }
}
