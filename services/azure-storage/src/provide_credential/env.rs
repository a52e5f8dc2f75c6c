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
use azkit_core::{Context, ProvideCredential, Result};
use log::debug;

use crate::constants::*;
use crate::credential::Credential;

/// EnvCredentialProvider loads credentials from environment variables.
///
/// Checked in order:
///
/// - account key: [`AZURE_STORAGE_ACCOUNT_KEY`] or [`AZBLOB_ACCOUNT_KEY`],
///   together with an account name from [`AZURE_STORAGE_ACCOUNT_NAME`] or
///   [`AZBLOB_ACCOUNT_NAME`]
/// - SAS token: [`AZURE_STORAGE_SAS_TOKEN`]
/// - bearer token: [`AZURE_STORAGE_BEARER_TOKEN`]
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new env provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let account_name = envs
            .get(AZURE_STORAGE_ACCOUNT_NAME)
            .or_else(|| envs.get(AZBLOB_ACCOUNT_NAME));
        let account_key = envs
            .get(AZURE_STORAGE_ACCOUNT_KEY)
            .or_else(|| envs.get(AZBLOB_ACCOUNT_KEY));

        if let (Some(account_name), Some(account_key)) = (account_name, account_key) {
            debug!("loaded shared key for {account_name} from env");
            return Ok(Some(Credential::with_shared_key(account_name, account_key)));
        }

        if let Some(sas_token) = envs.get(AZURE_STORAGE_SAS_TOKEN) {
            debug!("loaded sas token from env");
            return Ok(Some(Credential::with_sas_token(sas_token)));
        }

        if let Some(bearer_token) = envs.get(AZURE_STORAGE_BEARER_TOKEN) {
            debug!("loaded bearer token from env");
            return Ok(Some(Credential::with_bearer_token(bearer_token, None)));
        }

        Ok(None)
    }
}
