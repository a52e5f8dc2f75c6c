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
use azkit_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

use crate::provide_credential::{EnvCredentialProvider, InteractiveCredentialProvider};
use crate::{Config, Credential};

/// DefaultCredentialProvider tries the unattended credential sources in order:
///
/// 1. [`EnvCredentialProvider`]
/// 2. [`crate::AzureCliCredentialProvider`]
/// 3. a token left by a previous interactive login, see
///    [`InteractiveCredentialProvider::cache_only`]
///
/// It never prompts the user.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DefaultCredentialProvider {
    /// Create a new default provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a default provider, pointing the cached login at the tenant
    /// and cache named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let chain = ProvideCredentialChain::new().push(EnvCredentialProvider::new());

        #[cfg(not(target_arch = "wasm32"))]
        let chain = {
            let mut cli = crate::AzureCliCredentialProvider::new();
            if let Some(tenant_id) = &config.tenant_id {
                cli = cli.with_tenant_id(tenant_id);
            }
            chain.push(cli)
        };

        let chain = chain.push(InteractiveCredentialProvider::from_config(config).cache_only());

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
