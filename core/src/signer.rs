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

use crate::{Context, ProvideCredential, Result, SignRequest, SigningCredential};
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// The loaded credential is cached and shared by every clone of the signer,
/// so the provider is only consulted again once the cached credential is no
/// longer valid.
#[derive(Clone)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    signer: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Debug for Signer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("ctx", &self.ctx)
            .field("provider", &self.provider)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        signer: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            provider: Arc::new(provider),
            signer: Arc::new(signer),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Return the cached credential, loading a new one if needed.
    pub async fn credential(&self) -> Result<Option<K>> {
        let cred = self.credential.lock().expect("lock poisoned").clone();
        if cred.is_valid() {
            return Ok(cred);
        }

        let cred = self.provider.provide_credential(&self.ctx).await?;
        *self.credential.lock().expect("lock poisoned") = cred.clone();
        Ok(cred)
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts) -> Result<()> {
        let cred = self.credential().await?;

        self.signer
            .sign_request(&self.ctx, req, cred.as_ref())
            .await
    }
}
