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

//! Building blocks shared by the azkit crates.
//!
//! A [`Signer`] pairs a [`ProvideCredential`], which finds a credential, with
//! a [`SignRequest`], which applies it to an outgoing request. The loaded
//! credential is cached until [`SigningCredential::is_valid`] says otherwise.
//! Providers are tried in order through a [`ProvideCredentialChain`].
//!
//! Every side effect goes through a [`Context`]: file access ([`FileRead`],
//! [`FileWrite`]), HTTP ([`HttpSend`]), environment ([`Env`]) and external
//! programs ([`CommandExecute`]). The `azkit-*-tokio` and
//! `azkit-http-send-reqwest` crates provide the real implementations, tests
//! plug in fakes.
//!
//! ```no_run
//! use async_trait::async_trait;
//! use azkit_core::{Context, Error, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//! use http::request::Parts;
//!
//! #[derive(Clone, Debug)]
//! struct Token(String);
//!
//! impl SigningCredential for Token {
//!     fn is_valid(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct FromEnv;
//!
//! #[async_trait]
//! impl ProvideCredential for FromEnv {
//!     type Credential = Token;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<Token>> {
//!         Ok(ctx.env_var("AZURE_STORAGE_BEARER_TOKEN").map(Token))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Bearer;
//!
//! #[async_trait]
//! impl SignRequest for Bearer {
//!     type Credential = Token;
//!
//!     async fn sign_request(&self, _: &Context, req: &mut Parts, cred: Option<&Token>) -> Result<()> {
//!         let cred = cred.ok_or_else(|| Error::credential_invalid("no token"))?;
//!         req.headers.insert("authorization", format!("Bearer {}", cred.0).parse()?);
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), FromEnv, Bearer);
//! let (mut parts, _) = http::Request::get("https://myaccount.blob.core.windows.net/")
//!     .body(())?
//!     .into_parts();
//! signer.sign(&mut parts).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{
    CommandExecute, CommandOutput, Context, Env, FileRead, FileWrite, HttpSend, NoopCommandExecute,
    NoopEnv, NoopFileRead, NoopFileWrite, NoopHttpSend, OsEnv, StaticEnv,
};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
