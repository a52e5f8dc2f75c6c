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

//! Azure Storage credentials and request signing.
//!
//! This crate provides:
//! - Shared Key authentication
//! - SAS (Shared Access Signature) token authentication
//! - Bearer token authentication, including an interactive device code login
//!   backed by a persistent token cache
//!
//! # Example
//!
//! ```no_run
//! use azkit_azure_storage::{RequestSigner, StaticCredentialProvider};
//! use azkit_core::{Context, Result, Signer};
//! use azkit_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//!
//!     let provider = StaticCredentialProvider::new_shared_key("myaccount", "bXlrZXk=");
//!     let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
//!
//!     let req = http::Request::get("https://myaccount.blob.core.windows.net/?comp=list")
//!         .body(bytes::Bytes::new())?;
//!     let (mut parts, body) = req.into_parts();
//!     signer.sign(&mut parts).await?;
//!
//!     let resp = ctx.http_send(http::Request::from_parts(parts, body)).await?;
//!     println!("status: {}", resp.status());
//!     Ok(())
//! }
//! ```

mod constants;
pub use constants::*;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod token_cache;
pub use token_cache::{CachedToken, TokenCache};

mod provide_credential;
pub use provide_credential::*;
