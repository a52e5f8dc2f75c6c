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

//! Authenticated clients for Azure Blob and Data Lake storage.
//!
//! A [`ServiceClient`] is built by one of the factory functions, each
//! choosing how requests are authorized:
//!
//! - [`client_with_key`]: account name and shared key
//! - [`client_with_interactive_auth`]: a device code login shared through an
//!   [`InteractiveCredential`]
//! - [`client_with_sas`]: a SAS token
//! - [`client_from_env`]: whatever the environment provides, see
//!   [`azkit_azure_storage::DefaultCredentialProvider`]
//!
//! None of them touch the network, requests are only sent once a container,
//! blob or file system operation runs.
//!
//! ```no_run
//! use azkit::{client_with_key, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = client_with_key("myaccount", "bXlrZXk=")?;
//!     let container = client.container_client("photos");
//!     container.create().await?;
//!
//!     let blob = container.blob_client("hello.txt");
//!     blob.upload("Hello, World!").await?;
//!     println!("{}", blob.download().await?.content_as_text()?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod context;
pub use context::default_context;

mod endpoint;
pub use endpoint::Endpoint;

mod error;
mod path;

mod response;
pub use response::OperationResponse;

mod client;
pub use client::{
    client_from_env, client_with_interactive_auth, client_with_key, client_with_sas,
    ClientOptions, InteractiveCredential, ServiceClient,
};

pub mod blob;
pub mod datalake;
pub mod quickstart;

pub use azkit_core::{Context, Error, ErrorKind, Result};
