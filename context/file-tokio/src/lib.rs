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

//! Tokio-based file access for azkit.
//!
//! This crate provides `TokioFileRead` and `TokioFileWrite`, which implement
//! the `FileRead` and `FileWrite` traits from `azkit_core` using Tokio's file
//! system operations. Credential providers use them to load and persist
//! token caches.
//!
//! ## Example
//!
//! ```no_run
//! use azkit_core::{Context, OsEnv};
//! use azkit_file_tokio::{TokioFileRead, TokioFileWrite};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_file_write(TokioFileWrite)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/path/to/token-cache.json").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;
use azkit_core::{Error, FileRead, FileWrite, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }
}

/// Tokio-based implementation of the `FileWrite` trait.
///
/// Missing parent directories are created before writing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileWrite;

#[async_trait]
impl FileWrite for TokioFileWrite {
    async fn file_write(&self, path: &str, content: Vec<u8>) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::unexpected(format!("failed to create directory for {path}"))
                        .with_source(e)
                })?;
            }
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| Error::unexpected(format!("failed to write file {path}")).with_source(e))
    }
}
