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

//! Build a client with each of the three authorization methods.
//!
//! Each method only runs when its inputs are set:
//!
//! - `AZURE_STORAGE_ACCOUNT_NAME` for all of them
//! - `AZURE_STORAGE_ACCOUNT_KEY` for the shared key
//! - `AZURE_STORAGE_SAS_TOKEN` for the SAS token
//! - `AZKIT_INTERACTIVE=on` for the interactive login

use azkit::{
    client_with_interactive_auth, client_with_key, client_with_sas, ErrorKind,
    InteractiveCredential, Result, ServiceClient,
};
use std::env;

/// List the root of a file system through the data lake endpoint the
/// factories default to. The service only answers `PathNotFound` or
/// `FilesystemNotFound` once the request is authorized, so those count as
/// reachable too.
async fn check(method: &str, client: ServiceClient) {
    let mut paths = client
        .file_system_client("azkit-authorize-check")
        .list_paths("");
    match paths.next_page().await {
        Ok(page) => println!(
            "{method}: {} reachable, {} paths",
            client.url(),
            page.map(|v| v.len()).unwrap_or_default()
        ),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            println!("{method}: {} reachable, no check file system", client.url())
        }
        Err(err) => println!("{method}: {} failed: {err}", client.url()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    let _ = env_logger::try_init();

    let Ok(account) = env::var("AZURE_STORAGE_ACCOUNT_NAME") else {
        eprintln!("Error: AZURE_STORAGE_ACCOUNT_NAME is not set");
        return Ok(());
    };

    if let Ok(key) = env::var("AZURE_STORAGE_ACCOUNT_KEY") {
        check("shared key", client_with_key(&account, &key)?).await;
    }

    if let Ok(sas) = env::var("AZURE_STORAGE_SAS_TOKEN") {
        check("sas token", client_with_sas(&account, &sas)?).await;
    }

    if env::var("AZKIT_INTERACTIVE").as_deref() == Ok("on") {
        // One credential for every client, the user logs in once.
        let credential = InteractiveCredential::new();
        check(
            "interactive",
            client_with_interactive_auth(&account, &credential)?,
        )
        .await;
        check(
            "interactive again",
            client_with_interactive_auth(&account, &credential)?,
        )
        .await;
    }

    Ok(())
}
