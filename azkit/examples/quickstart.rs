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

//! Blob storage quickstart.
//!
//! ```shell
//! export AZURE_STORAGE_ACCOUNT_NAME=myaccount
//! az login
//! cargo run -p azkit --example quickstart
//! ```
//!
//! Any failure is printed as `Error: ...`, the program still exits normally.

use azkit::quickstart::run;
use azkit::{client_from_env, default_context};

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    let _ = env_logger::try_init();

    let ctx = default_context();
    let client = match client_from_env(&ctx) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Error: {err}");
            return;
        }
    };

    let mut stdout = std::io::stdout();
    if let Err(err) = run(&client, &mut stdout).await {
        eprintln!("Error: {err}");
    }
}
