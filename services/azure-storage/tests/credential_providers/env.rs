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

use azkit_azure_storage::{Credential, DefaultCredentialProvider, EnvCredentialProvider};
use azkit_core::{Context, ProvideCredential, StaticEnv};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn ctx(envs: &[(&str, &str)]) -> Context {
    Context::new().with_env(StaticEnv {
        home_dir: None,
        envs: envs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    })
}

#[tokio::test]
async fn test_env_shared_key_beats_sas_token() {
    let ctx = ctx(&[
        ("AZURE_STORAGE_ACCOUNT_NAME", "account"),
        ("AZURE_STORAGE_ACCOUNT_KEY", "a2V5"),
        ("AZURE_STORAGE_SAS_TOKEN", "sv=2022-11-02&sig=abc"),
    ]);

    let cred = EnvCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert_eq!(cred, Some(Credential::with_shared_key("account", "a2V5")));
}

#[tokio::test]
async fn test_default_chain_reads_sas_from_env() {
    let ctx = ctx(&[("AZURE_STORAGE_SAS_TOKEN", "?sv=2022-11-02&sig=abc")]);

    let cred = DefaultCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert_eq!(cred, Some(Credential::with_sas_token("sv=2022-11-02&sig=abc")));
}
