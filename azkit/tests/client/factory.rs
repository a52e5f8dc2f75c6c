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

use azkit::{
    client_from_env, client_with_interactive_auth, client_with_key, client_with_sas,
    ClientOptions, Context, Endpoint, ErrorKind, InteractiveCredential,
};
use azkit_azure_storage::InteractiveCredentialProvider;
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::fake::{FakeService, ACCOUNT, ACCOUNT_KEY};
use crate::init_logger;

const SAS_TOKEN: &str = "?sv=2022-11-02&ss=b&srt=sco&sp=rwdlac&sig=c2lnbmF0dXJl";

#[test_case(Endpoint::DataLake, "myaccount.dfs.core.windows.net"; "data lake")]
#[test_case(Endpoint::Blob, "myaccount.blob.core.windows.net"; "blob")]
#[test_case(Endpoint::Fabric, "myaccount.dfs.fabric.microsoft.com"; "fabric")]
fn test_factory_host(endpoint: Endpoint, host: &str) {
    init_logger();

    let fake = FakeService::new();
    let opts = ClientOptions::new()
        .with_endpoint(endpoint)
        .with_context(fake.context());
    let credential = InteractiveCredential::with_provider(
        fake.context(),
        InteractiveCredentialProvider::new(),
    );

    let clients = [
        opts.client_with_key(ACCOUNT, ACCOUNT_KEY).unwrap(),
        opts.client_with_interactive_auth(ACCOUNT, &credential)
            .unwrap(),
        opts.client_with_sas(ACCOUNT, SAS_TOKEN).unwrap(),
    ];
    for client in clients {
        assert_eq!(client.host(), host);
        assert_eq!(client.url(), format!("https://{host}"));
    }

    assert!(fake.requests().is_empty(), "factories must not send requests");
}

#[test]
fn test_factory_defaults_to_data_lake() {
    let credential = InteractiveCredential::with_provider(
        Context::new(),
        InteractiveCredentialProvider::new(),
    );

    for client in [
        client_with_key(ACCOUNT, ACCOUNT_KEY).unwrap(),
        client_with_interactive_auth(ACCOUNT, &credential).unwrap(),
        client_with_sas(ACCOUNT, SAS_TOKEN).unwrap(),
    ] {
        assert_eq!(client.host(), "myaccount.dfs.core.windows.net");
    }
}

#[test_case("MyStorageAccount"; "mixed case")]
#[test_case("my-workspace"; "dash")]
#[test_case("ab"; "short")]
fn test_factory_keeps_account_name_in_host(account: &str) {
    let opts = ClientOptions::new().with_context(Context::new());
    let credential = InteractiveCredential::with_provider(
        Context::new(),
        InteractiveCredentialProvider::new(),
    );

    for client in [
        opts.client_with_key(account, ACCOUNT_KEY).unwrap(),
        opts.client_with_interactive_auth(account, &credential).unwrap(),
        opts.client_with_sas(account, SAS_TOKEN).unwrap(),
    ] {
        assert_eq!(client.host(), format!("{account}.dfs.core.windows.net"));
    }
}

#[test_case(""; "empty")]
#[test_case("my account"; "space")]
#[test_case("evil.com/x"; "path")]
fn test_factory_rejects_account_name(account: &str) {
    let opts = ClientOptions::new().with_context(Context::new());

    let err = opts.client_with_key(account, ACCOUNT_KEY).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    let err = opts.client_with_sas(account, SAS_TOKEN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[tokio::test]
async fn test_malformed_key_fails_on_first_request() {
    let fake = FakeService::new();
    let client = ClientOptions::new()
        .with_context(fake.context())
        .client_with_key(ACCOUNT, "not base64!")
        .unwrap();

    let err = client
        .container_client("photos")
        .create()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_sas_token_is_appended_to_requests() {
    let fake = FakeService::new();
    let client = ClientOptions::new()
        .with_endpoint(Endpoint::Blob)
        .with_context(fake.context())
        .client_with_sas(ACCOUNT, SAS_TOKEN)
        .unwrap();

    client.container_client("photos").create().await.unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].uri,
        "https://myaccount.blob.core.windows.net/photos?restype=container\
         &sv=2022-11-02&ss=b&srt=sco&sp=rwdlac&sig=c2lnbmF0dXJl"
    );
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn test_client_from_env_requires_account_name() {
    let fake = FakeService::new();

    let err = client_from_env(&fake.context()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(err.message().contains("AZURE_STORAGE_ACCOUNT_NAME"));
    assert!(fake.requests().is_empty());
}
