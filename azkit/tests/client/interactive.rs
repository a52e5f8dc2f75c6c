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

use azkit::{ClientOptions, Context, Endpoint, InteractiveCredential};
use azkit_azure_storage::{InteractiveCredentialProvider, TokenCache};
use azkit_file_tokio::{TokioFileRead, TokioFileWrite};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::fake::{FakeService, ACCOUNT};
use crate::init_logger;

fn credential(
    fake: &FakeService,
    cache_path: &str,
    prompts: Arc<AtomicUsize>,
) -> InteractiveCredential {
    let ctx: Context = fake
        .context()
        .with_file_read(TokioFileRead)
        .with_file_write(TokioFileWrite);
    let provider = InteractiveCredentialProvider::new()
        .with_token_cache(TokenCache::new("test").with_path(cache_path))
        .with_prompt(move |prompt| {
            assert_eq!(prompt.user_code, "ABCD-EFGH");
            prompts.fetch_add(1, Ordering::SeqCst);
        });
    InteractiveCredential::with_provider(ctx, provider)
}

#[tokio::test]
async fn test_interactive_credential_is_shared_by_clients() {
    init_logger();

    let tmp = tempfile::tempdir().unwrap();
    let cache_path = tmp.path().join("test.json").to_string_lossy().to_string();
    let fake = FakeService::new();
    let prompts = Arc::new(AtomicUsize::new(0));
    let credential = credential(&fake, &cache_path, prompts.clone());

    let opts = ClientOptions::new().with_endpoint(Endpoint::Blob);
    let first = opts
        .client_with_interactive_auth(ACCOUNT, &credential)
        .unwrap();
    let second = opts
        .client_with_interactive_auth(ACCOUNT, &credential)
        .unwrap();

    first.container_client("first").create().await.unwrap();
    second.container_client("second").create().await.unwrap();

    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    assert_eq!(fake.device_code_calls(), 1);
    assert_eq!(fake.token_calls(), 1);
    assert_eq!(fake.containers(), vec!["first", "second"]);

    let authorizations: Vec<_> = fake
        .requests()
        .into_iter()
        .filter(|r| r.uri.starts_with("https://myaccount.blob.core.windows.net/"))
        .map(|r| r.authorization)
        .collect();
    assert_eq!(
        authorizations,
        vec![Some("Bearer fake-access-token".to_string()); 2]
    );
}

#[tokio::test]
async fn test_interactive_credential_reuses_token_cache() {
    init_logger();

    let tmp = tempfile::tempdir().unwrap();
    let cache_path = tmp.path().join("test.json").to_string_lossy().to_string();
    let fake = FakeService::new();
    let prompts = Arc::new(AtomicUsize::new(0));

    let first = credential(&fake, &cache_path, prompts.clone());
    first.login().await.unwrap();
    assert!(std::path::Path::new(&cache_path).exists());

    // A new credential, as after a restart, finds the cached token.
    let second = credential(&fake, &cache_path, prompts.clone());
    let client = ClientOptions::new()
        .with_endpoint(Endpoint::Blob)
        .client_with_interactive_auth(ACCOUNT, &second)
        .unwrap();
    client.container_client("photos").create().await.unwrap();

    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    assert_eq!(fake.device_code_calls(), 1);
}
