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

use crate::{is_test_enabled, live_context};
use azkit_azure_storage::{RequestSigner, StaticCredentialProvider};
use azkit_core::Signer;
use http::StatusCode;
use log::warn;

fn test_config() -> Option<(String, String, String)> {
    if !is_test_enabled() {
        return None;
    }

    Some((
        std::env::var("AZKIT_AZURE_STORAGE_URL").ok()?,
        std::env::var("AZKIT_AZURE_STORAGE_ACCOUNT_NAME").ok()?,
        std::env::var("AZKIT_AZURE_STORAGE_ACCOUNT_KEY").ok()?,
    ))
}

#[tokio::test]
async fn test_shared_key_put_and_get() {
    let Some((url, account_name, account_key)) = test_config() else {
        warn!("AZKIT_AZURE_STORAGE_TEST is not enabled, skipped");
        return;
    };

    let ctx = live_context();
    let provider = StaticCredentialProvider::new_shared_key(&account_name, &account_key);
    let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());

    let blob_url = format!("{url}/azkit-shared-key-{}.txt", uuid::Uuid::new_v4());
    let content = bytes::Bytes::from_static(b"Hello, World!");

    let (mut parts, body) = http::Request::put(&blob_url)
        .header("x-ms-blob-type", "BlockBlob")
        .header(http::header::CONTENT_LENGTH, content.len())
        .body(content.clone())
        .unwrap()
        .into_parts();
    signer.sign(&mut parts).await.unwrap();
    let auth = parts.headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with(&format!("SharedKey {account_name}:")));

    let resp = ctx
        .http_send(http::Request::from_parts(parts, body))
        .await
        .unwrap();
    assert_eq!(StatusCode::CREATED, resp.status());

    let (mut parts, body) = http::Request::get(&blob_url)
        .body(bytes::Bytes::new())
        .unwrap()
        .into_parts();
    signer.sign(&mut parts).await.unwrap();
    let resp = ctx
        .http_send(http::Request::from_parts(parts, body))
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, resp.status());
    assert_eq!(resp.body().as_ref(), b"Hello, World!");
}
