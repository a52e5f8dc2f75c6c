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

use azkit::quickstart::{run, Step};
use azkit::ErrorKind;
use http::Method;
use pretty_assertions::assert_eq;

use crate::fake::FakeService;
use crate::init_logger;

#[tokio::test]
async fn test_quickstart_against_service() {
    init_logger();

    let fake = FakeService::new();
    let client = fake.blob_client();
    let mut out = Vec::new();

    let summary = run(&client, &mut out).await.unwrap();

    assert_eq!(summary.listed, vec![summary.blob.clone()]);
    assert_eq!(summary.downloaded, "Hello, World!");
    assert!(fake.containers().is_empty(), "container must be deleted");

    let methods: Vec<_> = fake.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(
        methods,
        vec![
            Method::PUT,
            Method::PUT,
            Method::GET,
            Method::GET,
            Method::DELETE
        ]
    );

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(&format!(
        "URL: https://myaccount.blob.core.windows.net/{}/{}",
        summary.container, summary.blob
    )));
    assert!(out.contains("Container was created successfully.\n\trequestId:req-1"));
    assert!(out.contains("Container was deleted successfully. requestId: req-5"));
}

#[tokio::test]
async fn test_quickstart_stops_after_failed_upload() {
    init_logger();

    let fake = FakeService::new().deny_blob_writes();
    let client = fake.blob_client();
    let mut out = Vec::new();

    let err = run(&client, &mut out).await.unwrap_err();
    assert_eq!(err.step, Step::UploadBlob);
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(err
        .to_string()
        .starts_with("upload blob failed: AuthorizationPermissionMismatch"));

    // Nothing runs after the failed upload, the container stays in place.
    assert_eq!(fake.requests().len(), 2);
    assert_eq!(fake.containers().len(), 1);
    assert!(!String::from_utf8(out).unwrap().contains("Listing blobs"));
}
