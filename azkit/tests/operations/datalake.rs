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

use azkit::ErrorKind;
use pretty_assertions::assert_eq;

use crate::fake::FakeService;
use crate::init_logger;

fn names(items: &[azkit::datalake::PathItem]) -> Vec<(String, bool)> {
    items
        .iter()
        .map(|v| (v.name.clone(), v.is_directory))
        .collect()
}

#[tokio::test]
async fn test_file_system_crud() {
    init_logger();

    let fake = FakeService::new();
    let fs = fake.data_lake_client().file_system_client("my-file-system");
    assert_eq!(
        fs.url(),
        "https://myaccount.dfs.core.windows.net/my-file-system"
    );

    fs.create().await.unwrap();
    let err = fs.create().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(err.code(), Some("FilesystemAlreadyExists"));

    fs.create_directory("my-directory/my-subdirectory")
        .await
        .unwrap();
    fs.upload_file("my-directory/uploaded-file.txt", "Hello, World!")
        .await
        .unwrap();

    let items = fs.list_paths("my-directory").collect().await.unwrap();
    assert_eq!(
        names(&items),
        vec![
            ("my-directory/my-subdirectory".to_string(), true),
            ("my-directory/uploaded-file.txt".to_string(), false),
        ]
    );
    assert_eq!(items[1].content_length, 13);

    assert_eq!(
        fs.read_file("/my-directory/uploaded-file.txt")
            .await
            .unwrap(),
        "Hello, World!"
    );

    fs.rename_directory(
        "my-directory/my-subdirectory",
        "my-directory/my-subdirectory-renamed",
    )
    .await
    .unwrap();
    fs.rename_directory(
        "my-directory/my-subdirectory-renamed",
        "my-directory-2/my-subdirectory-renamed",
    )
    .await
    .unwrap();
    let root = fs.list_paths("").collect().await.unwrap();
    assert_eq!(
        names(&root),
        vec![
            ("my-directory".to_string(), true),
            ("my-directory-2".to_string(), true),
        ]
    );
    let moved = fs.list_paths("my-directory-2").collect().await.unwrap();
    assert_eq!(
        names(&moved),
        vec![("my-directory-2/my-subdirectory-renamed".to_string(), true)]
    );

    fs.delete_directory("my-directory").await.unwrap();
    let err = fs
        .read_file("my-directory/uploaded-file.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.code(), Some("PathNotFound"));
    assert!(fs.list_paths("my-directory").collect().await.unwrap().is_empty());

    fs.delete().await.unwrap();
}

#[tokio::test]
async fn test_upload_file_appends_then_flushes() {
    let fake = FakeService::new();
    let fs = fake.data_lake_client().file_system_client("fs");
    fs.create().await.unwrap();

    fs.upload_file("a.txt", "Hello, World!").await.unwrap();
    fs.upload_file("empty.txt", "").await.unwrap();

    let calls: Vec<_> = fake
        .requests()
        .into_iter()
        .skip(1)
        .map(|r| format!("{} {}", r.method, r.uri))
        .collect();
    assert_eq!(
        calls,
        vec![
            "PUT https://myaccount.dfs.core.windows.net/fs/a.txt?resource=file",
            "PATCH https://myaccount.dfs.core.windows.net/fs/a.txt?action=append&position=0",
            "PATCH https://myaccount.dfs.core.windows.net/fs/a.txt?action=flush&position=13",
            "PUT https://myaccount.dfs.core.windows.net/fs/empty.txt?resource=file",
            "PATCH https://myaccount.dfs.core.windows.net/fs/empty.txt?action=flush&position=0",
        ]
    );
    assert_eq!(fs.read_file("empty.txt").await.unwrap(), "");
}

#[tokio::test]
async fn test_list_paths_missing_file_system() {
    let fake = FakeService::new();
    let err = fake
        .data_lake_client()
        .file_system_client("missing")
        .list_paths("")
        .next_page()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.code(), Some("FilesystemNotFound"));
    assert!(fake.requests()[0].authorization.is_some());
}
