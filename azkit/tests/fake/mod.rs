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

//! In-memory stand-in for the blob, data lake and identity endpoints.

use async_trait::async_trait;
use azkit::{ClientOptions, Context, Endpoint, Result, ServiceClient};
use azkit_core::{HttpSend, StaticEnv};
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

pub const ACCOUNT: &str = "myaccount";
pub const ACCOUNT_KEY: &str = "dGVzdC1hY2NvdW50LWtleQ==";

const LAST_MODIFIED: &str = "Tue, 01 Mar 2022 08:12:34 GMT";

/// A request as seen by the fake service.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct StoredBlob {
    content: Bytes,
    content_type: String,
    headers: BTreeMap<&'static str, String>,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Container {
    metadata: BTreeMap<String, String>,
    blobs: BTreeMap<String, StoredBlob>,
}

/// Optional blob headers, as set by `Set Blob Properties`, and the response
/// header each one is returned as.
const BLOB_HEADERS: [(&str, &str); 4] = [
    ("x-ms-blob-content-encoding", "content-encoding"),
    ("x-ms-blob-content-language", "content-language"),
    ("x-ms-blob-content-disposition", "content-disposition"),
    ("x-ms-blob-cache-control", "cache-control"),
];

#[derive(Debug, Clone)]
enum Entry {
    Dir,
    File(Bytes),
}

#[derive(Debug, Default)]
struct FileSystem {
    entries: BTreeMap<String, Entry>,
    pending: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Default)]
struct State {
    containers: BTreeMap<String, Container>,
    file_systems: BTreeMap<String, FileSystem>,
    requests: Vec<Recorded>,
    device_code_calls: usize,
    token_calls: usize,
    deny_blob_writes: bool,
}

#[derive(Debug, Default, Clone)]
pub struct FakeService {
    state: Arc<Mutex<State>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every blob upload with `403 AuthorizationPermissionMismatch`.
    pub fn deny_blob_writes(self) -> Self {
        self.state.lock().unwrap().deny_blob_writes = true;
        self
    }

    pub fn context(&self) -> Context {
        Context::new()
            .with_http_send(self.clone())
            .with_env(StaticEnv::default())
    }

    /// Shared key client on the blob endpoint.
    pub fn blob_client(&self) -> ServiceClient {
        ClientOptions::new()
            .with_endpoint(Endpoint::Blob)
            .with_context(self.context())
            .client_with_key(ACCOUNT, ACCOUNT_KEY)
            .unwrap()
    }

    /// Shared key client on the data lake endpoint.
    pub fn data_lake_client(&self) -> ServiceClient {
        ClientOptions::new()
            .with_context(self.context())
            .client_with_key(ACCOUNT, ACCOUNT_KEY)
            .unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn containers(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .containers
            .keys()
            .cloned()
            .collect()
    }

    pub fn blob_content(&self, container: &str, blob: &str) -> Option<Bytes> {
        self.state
            .lock()
            .unwrap()
            .containers
            .get(container)?
            .blobs
            .get(blob)
            .map(|v| v.content.clone())
    }

    pub fn device_code_calls(&self) -> usize {
        self.state.lock().unwrap().device_code_calls
    }

    pub fn token_calls(&self) -> usize {
        self.state.lock().unwrap().token_calls
    }
}

#[async_trait]
impl HttpSend for FakeService {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(Recorded {
            method: req.method().clone(),
            uri: req.uri().to_string(),
            authorization: req
                .headers()
                .get(http::header::AUTHORIZATION)
                .map(|v| v.to_str().unwrap().to_string()),
        });
        let request_id = format!("req-{}", state.requests.len());

        let host = req.uri().host().unwrap_or_default().to_string();
        let mut resp = if host == "login.microsoftonline.com" {
            identity(&mut state, &req)
        } else if host.contains(".dfs.") {
            data_lake(&mut state, &req)
        } else {
            blob(&mut state, &req)
        };
        resp.headers_mut()
            .insert("x-ms-request-id", request_id.parse().unwrap());
        Ok(resp)
    }
}

fn respond(status: StatusCode, body: impl Into<Bytes>) -> Response<Bytes> {
    Response::builder().status(status).body(body.into()).unwrap()
}

fn xml_error(status: StatusCode, code: &str, message: &str) -> Response<Bytes> {
    let body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><Error><Code>{code}</Code><Message>{message}
RequestId:00000000-0000-0000-0000-000000000000</Message></Error>"#
    );
    let mut resp = respond(status, body);
    resp.headers_mut()
        .insert("x-ms-error-code", code.parse().unwrap());
    resp
}

fn json_error(status: StatusCode, code: &str, message: &str) -> Response<Bytes> {
    respond(
        status,
        format!(r#"{{"error":{{"code":"{code}","message":"{message}"}}}}"#),
    )
}

fn decode(v: &str) -> String {
    percent_decode_str(v).decode_utf8_lossy().to_string()
}

fn query(req: &Request<Bytes>) -> HashMap<String, String> {
    req.uri()
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|kv| !kv.is_empty())
        .map(|kv| match kv.split_once('=') {
            Some((k, v)) => (k.to_string(), decode(v)),
            None => (kv.to_string(), String::new()),
        })
        .collect()
}

/// Split `/{root}/{rest}` into the root name and the decoded rest.
fn split_path(req: &Request<Bytes>) -> (String, Option<String>) {
    let path = req.uri().path().trim_start_matches('/');
    match path.split_once('/') {
        Some((root, rest)) if !rest.is_empty() => (decode(root), Some(decode(rest))),
        Some((root, _)) => (decode(root), None),
        None => (decode(path), None),
    }
}

fn identity(state: &mut State, req: &Request<Bytes>) -> Response<Bytes> {
    let path = req.uri().path();
    if path.ends_with("/devicecode") {
        state.device_code_calls += 1;
        respond(
            StatusCode::OK,
            r#"{"device_code":"fake-device-code","user_code":"ABCD-EFGH","verification_uri":"https://microsoft.com/devicelogin","expires_in":900,"interval":0}"#,
        )
    } else if path.ends_with("/token") {
        state.token_calls += 1;
        respond(
            StatusCode::OK,
            r#"{"token_type":"Bearer","access_token":"fake-access-token","refresh_token":"fake-refresh-token","expires_in":3600}"#,
        )
    } else {
        respond(StatusCode::NOT_FOUND, "")
    }
}

fn metadata(req: &Request<Bytes>) -> BTreeMap<String, String> {
    req.headers()
        .iter()
        .filter_map(|(k, v)| {
            let key = k.as_str().strip_prefix("x-ms-meta-")?;
            Some((key.to_string(), v.to_str().unwrap().to_string()))
        })
        .collect()
}

fn blob(state: &mut State, req: &Request<Bytes>) -> Response<Bytes> {
    let q = query(req);
    let (container, name) = split_path(req);
    let method = req.method().clone();
    let comp = q.get("comp").map(String::as_str);

    if container.is_empty() {
        return match (method, comp) {
            (Method::GET, Some("list")) => list_containers(&state.containers, &q),
            _ => respond(StatusCode::BAD_REQUEST, ""),
        };
    }

    let Some(name) = name else {
        return match method {
            Method::PUT => {
                if state.containers.contains_key(&container) {
                    return xml_error(
                        StatusCode::CONFLICT,
                        "ContainerAlreadyExists",
                        "The specified container already exists.",
                    );
                }
                state.containers.insert(
                    container,
                    Container {
                        metadata: metadata(req),
                        blobs: BTreeMap::new(),
                    },
                );
                respond(StatusCode::CREATED, "")
            }
            Method::DELETE => match state.containers.remove(&container) {
                Some(_) => respond(StatusCode::ACCEPTED, ""),
                None => container_not_found(),
            },
            Method::HEAD => match state.containers.contains_key(&container) {
                true => respond(StatusCode::OK, ""),
                false => respond(StatusCode::NOT_FOUND, ""),
            },
            Method::GET if comp == Some("list") => {
                match state.containers.get(&container) {
                    Some(c) => list_blobs(&container, &c.blobs, &q),
                    None => container_not_found(),
                }
            }
            _ => respond(StatusCode::BAD_REQUEST, ""),
        };
    };

    if method == Method::PUT && state.deny_blob_writes {
        return xml_error(
            StatusCode::FORBIDDEN,
            "AuthorizationPermissionMismatch",
            "This request is not authorized to perform this operation using this permission.",
        );
    }
    let Some(blobs) = state.containers.get_mut(&container).map(|c| &mut c.blobs) else {
        return container_not_found();
    };

    match (method.clone(), comp) {
        (Method::PUT, Some("metadata")) => match blobs.get_mut(&name) {
            Some(blob) => {
                blob.metadata = metadata(req);
                respond(StatusCode::OK, "")
            }
            None => blob_not_found(),
        },
        (Method::PUT, Some("properties")) => match blobs.get_mut(&name) {
            Some(blob) => {
                let header = |key: &str| {
                    req.headers()
                        .get(key)
                        .map(|v| v.to_str().unwrap().to_string())
                };
                blob.content_type = header("x-ms-blob-content-type")
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                blob.headers = BLOB_HEADERS
                    .iter()
                    .filter_map(|(request, response)| Some((*response, header(*request)?)))
                    .collect();
                respond(StatusCode::OK, "")
            }
            None => blob_not_found(),
        },
        (Method::PUT, _) => {
            let content_type = req
                .headers()
                .get(http::header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            blobs.insert(
                name,
                StoredBlob {
                    content: req.body().clone(),
                    content_type,
                    ..Default::default()
                },
            );
            respond(StatusCode::CREATED, "")
        }
        (Method::GET, _) | (Method::HEAD, _) => match blobs.get(&name) {
            Some(blob) => {
                let body = if method == Method::GET {
                    blob.content.clone()
                } else {
                    Bytes::new()
                };
                let mut resp = Response::builder()
                    .status(StatusCode::OK)
                    .header(http::header::CONTENT_LENGTH, blob.content.len())
                    .header(http::header::CONTENT_TYPE, &blob.content_type)
                    .header(http::header::ETAG, "\"0x8DA0A64D66790C3\"")
                    .header(http::header::LAST_MODIFIED, LAST_MODIFIED);
                for (name, value) in &blob.headers {
                    resp = resp.header(*name, value);
                }
                for (key, value) in &blob.metadata {
                    resp = resp.header(format!("x-ms-meta-{key}"), value);
                }
                resp.body(body).unwrap()
            }
            None if method == Method::HEAD => respond(StatusCode::NOT_FOUND, ""),
            None => blob_not_found(),
        },
        (Method::DELETE, _) => match blobs.remove(&name) {
            Some(_) => respond(StatusCode::ACCEPTED, ""),
            None => blob_not_found(),
        },
        _ => respond(StatusCode::BAD_REQUEST, ""),
    }
}

fn container_not_found() -> Response<Bytes> {
    xml_error(
        StatusCode::NOT_FOUND,
        "ContainerNotFound",
        "The specified container does not exist.",
    )
}

fn blob_not_found() -> Response<Bytes> {
    xml_error(
        StatusCode::NOT_FOUND,
        "BlobNotFound",
        "The specified blob does not exist.",
    )
}

/// Markers are the name of the first entry of the next page.
fn page<T>(
    entries: impl Iterator<Item = (String, T)>,
    q: &HashMap<String, String>,
) -> (Vec<(String, T)>, Option<String>) {
    let marker = q.get("marker").cloned().unwrap_or_default();
    let max_results = q
        .get("maxresults")
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);

    let mut matched = entries.filter(|(name, _)| name.as_str() >= marker.as_str());
    let page: Vec<_> = matched.by_ref().take(max_results).collect();
    let next_marker = matched.next().map(|(name, _)| name);
    (page, next_marker)
}

fn list_blobs(
    container: &str,
    blobs: &BTreeMap<String, StoredBlob>,
    q: &HashMap<String, String>,
) -> Response<Bytes> {
    let prefix = q.get("prefix").cloned().unwrap_or_default();
    let delimiter = q.get("delimiter").cloned().unwrap_or_default();

    // `None` stands for a virtual directory folded on the delimiter.
    let mut entries: BTreeMap<String, Option<&StoredBlob>> = BTreeMap::new();
    for (name, blob) in blobs.iter().filter(|(name, _)| name.starts_with(&prefix)) {
        let rest = &name[prefix.len()..];
        match rest.find(delimiter.as_str()) {
            Some(idx) if !delimiter.is_empty() => {
                let dir = format!("{prefix}{}", &rest[..idx + delimiter.len()]);
                entries.insert(dir, None);
            }
            _ => {
                entries.insert(name.clone(), Some(blob));
            }
        }
    }
    let (items, next_marker) = page(entries.into_iter(), q);

    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ServiceEndpoint="https://{ACCOUNT}.blob.core.windows.net/" ContainerName="{container}"><Blobs>"#
    );
    for (name, blob) in items {
        match blob {
            Some(blob) => body.push_str(&format!(
                "<Blob><Name>{name}</Name><Properties><Last-Modified>{LAST_MODIFIED}</Last-Modified><Etag>0x8DA0A64D66790C3</Etag><Content-Length>{}</Content-Length><Content-Type>{}</Content-Type><BlobType>BlockBlob</BlobType></Properties><OrMetadata /></Blob>",
                blob.content.len(),
                blob.content_type
            )),
            None => body.push_str(&format!("<BlobPrefix><Name>{name}</Name></BlobPrefix>")),
        }
    }
    body.push_str("</Blobs>");
    if let Some(marker) = next_marker {
        body.push_str(&format!("<NextMarker>{marker}</NextMarker>"));
    }
    body.push_str("</EnumerationResults>");

    respond(StatusCode::OK, body)
}

fn list_containers(
    containers: &BTreeMap<String, Container>,
    q: &HashMap<String, String>,
) -> Response<Bytes> {
    let prefix = q.get("prefix").cloned().unwrap_or_default();
    let include_metadata = q.get("include").map(String::as_str) == Some("metadata");

    let (items, next_marker) = page(
        containers
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, c)| (name.clone(), c)),
        q,
    );

    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ServiceEndpoint="https://{ACCOUNT}.blob.core.windows.net/"><Containers>"#
    );
    for (name, container) in items {
        body.push_str(&format!(
            "<Container><Name>{name}</Name><Properties><Last-Modified>{LAST_MODIFIED}</Last-Modified><Etag>\"0x8DA0A64D66790C3\"</Etag></Properties>"
        ));
        if include_metadata {
            body.push_str("<Metadata>");
            for (key, value) in &container.metadata {
                body.push_str(&format!("<{key}>{value}</{key}>"));
            }
            body.push_str("</Metadata>");
        }
        body.push_str("</Container>");
    }
    body.push_str("</Containers>");
    if let Some(marker) = next_marker {
        body.push_str(&format!("<NextMarker>{marker}</NextMarker>"));
    }
    body.push_str("</EnumerationResults>");

    respond(StatusCode::OK, body)
}

fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(p, _)| p).unwrap_or_default()
}

fn insert_parents(fs: &mut FileSystem, path: &str) {
    let mut dir = parent(path);
    while !dir.is_empty() {
        fs.entries.entry(dir.to_string()).or_insert(Entry::Dir);
        dir = parent(dir);
    }
}

fn data_lake(state: &mut State, req: &Request<Bytes>) -> Response<Bytes> {
    let q = query(req);
    let (name, path) = split_path(req);
    let method = req.method().clone();
    let resource = q.get("resource").map(String::as_str);

    let Some(path) = path else {
        return match (method, resource) {
            (Method::PUT, Some("filesystem")) => {
                if state.file_systems.contains_key(&name) {
                    return json_error(
                        StatusCode::CONFLICT,
                        "FilesystemAlreadyExists",
                        "The specified filesystem already exists.",
                    );
                }
                state.file_systems.insert(name, FileSystem::default());
                respond(StatusCode::CREATED, "")
            }
            (Method::DELETE, Some("filesystem")) => match state.file_systems.remove(&name) {
                Some(_) => respond(StatusCode::ACCEPTED, ""),
                None => filesystem_not_found(),
            },
            (Method::GET, Some("filesystem")) => match state.file_systems.get(&name) {
                Some(fs) => list_paths(fs, &q),
                None => filesystem_not_found(),
            },
            _ => respond(StatusCode::BAD_REQUEST, ""),
        };
    };

    let Some(fs) = state.file_systems.get_mut(&name) else {
        return filesystem_not_found();
    };

    if let Some(source) = req.headers().get("x-ms-rename-source") {
        let source = decode(source.to_str().unwrap());
        let prefix = format!("/{name}/");
        let Some(source) = source.strip_prefix(&prefix) else {
            return respond(StatusCode::BAD_REQUEST, "");
        };
        let moved: Vec<_> = fs
            .entries
            .keys()
            .filter(|k| k.as_str() == source || k.starts_with(&format!("{source}/")))
            .cloned()
            .collect();
        if moved.is_empty() {
            return json_error(
                StatusCode::NOT_FOUND,
                "SourcePathNotFound",
                "The source path for a rename operation does not exist.",
            );
        }
        for key in moved {
            if let Some(entry) = fs.entries.remove(&key) {
                let target = format!("{path}{}", &key[source.len()..]);
                fs.entries.insert(target, entry);
            }
        }
        insert_parents(fs, &path);
        return respond(StatusCode::CREATED, "");
    }

    match (method, resource, q.get("action").map(String::as_str)) {
        (Method::PUT, Some("directory"), _) => {
            insert_parents(fs, &path);
            fs.entries.insert(path, Entry::Dir);
            respond(StatusCode::CREATED, "")
        }
        (Method::PUT, Some("file"), _) => {
            insert_parents(fs, &path);
            fs.entries.insert(path, Entry::File(Bytes::new()));
            respond(StatusCode::CREATED, "")
        }
        (Method::PATCH, _, Some("append")) => {
            let pending = fs.pending.entry(path).or_default();
            if q.get("position") != Some(&pending.len().to_string()) {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "InvalidAppendPosition",
                    "The append position is not equal to the length of the file.",
                );
            }
            pending.extend_from_slice(req.body());
            respond(StatusCode::ACCEPTED, "")
        }
        (Method::PATCH, _, Some("flush")) => {
            let pending = fs.pending.remove(&path).unwrap_or_default();
            if q.get("position") != Some(&pending.len().to_string()) {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "InvalidFlushPosition",
                    "The uploaded data is not contiguous.",
                );
            }
            fs.entries.insert(path, Entry::File(Bytes::from(pending)));
            respond(StatusCode::OK, "")
        }
        (Method::GET, _, _) => match fs.entries.get(&path) {
            Some(Entry::File(content)) => respond(StatusCode::OK, content.clone()),
            _ => path_not_found(),
        },
        (Method::DELETE, _, _) => {
            if !fs.entries.contains_key(&path) {
                return path_not_found();
            }
            let children = format!("{path}/");
            fs.entries
                .retain(|k, _| k != &path && !k.starts_with(&children));
            respond(StatusCode::OK, "")
        }
        _ => respond(StatusCode::BAD_REQUEST, ""),
    }
}

fn list_paths(fs: &FileSystem, q: &HashMap<String, String>) -> Response<Bytes> {
    let directory = q.get("directory").cloned().unwrap_or_default();
    if !directory.is_empty() && !matches!(fs.entries.get(&directory), Some(Entry::Dir)) {
        return path_not_found();
    }

    let paths: Vec<String> = fs
        .entries
        .iter()
        .filter(|(k, _)| parent(k) == directory)
        .map(|(k, entry)| match entry {
            Entry::Dir => format!(
                r#"{{"contentLength":"0","etag":"0x8DACF9B0061305E","isDirectory":"true","lastModified":"{LAST_MODIFIED}","name":"{k}"}}"#
            ),
            Entry::File(content) => format!(
                r#"{{"contentLength":"{}","etag":"0x8DACF9B0061305F","lastModified":"{LAST_MODIFIED}","name":"{k}"}}"#,
                content.len()
            ),
        })
        .collect();

    respond(
        StatusCode::OK,
        format!(r#"{{"paths":[{}]}}"#, paths.join(",")),
    )
}

fn filesystem_not_found() -> Response<Bytes> {
    json_error(
        StatusCode::NOT_FOUND,
        "FilesystemNotFound",
        "The specified filesystem does not exist.",
    )
}

fn path_not_found() -> Response<Bytes> {
    json_error(
        StatusCode::NOT_FOUND,
        "PathNotFound",
        "The specified path does not exist.",
    )
}
