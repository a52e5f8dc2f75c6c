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

use azkit_azure_storage::{X_MS_ERROR_CODE, X_MS_REQUEST_ID};
use azkit_core::Error;
use bytes::{Buf, Bytes};
use http::{Response, StatusCode};
use quick_xml::de;
use serde::Deserialize;

/// Error body returned by the blob service.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobError {
    code: String,
    message: String,
}

/// Error body returned by the data lake service.
#[derive(Default, Deserialize)]
#[serde(default)]
struct DataLakeErrorBody {
    error: DataLakeError,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct DataLakeError {
    code: String,
    message: String,
}

/// Parse a failed service response into [`Error`].
pub(crate) fn parse_error(resp: Response<Bytes>) -> Error {
    let (parts, body) = resp.into_parts();

    let (mut code, mut message) = parse_body(&body);
    if code.is_empty() {
        if let Some(v) = parts.headers.get(X_MS_ERROR_CODE).and_then(|v| v.to_str().ok()) {
            code = v.to_string();
        }
    }
    if message.is_empty() {
        message = match parts.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", parts.status.as_u16()),
            None => parts.status.to_string(),
        };
    }
    // Service messages carry the request id and time on extra lines.
    let message = message.lines().next().unwrap_or_default().trim().to_string();

    let mut text = if code.is_empty() {
        message
    } else {
        format!("{code}: {message}")
    };
    if let Some(request_id) = parts
        .headers
        .get(X_MS_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
    {
        text.push_str(&format!(" (request id: {request_id})"));
    }

    let err = match parts.status {
        StatusCode::NOT_FOUND => Error::not_found(text),
        StatusCode::CONFLICT => Error::already_exists(text),
        StatusCode::FORBIDDEN => Error::permission_denied(text),
        StatusCode::UNAUTHORIZED => Error::credential_denied(text),
        _ => Error::unexpected(text),
    }
    .with_status(parts.status);
    if code.is_empty() {
        err
    } else {
        err.with_code(code)
    }
}

fn parse_body(body: &Bytes) -> (String, String) {
    if body.is_empty() {
        return (String::new(), String::new());
    }

    if body.starts_with(b"{") {
        if let Ok(v) = serde_json::from_slice::<DataLakeErrorBody>(body) {
            return (v.error.code, v.error.message);
        }
    } else if let Ok(v) = de::from_reader::<_, BlobError>(body.clone().reader()) {
        return (v.code, v.message);
    }

    (String::new(), String::from_utf8_lossy(body).into_owned())
}
