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

use azkit_azure_storage::X_MS_REQUEST_ID;
use azkit_core::Result;
use bytes::Bytes;
use http::header::{HeaderMap, ETAG};
use http::StatusCode;

use crate::error::parse_error;

/// Outcome of an operation that returns no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResponse {
    /// Status returned by the service.
    pub status: StatusCode,
    /// Value of `x-ms-request-id`, used to trace the call on the service side.
    pub request_id: Option<String>,
    /// Entity tag of the created or updated resource.
    pub etag: Option<String>,
}

impl OperationResponse {
    pub(crate) fn from_parts(status: StatusCode, headers: &HeaderMap) -> Self {
        Self {
            status,
            request_id: header_string(headers, X_MS_REQUEST_ID),
            etag: header_string(headers, ETAG.as_str()),
        }
    }

    /// Request id for display, `-` when the service didn't send one.
    pub fn request_id_or_dash(&self) -> &str {
        self.request_id.as_deref().unwrap_or("-")
    }
}

/// Turn a response into [`OperationResponse`], or the service error it carries.
pub(crate) fn into_operation(resp: http::Response<Bytes>) -> Result<OperationResponse> {
    if !resp.status().is_success() {
        return Err(parse_error(resp));
    }
    Ok(OperationResponse::from_parts(resp.status(), resp.headers()))
}

pub(crate) fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
