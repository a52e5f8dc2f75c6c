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

use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use azkit_core::hash::{base64_decode, base64_hmac_sha256};
use azkit_core::time::{format_http_date, now, DateTime};
use azkit_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::header::{self, HeaderName};
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use std::fmt::Write;

/// RequestSigner applies an Azure Storage [`Credential`] to a request.
///
/// - Shared Key: [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
/// - SAS: the token is appended to the query string as is.
/// - Bearer: an `Authorization: Bearer` header is added.
///
/// Every signed request carries `x-ms-version`, defaulting to
/// [`AZURE_STORAGE_VERSION`] when the caller didn't set one.
#[derive(Debug)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for Azure Storage.
    pub fn new() -> Self {
        Self { time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "no credential available to sign azure storage request",
            ));
        };

        let mut ctx = SigningRequest::build(req)?;
        if !ctx.headers.contains_key(X_MS_VERSION) {
            ctx.headers.insert(
                X_MS_VERSION,
                HeaderValue::from_static(AZURE_STORAGE_VERSION),
            );
        }

        match cred {
            Credential::SasToken { token } => {
                ctx.query_append(token);
            }
            Credential::BearerToken { token, .. } => {
                let now_time = self.time.unwrap_or_else(now);
                ctx.headers
                    .insert(X_MS_DATE, format_http_date(now_time).parse()?);
                ctx.headers.insert(header::AUTHORIZATION, {
                    let mut value: HeaderValue = format!("Bearer {token}").parse()?;
                    value.set_sensitive(true);
                    value
                });
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => {
                let now_time = self.time.unwrap_or_else(now);
                let string_to_sign = string_to_sign(&mut ctx, account_name, now_time)?;
                let decoded_key = base64_decode(account_key).map_err(|e| {
                    Error::credential_invalid("account key is not valid base64").with_source(e)
                })?;
                let signature = base64_hmac_sha256(&decoded_key, string_to_sign.as_bytes())?;

                ctx.headers.insert(header::AUTHORIZATION, {
                    let mut value: HeaderValue =
                        format!("SharedKey {account_name}:{signature}").parse()?;
                    value.set_sensitive(true);
                    value
                });
            }
        }

        debug!("signed azure storage request with {}", cred.kind());
        ctx.apply(req)
    }
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
fn string_to_sign(
    ctx: &mut SigningRequest,
    account_name: &str,
    now_time: DateTime,
) -> Result<String> {
    let mut s = String::with_capacity(128);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", {
        // Since version 2015-02-21 a zero length is signed as an empty string.
        let content_length = ctx.header_get_or_default(&header::CONTENT_LENGTH)?;
        if content_length == "0" {
            ""
        } else {
            content_length
        }
    })?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static("content-md5"))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_header(ctx, now_time)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &mut SigningRequest, now_time: DateTime) -> Result<String> {
    ctx.headers
        .insert(X_MS_DATE, format_http_date(now_time).parse()?);

    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    let query = ctx
        .query
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_percent_decoded_string(query, ":", "\n")
    )
}
