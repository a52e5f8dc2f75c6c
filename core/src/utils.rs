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

//! Helpers to keep secrets out of `Debug` output.

use std::fmt::{Debug, Formatter};

/// Query parameter holding the signature of a SAS token.
const SAS_SIGNATURE: &str = "sig";

/// Masks a secret in `Debug` output.
///
/// Secrets shorter than 12 characters are hidden entirely. Longer ones keep
/// their first and last three characters so that two different keys can
/// still be told apart in logs.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        match s.len() {
            0 => f.write_str("EMPTY"),
            n if n < 12 || !s.is_char_boundary(3) || !s.is_char_boundary(n - 3) => {
                f.write_str("***")
            }
            n => write!(f, "{}***{}", &s[..3], &s[n - 3..]),
        }
    }
}

/// Masks the signature of a SAS token in `Debug` output.
///
/// Everything but `sig` is kept: version, permissions and expiry of a token
/// are not secret and are what one needs when a request gets refused.
pub struct RedactSas<'a>(&'a str);

impl<'a> From<&'a str> for RedactSas<'a> {
    fn from(value: &'a str) -> Self {
        RedactSas(value)
    }
}

impl<'a> From<&'a String> for RedactSas<'a> {
    fn from(value: &'a String) -> Self {
        RedactSas(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for RedactSas<'a> {
    fn from(value: &'a Option<String>) -> Self {
        RedactSas(value.as_deref().unwrap_or_default())
    }
}

impl Debug for RedactSas<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let token = self.0.trim_start_matches('?');
        if token.is_empty() {
            return f.write_str("EMPTY");
        }

        for (idx, kv) in token.split('&').enumerate() {
            if idx > 0 {
                f.write_str("&")?;
            }
            match kv.split_once('=') {
                Some((SAS_SIGNATURE, _)) => write!(f, "{SAS_SIGNATURE}=***")?,
                _ => f.write_str(kv)?,
            }
        }
        Ok(())
    }
}
