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

//! Time related utils.

use crate::{Error, Result};
use chrono::format::{DelayedFormat, StrftimeItems};
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %T GMT").to_string()
}

/// Format time into RFC3339: `2022-03-13T07:20:04Z`
pub fn format_rfc3339(t: DateTime) -> DelayedFormat<StrftimeItems<'static>> {
    t.format("%Y-%m-%dT%H:%M:%SZ")
}

/// Parse time from RFC3339.
///
/// All of them are valid time:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-01T08:12:34+00:00`
/// - `2022-03-01T08:12:34.00+00:00`
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected(format!("parse '{s}' as rfc3339 failed")).with_source(e))?
        .with_timezone(&Utc))
}

/// Parse time from http date like `Tue, 01 Mar 2022 08:12:34 GMT`.
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc2822(s)
        .map_err(|e| Error::unexpected(format!("parse '{s}' as http date failed")).with_source(e))?
        .with_timezone(&Utc))
}

/// Parse time from a unix timestamp in seconds.
pub fn parse_timestamp(secs: i64) -> Result<DateTime> {
    chrono::DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::unexpected(format!("timestamp {secs} is out of range")))
}
