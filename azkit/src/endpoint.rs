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

use azkit_core::{Error, Result};
use http::uri::Authority;
use std::fmt::{Display, Formatter};

/// Endpoint decides which service root a client talks to.
///
/// Azure: `https://{account}.blob.core.windows.net` for the blob API and
/// `https://{account}.dfs.core.windows.net` for hierarchical namespace
/// (Data Lake) accounts. Microsoft Fabric OneLake serves the same API from
/// `https://{account}.dfs.fabric.microsoft.com`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Endpoint {
    /// `blob.core.windows.net`
    Blob,
    /// `dfs.core.windows.net`
    #[default]
    DataLake,
    /// `dfs.fabric.microsoft.com`
    Fabric,
    /// A fixed service root, for example Azurite at
    /// `http://127.0.0.1:10000/devstoreaccount1`.
    Custom(String),
}

impl Endpoint {
    /// Host suffix appended to the account name, `None` for custom roots.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Endpoint::Blob => Some("blob.core.windows.net"),
            Endpoint::DataLake => Some("dfs.core.windows.net"),
            Endpoint::Fabric => Some("dfs.fabric.microsoft.com"),
            Endpoint::Custom(_) => None,
        }
    }

    /// Build the service root url for `account_name`.
    ///
    /// The account name is only checked for what the url needs: it can't be
    /// empty and must form the host `{account_name}.{suffix}` on its own.
    /// Everything else is left to the service.
    pub fn url(&self, account_name: &str) -> Result<String> {
        if account_name.is_empty() {
            return Err(Error::config_invalid("account name cannot be empty"));
        }

        match self {
            Endpoint::Custom(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(Error::config_invalid(format!(
                        "endpoint {url} must start with http:// or https://"
                    )));
                }
                Ok(url.trim_end_matches('/').to_string())
            }
            _ => {
                let host = format!("{account_name}.{}", self.suffix().unwrap_or_default());
                match host.parse::<Authority>() {
                    Ok(authority) if authority.as_str() == authority.host() => {
                        Ok(format!("https://{host}"))
                    }
                    _ => Err(Error::config_invalid(format!(
                        "account name {account_name} can't be used as a host name"
                    ))),
                }
            }
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Custom(url) => write!(f, "{url}"),
            v => write!(f, "{}", v.suffix().unwrap_or_default()),
        }
    }
}
