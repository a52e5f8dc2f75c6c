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

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_REQUEST_ID: &str = "x-ms-request-id";
pub const X_MS_ERROR_CODE: &str = "x-ms-error-code";

/// Service version sent when a request carries none.
///
/// 2022-11-02 is accepted by both Azure and Azurite V3.
pub const AZURE_STORAGE_VERSION: &str = "2022-11-02";

/// Resource passed to `az account get-access-token`.
pub const AZURE_STORAGE_RESOURCE: &str = "https://storage.azure.com/";
/// Scope requested from the identity platform for storage tokens.
pub const AZURE_STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

pub const AZURE_PUBLIC_CLOUD: &str = "https://login.microsoftonline.com";
/// Tenant used by interactive logins when none is configured.
pub const DEFAULT_INTERACTIVE_TENANT: &str = "organizations";
/// Public client id used by interactive developer logins.
pub const DEFAULT_INTERACTIVE_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";
pub const DEFAULT_TOKEN_CACHE_NAME: &str = "azkit";

// Env values used in azure services.
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZURE_STORAGE_SAS_TOKEN: &str = "AZURE_STORAGE_SAS_TOKEN";
pub const AZURE_STORAGE_BEARER_TOKEN: &str = "AZURE_STORAGE_BEARER_TOKEN";
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const AZKIT_TOKEN_CACHE_NAME: &str = "AZKIT_TOKEN_CACHE_NAME";
