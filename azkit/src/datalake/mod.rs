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

//! Data Lake (hierarchical namespace) file systems, directories and files.

mod file_system;
pub use file_system::FileSystemClient;

mod paths;
pub use paths::{PathItem, PathLister};

const X_MS_RENAME_SOURCE: &str = "x-ms-rename-source";
const X_MS_CONTINUATION: &str = "x-ms-continuation";
