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

use crate::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Context bundles every side effect a signer or client may need: reading
/// and writing files, sending HTTP requests, reading the environment and
/// running commands.
///
/// Nothing is wired by default. A component left unset answers with an
/// error (or nothing, for the environment), which keeps tests hermetic:
///
/// ```
/// use azkit_core::{Context, StaticEnv};
///
/// let ctx = Context::new().with_env(StaticEnv::default());
/// assert_eq!(ctx.env_var("AZURE_STORAGE_ACCOUNT_NAME"), None);
/// ```
#[derive(Clone)]
pub struct Context {
    fs_read: Arc<dyn FileRead>,
    fs_write: Arc<dyn FileWrite>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
    cmd: Arc<dyn CommandExecute>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("fs_read", &self.fs_read)
            .field("fs_write", &self.fs_write)
            .field("http", &self.http)
            .field("env", &self.env)
            .field("cmd", &self.cmd)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context where every component is unset.
    pub fn new() -> Self {
        Self {
            fs_read: Arc::new(NoopFileRead),
            fs_write: Arc::new(NoopFileWrite),
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
            cmd: Arc::new(NoopCommandExecute),
        }
    }

    /// Use `fs` to read files.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs_read = Arc::new(fs);
        self
    }

    /// Use `fs` to write files.
    pub fn with_file_write(mut self, fs: impl FileWrite) -> Self {
        self.fs_write = Arc::new(fs);
        self
    }

    /// Use `http` to send requests.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Use `env` to look up environment values and the home directory.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Use `cmd` to run external programs.
    pub fn with_command_execute(mut self, cmd: impl CommandExecute) -> Self {
        self.cmd = Arc::new(cmd);
        self
    }

    /// Read the whole file at `path`.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs_read.file_read(path).await
    }

    /// Write `content` to `path`, replacing the file if it exists.
    #[inline]
    pub async fn file_write(&self, path: &str, content: Vec<u8>) -> Result<()> {
        self.fs_write.file_write(path, content).await
    }

    /// Send `req` and wait for the whole response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Home directory of the current user.
    #[inline]
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env.home_dir()
    }

    /// Replace a leading `~/` (or `~\`) in `path` with the home directory.
    ///
    /// Paths without it are returned as is. `None` means the path needs a
    /// home directory and none is known.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
            None => Some(path.to_string()),
            Some(rest) => self
                .home_dir()
                .map(|home| home.join(rest).to_string_lossy().into_owned()),
        }
    }

    /// Value of the environment variable `key`, if set and valid utf-8.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Every environment variable.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }

    /// Run `program` with `args` and collect its output.
    pub async fn command_execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.cmd.command_execute(program, args).await
    }
}

/// Reads whole files, for example a token cache.
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the whole file at `path`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Persists small files such as token caches.
///
/// Implementations must create missing parent directories.
#[async_trait::async_trait]
pub trait FileWrite: Debug + Send + Sync + 'static {
    /// Write `content` to `path`, replacing the file if it exists.
    async fn file_write(&self, path: &str, content: Vec<u8>) -> Result<()>;
}

/// Sends HTTP requests.
///
/// Credential providers use it to talk to the identity platform and the
/// storage clients use it to reach the service. Tests replace it with an
/// in-memory fake.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send `req` and wait for the whole response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Source of environment values and of the home directory.
pub trait Env: Debug + Send + Sync + 'static {
    /// Value of `key`, `None` if unset or not valid utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Every variable.
    fn vars(&self) -> HashMap<String, String>;

    /// Home directory of the current user.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The environment of the running process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir().filter(|p| !p.as_os_str().is_empty())
    }

    #[cfg(target_arch = "wasm32")]
    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// A fixed environment, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// Home directory returned by [`Env::home_dir`].
    pub home_dir: Option<PathBuf>,
    /// Variables returned by [`Env::var`].
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }
}

/// Output of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `0` on success.
    pub status: i32,
    /// Captured stdout.
    pub stdout: Vec<u8>,
    /// Captured stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the command exited with `0`.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external programs, for example `az account get-access-token`.
#[async_trait::async_trait]
pub trait CommandExecute: Debug + Send + Sync + 'static {
    /// Run `program` with `args` and collect its output.
    async fn command_execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Unset file reader, every read fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait::async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(format!(
            "no file reader configured, can't read {path}"
        )))
    }
}

/// Unset file writer, every write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileWrite;

#[async_trait::async_trait]
impl FileWrite for NoopFileWrite {
    async fn file_write(&self, path: &str, _: Vec<u8>) -> Result<()> {
        Err(Error::unexpected(format!(
            "no file writer configured, can't write {path}"
        )))
    }
}

/// Unset HTTP client, every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(format!(
            "no http client configured, can't send {} {}",
            req.method(),
            req.uri()
        )))
    }
}

/// Empty environment without home directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// Unset command runner, every command fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCommandExecute;

#[async_trait::async_trait]
impl CommandExecute for NoopCommandExecute {
    async fn command_execute(&self, program: &str, _: &[&str]) -> Result<CommandOutput> {
        Err(Error::unexpected(format!(
            "no command executor configured, can't run {program}"
        )))
    }
}
