//! 🔧 App Configuration: the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." Every developer at 3am. 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! Every section has defaults. With no file and no env vars at all, ivx reads
//! `inventory.csv`, uses 4 workers, listens on `0.0.0.0:8080` and allows CORS
//! from `http://localhost:3000`.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail, ensure};
use axum::http::HeaderValue;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::backends::FileSourceConfig;
use crate::transforms::{TransformErrorPolicy, TransformKind};

/// 📦 The AppConfig: one struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// 📡 Where the records come from.
    #[serde(default)]
    pub source_config: SourceConfig,
    /// 🧵 How the load pipeline behaves.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// 🌐 How the read endpoint is served.
    #[serde(default)]
    pub server: ServerConfig,
}

/// 🎭 Which source backend feeds the loader. Externally tagged:
/// `[source_config.File]` in TOML.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum SourceConfig {
    // -- figment lowercases env keys, hence the alias: IVX_SOURCE_CONFIG__FILE__FILE_NAME
    #[serde(alias = "file")]
    File(FileSourceConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File(FileSourceConfig::default())
    }
}

/// 🧵 Runtime knobs for the load pipeline.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// 👷 Upper bound on the worker pool. The pool is never larger than the record count.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// ⏱️ Deadline for the whole load (read + pool + collect). Absent = wait forever.
    #[serde(default)]
    pub load_timeout_secs: Option<u64>,
    #[serde(default)]
    pub transform: TransformKind,
    #[serde(default)]
    pub on_transform_error: TransformErrorPolicy,
}

// -- 👷 four is also the number of legs on a good desk.
fn default_worker_count() -> usize {
    4
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            load_timeout_secs: None,
            transform: TransformKind::default(),
            on_transform_error: TransformErrorPolicy::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs.map(Duration::from_secs)
    }
}

/// 🌐 HTTP server knobs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// 🚧 The one and only origin the browser is allowed to call us from.
    #[serde(default = "default_cors_allowed_origin")]
    pub cors_allowed_origin: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_cors_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_allowed_origin: default_cors_allowed_origin(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("💀 server.bind_addr '{}' is not a socket address (try '0.0.0.0:8080')", self.bind_addr))
    }

    pub fn cors_origin_header(&self) -> anyhow::Result<HeaderValue> {
        HeaderValue::from_str(&self.cors_allowed_origin).with_context(|| {
            format!(
                "💀 server.cors_allowed_origin '{}' is not a valid header value",
                self.cors_allowed_origin
            )
        })
    }
}

impl AppConfig {
    /// ✅ Reject configs that would parse fine and then misbehave at runtime.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.runtime.worker_count >= 1,
            "💀 runtime.worker_count must be at least 1. Zero workers is not a pool, it's a puddle."
        );
        if self.runtime.load_timeout_secs == Some(0) {
            bail!("💀 runtime.load_timeout_secs = 0 would time out before the first row. Omit it to disable the deadline.");
        }
        self.server.socket_addr()?;
        self.server.cors_origin_header()?;
        Ok(())
    }
}

// -- 📝 what the startup log says we are about to read
fn describe_layers(config_file_name: Option<&Path>) -> String {
    match config_file_name {
        Some(path) => format!("IVX_* env vars + '{}'", path.display()),
        None => "IVX_* env vars only".to_string(),
    }
}

/// 🚀 Load the config from env vars and an optional TOML file.
///
/// 📐 Layering (tribal knowledge, do not lose):
///   - `IVX_*` env vars are the base layer. Nested keys use `__`:
///     `IVX_RUNTIME__WORKER_COUNT=8`, `IVX_SERVER__BIND_ADDR=127.0.0.1:9000`.
///   - If `config_file_name` is `Some`, the TOML file is merged on top. TOML wins on conflicts.
///   - If it is `None`, env vars (and defaults) only. No pizza defaults for file names.
///
/// 💀 Returns an error if the config is unparseable or fails [`AppConfig::validate`].
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!("🔧 Loading configuration: {}", describe_layers(config_file_name));

    let config = Figment::new().merge(Env::prefixed("IVX_").split("__"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (IVX_*).",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (IVX_*). \
                 No file was provided, this one's all on the environment."
            .to_string(),
    };

    let app_config: AppConfig = config.extract().context(context_msg)?;
    app_config.validate()?;
    Ok(app_config)
}
