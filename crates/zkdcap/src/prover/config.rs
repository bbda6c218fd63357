// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Configuration of the proving backends

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::trace;

/// Published image id of the DCAP verification guest
pub const BONSAI_IMAGE_ID: &str =
    "83613a8beec226d1f29714530f1df791fa16c2c4dfcf22c50ab7edac59ca637f";

const DEFAULT_BONSAI_API_URL: &str = "https://api.bonsai.xyz/";
const DEFAULT_RISC0_VERSION: &str = "1.1.2";
const DEFAULT_SP1_RPC: &str = "https://rpc.succinct.xyz/";
const DEFAULT_SP1_VERSION: &str = "v3.0.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Prefix of configuration environment variables, e.g. `ZKDCAP__SP1__RPC`
pub const ENV_PREFIX: &str = "ZKDCAP";

/// Configuration of all proving backends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZkProofConfig {
    /// RiscZero Bonsai backend
    #[serde(default)]
    pub bonsai: Option<BonsaiConfig>,
    /// Succinct SP1 prover network backend
    #[serde(default)]
    pub sp1: Option<Sp1Config>,
}

impl ZkProofConfig {
    /// Load from an optional file, overridden by `ZKDCAP__*` environment
    /// variables, with defaults applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            trace!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path));
        }
        Self::from_builder(builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        ))
    }

    /// Deserialize from prepared sources and apply defaults.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut config: Self = builder.build()?.try_deserialize()?;
        config.init();
        Ok(config)
    }

    /// Fill in defaults and drop the backends without credentials.
    pub fn init(&mut self) {
        let mut bonsai = self.bonsai.take().unwrap_or_default();
        bonsai.init();
        self.bonsai = bonsai.is_configured().then_some(bonsai);

        let mut sp1 = self.sp1.take().unwrap_or_default();
        sp1.init();
        self.sp1 = sp1.is_configured().then_some(sp1);
    }
}

/// Configuration of the Bonsai proving service
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BonsaiConfig {
    /// API base URL, `BONSAI_API_URL` if empty
    pub api_url: String,
    /// API key, `BONSAI_API_KEY` if empty
    pub api_key: String,
    /// zkVM version sent with every request
    pub risc0_version: String,
    /// image id of the guest to run
    pub image_id: String,
    /// per request timeout
    pub timeout_secs: u64,
    /// status poll interval
    pub poll_interval_secs: u64,
}

impl BonsaiConfig {
    /// Fill in defaults
    pub fn init(&mut self) {
        if self.api_url.is_empty() {
            self.api_url = env_or("BONSAI_API_URL", DEFAULT_BONSAI_API_URL);
        }
        ensure_trailing_slash(&mut self.api_url);
        if self.api_key.is_empty() {
            self.api_key = env_or("BONSAI_API_KEY", "");
        }
        if self.risc0_version.is_empty() {
            self.risc0_version = DEFAULT_RISC0_VERSION.into();
        }
        if self.image_id.is_empty() {
            self.image_id = BONSAI_IMAGE_ID.into();
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.poll_interval_secs == 0 {
            self.poll_interval_secs = DEFAULT_POLL_INTERVAL_SECS;
        }
    }

    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Per request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Status poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl fmt::Debug for BonsaiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BonsaiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redacted(&self.api_key))
            .field("risc0_version", &self.risc0_version)
            .field("image_id", &self.image_id)
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

/// Configuration of the SP1 prover network
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sp1Config {
    /// RPC base URL, `PROVER_NETWORK_RPC` if empty
    pub rpc: String,
    /// hex encoded secp256k1 account key, `SP1_PRIVATE_KEY` if empty
    pub private_key: String,
    /// per request timeout
    pub timeout_secs: u64,
    /// status poll interval
    pub poll_interval_secs: u64,
    /// circuit version to prove with
    pub version: String,
    /// guest ELF to upload
    pub program_path: Option<PathBuf>,
}

impl Sp1Config {
    /// Fill in defaults
    pub fn init(&mut self) {
        if self.rpc.is_empty() {
            self.rpc = env_or("PROVER_NETWORK_RPC", DEFAULT_SP1_RPC);
        }
        ensure_trailing_slash(&mut self.rpc);
        if self.private_key.is_empty() {
            self.private_key = env_or("SP1_PRIVATE_KEY", "");
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.poll_interval_secs == 0 {
            self.poll_interval_secs = DEFAULT_POLL_INTERVAL_SECS;
        }
        if self.version.is_empty() {
            self.version = DEFAULT_SP1_VERSION.into();
        }
    }

    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        !self.private_key.is_empty()
    }

    /// Per request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Status poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl fmt::Debug for Sp1Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sp1Config")
            .field("rpc", &self.rpc)
            .field("private_key", &redacted(&self.private_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("version", &self.version)
            .field("program_path", &self.program_path)
            .finish()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn ensure_trailing_slash(url: &mut String) {
    if !url.is_empty() && !url.ends_with('/') {
        url.push('/');
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}
