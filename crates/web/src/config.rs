//! Layered settings: built-in defaults, an optional TOML file, then
//! `ENSLOOKUP_*` environment variables.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use enslookup_core::{CachedBackend, EnsBackend};
use enslookup_sdk::{AvatarGateways, EnsClient, RpcClient, ENS_REGISTRY};
use enslookup_types::Address;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_RPC_URL: &str = "https://eth-mainnet.g.alchemy.com/v2/demo";
pub const ENV_PREFIX: &str = "ENSLOOKUP";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub rpc_url: String,
    pub registry_address: String,
    pub ipfs_gateway: String,
    pub arweave_gateway: String,
    pub request_timeout_secs: u64,
    /// Zero disables the result cache.
    pub cache_ttl_secs: u64,
    /// Idle time after which a browser's lookup session is dropped.
    pub session_idle_secs: u64,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// `pretty` or `json`.
    pub log_format: String,
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let gateways = AvatarGateways::default();
        let mut builder = Config::builder()
            .set_default("rpc_url", DEFAULT_RPC_URL)?
            .set_default("registry_address", ENS_REGISTRY.to_string())?
            .set_default("ipfs_gateway", gateways.ipfs)?
            .set_default("arweave_gateway", gateways.arweave)?
            .set_default("request_timeout_secs", 10)?
            .set_default("cache_ttl_secs", 60)?
            .set_default("session_idle_secs", 1800)?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?;

        if let Some(path) = config_path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        builder
            .build()?
            .try_deserialize()
            .context("invalid enslookup configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn registry(&self) -> Result<Address> {
        self.registry_address
            .parse()
            .with_context(|| format!("invalid registry address {}", self.registry_address))
    }

    /// Resolution client for the configured node, wrapped in the result
    /// cache unless it is disabled.
    pub fn backend(&self) -> Result<Arc<dyn EnsBackend>> {
        let rpc = RpcClient::with_timeout(
            &self.rpc_url,
            Duration::from_secs(self.request_timeout_secs),
        )
        .with_context(|| format!("invalid RPC URL {}", self.rpc_url))?;

        let client = EnsClient::new(rpc)
            .with_registry(self.registry()?)
            .with_gateways(AvatarGateways {
                ipfs: self.ipfs_gateway.clone(),
                arweave: self.arweave_gateway.clone(),
            });

        if self.cache_ttl_secs == 0 {
            info!(rpc_url = %self.rpc_url, "result cache disabled");
            return Ok(Arc::new(client));
        }
        Ok(Arc::new(CachedBackend::new(
            client,
            Duration::from_secs(self.cache_ttl_secs),
        )))
    }
}
