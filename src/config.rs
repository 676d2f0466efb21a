// src/config.rs

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::blockchain::chains::Chain;

pub const DEFAULT_API_URL: &str = "https://meatmarket.fun/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const STATE_FILE_NAME: &str = "credentials.json";

// A struct to hold all configuration, loaded once at startup from the environment (and .env).
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the marketplace REST API, including the versioned path.
    pub api_url: String,
    /// `MEATMARKET_API_KEY`, wins over the persisted key.
    pub api_key: Option<String>,
    /// `MEATMARKET_AI_ID`, wins over the persisted agent id.
    pub agent_id: Option<String>,
    /// Directory holding the persisted state document.
    pub data_dir: PathBuf,
    /// Applied to every outbound REST and chain RPC call.
    pub request_timeout: Duration,
    /// Per-chain RPC endpoint overrides. Chains not listed use the built-in table.
    pub chain_rpc_urls: HashMap<Chain, String>,

    // HTTP transport settings
    pub port: u16,
    pub http_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            agent_id: None,
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            chain_rpc_urls: HashMap::new(),
            port: 8080,
            http_mode: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".meatmarket");
    path
}

impl Config {
    /// Path of the persisted state document.
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE_NAME)
    }

    /// RPC endpoint for a chain, honoring `CHAIN_RPC_URLS` overrides.
    pub fn rpc_url(&self, chain: Chain) -> &str {
        self.chain_rpc_urls
            .get(&chain)
            .map(String::as_str)
            .unwrap_or_else(|| chain.info().rpc_url)
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut chain_rpc_urls = HashMap::new();
        if let Some(raw) = non_empty("CHAIN_RPC_URLS") {
            let by_name: HashMap<String, String> = serde_json::from_str(&raw)
                .context("CHAIN_RPC_URLS must be a JSON map of chain name -> RPC URL")?;
            for (name, url) in by_name {
                let chain = Chain::parse(&name)
                    .ok_or_else(|| anyhow!("CHAIN_RPC_URLS: unsupported chain '{}'", name))?;
                chain_rpc_urls.insert(chain, url);
            }
        }

        let request_timeout = match non_empty("MEATMARKET_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .context("MEATMARKET_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            api_url: non_empty("MEATMARKET_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: non_empty("MEATMARKET_API_KEY"),
            agent_id: non_empty("MEATMARKET_AI_ID").or_else(|| non_empty("MEATMARKET_AGENT_ID")),
            data_dir: non_empty("MEATMARKET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            request_timeout,
            chain_rpc_urls,
            port: non_empty("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            http_mode: lookup("MCP_HTTP").is_some(),
        })
    }
}
