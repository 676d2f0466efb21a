//! Shared fixtures: a recording chain backend and state wired to a temp dir.
#![allow(dead_code)]

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use ethers::{
    signers::LocalWallet,
    types::{Address, H256, U256},
};
use serde_json::{json, Value};
use tempfile::TempDir;

use meatmarket_mcp::{
    blockchain::{
        chains::Chain,
        evm_client::ChainBackend,
        models::WalletError,
    },
    config::Config,
    mcp::{handler::handle_mcp_request, protocol::Request, session::Session},
    AppState,
};

/// Nothing listens here, so any attempted request fails fast.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9/api/v1";

pub const RECIPIENT: &str = "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransfer {
    pub chain: Chain,
    pub token: Address,
    pub to: Address,
    pub amount: U256,
}

/// Chain backend with fixed balances that records every transfer it is asked to send.
pub struct StubChain {
    pub native: U256,
    pub token_balance: U256,
    pub decimals: u8,
    pub broadcast_error: Option<String>,
    /// Broadcast succeeds but the receipt never arrives.
    pub unconfirmed: bool,
    pub native_error: Option<String>,
    pub token_error: Option<String>,
    pub transfers: StdMutex<Vec<RecordedTransfer>>,
}

impl StubChain {
    pub fn with_token_balance(raw: u64) -> Self {
        Self {
            native: U256::exp10(16),
            token_balance: U256::from(raw),
            decimals: 6,
            broadcast_error: None,
            unconfirmed: false,
            native_error: None,
            token_error: None,
            transfers: StdMutex::new(Vec::new()),
        }
    }

    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainBackend for StubChain {
    async fn native_balance(&self, _chain: Chain, _owner: Address) -> Result<U256, WalletError> {
        match &self.native_error {
            Some(msg) => Err(WalletError::Rpc(msg.clone())),
            None => Ok(self.native),
        }
    }

    async fn token_balance(
        &self,
        _chain: Chain,
        _token: Address,
        _owner: Address,
    ) -> Result<U256, WalletError> {
        match &self.token_error {
            Some(msg) => Err(WalletError::Rpc(msg.clone())),
            None => Ok(self.token_balance),
        }
    }

    async fn token_decimals(&self, _chain: Chain, _token: Address) -> Result<u8, WalletError> {
        Ok(self.decimals)
    }

    async fn transfer_token(
        &self,
        chain: Chain,
        _signer: LocalWallet,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<H256, WalletError> {
        self.transfers.lock().unwrap().push(RecordedTransfer {
            chain,
            token,
            to,
            amount,
        });
        let tx_hash = H256::repeat_byte(0xab);
        if self.unconfirmed {
            return Err(WalletError::Unconfirmed {
                tx_hash: format!("{:?}", tx_hash),
                reason: "not confirmed within 30s".into(),
            });
        }
        match &self.broadcast_error {
            Some(msg) => Err(WalletError::Broadcast(msg.clone())),
            None => Ok(tx_hash),
        }
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub state: AppState,
    pub chain: Arc<StubChain>,
}

impl Harness {
    pub fn new(api_url: &str, api_key: Option<&str>) -> Self {
        Self::with_chain(api_url, api_key, StubChain::with_token_balance(0))
    }

    pub fn with_chain(api_url: &str, api_key: Option<&str>, chain: StubChain) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_url: api_url.to_string(),
            api_key: api_key.map(str::to_string),
            agent_id: api_key.map(|_| "agent-1".to_string()),
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let session = Session::load(&config);
        let chain = Arc::new(chain);
        let state = AppState::new(config, session, chain.clone()).unwrap();
        Self { dir, state, chain }
    }

    pub fn state_file(&self) -> Value {
        let raw = std::fs::read_to_string(self.state.config.state_path()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Sends one JSON-RPC request and returns the serialized response.
    pub async fn rpc(&self, request: Value) -> Option<Value> {
        let req: Request = serde_json::from_value(request).unwrap();
        handle_mcp_request(req, self.state.clone())
            .await
            .map(|r| serde_json::to_value(r).unwrap())
    }

    /// Calls a tool and returns `(text, isError)`.
    pub async fn call(&self, name: &str, arguments: Value) -> (String, bool) {
        let resp = self
            .rpc(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": name, "arguments": arguments}
            }))
            .await
            .unwrap();
        let result = &resp["result"];
        assert!(result.is_object(), "expected a tool result, got {}", resp);
        (
            result["content"][0]["text"].as_str().unwrap().to_string(),
            result["isError"].as_bool().unwrap(),
        )
    }

    /// Like `call`, for tools whose text is JSON.
    pub async fn call_json(&self, name: &str, arguments: Value) -> (Value, bool) {
        let (text, is_error) = self.call(name, arguments).await;
        (serde_json::from_str(&text).unwrap(), is_error)
    }
}
