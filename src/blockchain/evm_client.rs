// src/blockchain/evm_client.rs

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    contract::abigen,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256, U256, U64},
};

use crate::blockchain::{chains::Chain, models::WalletError};
use crate::config::Config;

abigen!(
    Erc20,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function decimals() external view returns (uint8)
        function transfer(address to, uint256 amount) external returns (bool)
    ]"#
);

/// Chain access used by the wallet manager. Swappable so tests can record calls.
#[async_trait]
pub trait ChainBackend: Send + Sync {
    async fn native_balance(&self, chain: Chain, owner: Address) -> Result<U256, WalletError>;

    async fn token_balance(
        &self,
        chain: Chain,
        token: Address,
        owner: Address,
    ) -> Result<U256, WalletError>;

    async fn token_decimals(&self, chain: Chain, token: Address) -> Result<u8, WalletError>;

    /// Sends an ERC-20 transfer and waits for it to be mined. Returns the tx hash.
    async fn transfer_token(
        &self,
        chain: Chain,
        signer: LocalWallet,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<H256, WalletError>;
}

/// Client for the supported EVM chains, one HTTP provider per chain.
#[derive(Clone)]
pub struct EvmClient {
    providers: HashMap<Chain, Arc<Provider<Http>>>,
    timeout: Duration,
}

impl EvmClient {
    /// Create a provider per supported chain, using configured RPC URLs.
    pub fn new(config: &Config) -> Self {
        let mut providers = HashMap::new();

        for chain in Chain::ALL {
            let url = config.rpc_url(chain);
            match Provider::<Http>::try_from(url) {
                Ok(provider) => {
                    let provider = provider.interval(Duration::from_secs(2));
                    providers.insert(chain, Arc::new(provider));
                }
                Err(e) => {
                    tracing::warn!("Failed to create provider for chain {} at {}: {}", chain, url, e);
                }
            }
        }

        Self {
            providers,
            timeout: config.request_timeout,
        }
    }

    /// Bounds a chain call by the configured request timeout.
    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, WalletError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| WalletError::Rpc(format!("{} timed out after {:?}", what, self.timeout)))?
    }

    /// Get a provider for the specified chain
    fn get_provider(&self, chain: Chain) -> Result<Arc<Provider<Http>>, WalletError> {
        self.providers
            .get(&chain)
            .cloned()
            .ok_or_else(|| WalletError::Rpc(format!("No provider available for chain: {}", chain)))
    }
}

#[async_trait]
impl ChainBackend for EvmClient {
    async fn native_balance(&self, chain: Chain, owner: Address) -> Result<U256, WalletError> {
        let provider = self.get_provider(chain)?;
        self.bounded("eth_getBalance", async {
            provider
                .get_balance(owner, None)
                .await
                .map_err(|e| WalletError::Rpc(e.to_string()))
        })
        .await
    }

    async fn token_balance(
        &self,
        chain: Chain,
        token: Address,
        owner: Address,
    ) -> Result<U256, WalletError> {
        let contract = Erc20::new(token, self.get_provider(chain)?);
        self.bounded("balanceOf", async {
            contract
                .balance_of(owner)
                .call()
                .await
                .map_err(|e| WalletError::Rpc(e.to_string()))
        })
        .await
    }

    async fn token_decimals(&self, chain: Chain, token: Address) -> Result<u8, WalletError> {
        let contract = Erc20::new(token, self.get_provider(chain)?);
        self.bounded("decimals", async {
            contract
                .decimals()
                .call()
                .await
                .map_err(|e| WalletError::Rpc(e.to_string()))
        })
        .await
    }

    async fn transfer_token(
        &self,
        chain: Chain,
        signer: LocalWallet,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<H256, WalletError> {
        let provider = self.get_provider(chain)?;
        let signer = signer.with_chain_id(chain.info().chain_id);
        let client = Arc::new(SignerMiddleware::new(provider.as_ref().clone(), signer));
        let contract = Erc20::new(token, client);

        let call = contract.transfer(to, amount);
        // A send that times out may still have reached the mempool.
        let pending = tokio::time::timeout(self.timeout, call.send())
            .await
            .map_err(|_| {
                WalletError::Broadcast(format!(
                    "no answer from the node within {:?}; the transfer may have been broadcast",
                    self.timeout
                ))
            })?
            .map_err(|e| WalletError::Broadcast(e.to_string()))?;
        let tx_hash = *pending;
        tracing::info!("Submitted transfer {:?} on {}", tx_hash, chain);

        // From here on the funds may be moving: every failure carries the hash.
        let unconfirmed = |reason: String| WalletError::Unconfirmed {
            tx_hash: format!("{:?}", tx_hash),
            reason,
        };
        let receipt = match tokio::time::timeout(self.timeout, pending).await {
            Ok(Ok(Some(receipt))) => receipt,
            Ok(Ok(None)) => return Err(unconfirmed("dropped from the mempool".into())),
            Ok(Err(e)) => return Err(unconfirmed(e.to_string())),
            Err(_) => {
                return Err(unconfirmed(format!(
                    "not confirmed within {:?}",
                    self.timeout
                )))
            }
        };
        if receipt.status == Some(U64::zero()) {
            return Err(WalletError::Reverted(format!("{:?}", tx_hash)));
        }
        Ok(tx_hash)
    }
}
