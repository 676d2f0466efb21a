#![recursion_limit = "256"]
// src/lib.rs

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::blockchain::{evm_client::ChainBackend, wallet_manager::WalletManager};
use crate::marketplace::{ApiError, MarketplaceClient};
use crate::mcp::session::Session;

pub mod api;
pub mod blockchain;
pub mod config;
pub mod marketplace;
pub mod mcp;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// REST client for the marketplace API
    pub marketplace: MarketplaceClient,
    /// Wallet operations on top of the chain backend
    pub wallet_manager: WalletManager,
    /// Credentials, wallet and settings. Held for the whole of each tool call.
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(
        config: config::Config,
        session: Session,
        backend: Arc<dyn ChainBackend>,
    ) -> Result<Self, ApiError> {
        let marketplace = MarketplaceClient::new(&config)?;
        Ok(Self {
            config,
            marketplace,
            wallet_manager: WalletManager::new(backend),
            session: Arc::new(Mutex::new(session)),
        })
    }
}
