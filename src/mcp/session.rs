//! Process-wide session state.
//!
//! Built once at startup from the persisted document plus environment
//! overrides, then handed by reference to every tool call. Every mutator
//! rewrites the state file.

use std::str::FromStr;

use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::blockchain::{chains::Chain, models::WalletError};
use crate::config::Config;
use crate::mcp::credentials::{StateDocument, StateStore};

/// The custodial wallet key. The key never leaves this type unredacted
/// except when writing the state file or building a signer.
#[derive(Clone)]
pub struct WalletKey {
    private_key: SecretString,
    address: String,
}

impl WalletKey {
    pub fn from_private_key(private_key: &str) -> Result<Self, WalletError> {
        let wallet = LocalWallet::from_str(private_key.trim())
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self {
            private_key: SecretString::new(private_key.trim().to_string()),
            address: to_checksum(&wallet.address(), None),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn signer(&self) -> Result<LocalWallet, WalletError> {
        LocalWallet::from_str(self.private_key.expose_secret())
            .map_err(|e| WalletError::InvalidKey(e.to_string()))
    }
}

impl std::fmt::Debug for WalletKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Session {
    store: StateStore,
    // Values read from or destined for the state file.
    api_key: Option<String>,
    agent_id: Option<String>,
    // Environment values. They win over stored ones and are never persisted.
    api_key_override: Option<String>,
    agent_id_override: Option<String>,
    wallet: Option<WalletKey>,
    chain: Chain,
    auto_pay: bool,
    auto_accept_candidates: bool,
}

impl Session {
    /// Loads the state file named by `config` and layers the env overrides on top.
    pub fn load(config: &Config) -> Self {
        let store = StateStore::new(config.state_path());
        let doc = store.load();
        let mut session = Self::from_document(store, doc);
        session.api_key_override = config.api_key.clone();
        session.agent_id_override = config.agent_id.clone();
        session
    }

    pub fn from_document(store: StateStore, doc: StateDocument) -> Self {
        let wallet = doc.wallet_private_key.as_deref().and_then(|key| {
            WalletKey::from_private_key(key)
                .map_err(|e| tracing::warn!("Ignoring stored wallet key: {}", e))
                .ok()
        });
        if let (Some(w), Some(stored)) = (&wallet, &doc.wallet_address) {
            if !stored.eq_ignore_ascii_case(w.address()) {
                tracing::warn!(
                    "Stored wallet address {} does not match key; using {}",
                    stored,
                    w.address()
                );
            }
        }
        Self {
            store,
            api_key: doc.api_key,
            agent_id: doc.agent_id,
            api_key_override: None,
            agent_id_override: None,
            wallet,
            chain: doc.chain,
            auto_pay: doc.auto_pay,
            auto_accept_candidates: doc.auto_accept_candidates,
        }
    }

    /// The document that a save would write.
    pub fn to_document(&self) -> StateDocument {
        StateDocument {
            api_key: self.api_key.clone(),
            agent_id: self.agent_id.clone(),
            wallet_private_key: self
                .wallet
                .as_ref()
                .map(|w| w.private_key.expose_secret().clone()),
            wallet_address: self.wallet.as_ref().map(|w| w.address.clone()),
            chain: self.chain,
            auto_pay: self.auto_pay,
            auto_accept_candidates: self.auto_accept_candidates,
        }
    }

    /// Writes the full document. Failures are logged and the in-memory state is kept.
    pub fn persist(&self) -> bool {
        self.store.save(&self.to_document())
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key_override
            .as_deref()
            .or(self.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id_override
            .as_deref()
            .or(self.agent_id.as_deref())
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key().is_some()
    }

    /// Replaces the credentials after a successful registration, including any env override.
    pub fn set_credentials(&mut self, api_key: String, agent_id: String) {
        self.api_key = Some(api_key);
        self.agent_id = Some(agent_id);
        self.api_key_override = None;
        self.agent_id_override = None;
        info!("Saved marketplace credentials to {}", self.store.path().display());
        self.persist();
    }

    pub fn wallet(&self) -> Option<&WalletKey> {
        self.wallet.as_ref()
    }

    pub fn set_wallet(&mut self, wallet: WalletKey) {
        self.wallet = Some(wallet);
        self.persist();
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn set_chain(&mut self, chain: Chain) {
        self.chain = chain;
        self.persist();
    }

    pub fn auto_pay(&self) -> bool {
        self.auto_pay
    }

    pub fn set_auto_pay(&mut self, enabled: bool) {
        self.auto_pay = enabled;
        self.persist();
    }

    pub fn auto_accept_candidates(&self) -> bool {
        self.auto_accept_candidates
    }

    pub fn set_auto_accept_candidates(&mut self, enabled: bool) {
        self.auto_accept_candidates = enabled;
        self.persist();
    }
}
