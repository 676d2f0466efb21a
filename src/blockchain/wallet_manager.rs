//! Wallet manager for the single custodial hot wallet

use std::collections::BTreeMap;
use std::sync::Arc;

use ethers::{
    signers::LocalWallet,
    types::{Address, U256},
    utils::{format_units, parse_units, to_checksum},
};
use tracing::{error, info};
use zeroize::Zeroizing;

use crate::blockchain::{
    chains::{self, Chain, TOKENS},
    evm_client::ChainBackend,
    models::{AssetBalance, BalanceReport, EnsuredWallet, TransferReceipt, WalletError},
};
use crate::mcp::session::{Session, WalletKey};

/// Balance checks and stablecoin payments for the session's wallet.
#[derive(Clone)]
pub struct WalletManager {
    backend: Arc<dyn ChainBackend>,
}

impl WalletManager {
    pub fn new(backend: Arc<dyn ChainBackend>) -> Self {
        Self { backend }
    }

    /// Generates and persists a key pair if the session has none.
    pub fn ensure_wallet(&self, session: &mut Session) -> Result<EnsuredWallet, WalletError> {
        if let Some(wallet) = session.wallet() {
            return Ok(EnsuredWallet {
                created: false,
                address: wallet.address().to_string(),
            });
        }

        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let key_hex = Zeroizing::new(format!("0x{}", hex::encode(wallet.signer().to_bytes())));
        let key = WalletKey::from_private_key(&key_hex)?;
        let address = key.address().to_string();
        session.set_wallet(key);
        info!("Created wallet {}", address);

        Ok(EnsuredWallet {
            created: true,
            address,
        })
    }

    /// Native balance plus every configured stablecoin on the current chain.
    /// A failing asset is reported in place and does not hide the others.
    pub async fn balances(&self, session: &Session) -> Result<BalanceReport, WalletError> {
        let wallet = session.wallet().ok_or(WalletError::NoWallet)?;
        let owner = parse_address(wallet.address())?;
        let chain = session.chain();

        let native = match self.backend.native_balance(chain, owner).await {
            Ok(wei) => AssetBalance::Amount {
                balance: format_amount(wei, 18),
                decimals: 18,
            },
            Err(e) => AssetBalance::Failed {
                error: e.to_string(),
            },
        };

        let mut tokens = BTreeMap::new();
        for token in TOKENS.iter() {
            let line = match token.address_on(chain) {
                None => AssetBalance::not_available(),
                Some(contract) => self.token_line(chain, contract, owner).await,
            };
            tokens.insert(token.symbol.to_string(), line);
        }

        Ok(BalanceReport {
            address: wallet.address().to_string(),
            chain,
            native_symbol: chain.info().native_symbol,
            native,
            tokens,
        })
    }

    async fn token_line(&self, chain: Chain, contract: Address, owner: Address) -> AssetBalance {
        let decimals = match self.backend.token_decimals(chain, contract).await {
            Ok(d) => d,
            Err(e) => {
                return AssetBalance::Failed {
                    error: e.to_string(),
                }
            }
        };
        match self.backend.token_balance(chain, contract, owner).await {
            Ok(raw) => AssetBalance::Amount {
                balance: format_amount(raw, decimals),
                decimals,
            },
            Err(e) => AssetBalance::Failed {
                error: e.to_string(),
            },
        }
    }

    /// Sends `amount` (human units, e.g. "25.5") of `token` to `recipient` on the
    /// session's chain. Refuses before broadcasting if the balance is short.
    pub async fn transfer(
        &self,
        session: &Session,
        token_symbol: &str,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferReceipt, WalletError> {
        let wallet = session.wallet().ok_or(WalletError::NoWallet)?;
        let chain = session.chain();
        let token = chains::token(token_symbol).ok_or_else(|| WalletError::UnsupportedToken {
            token: token_symbol.to_string(),
            chain,
        })?;
        let contract = token
            .address_on(chain)
            .ok_or_else(|| WalletError::UnsupportedToken {
                token: token.symbol.to_string(),
                chain,
            })?;
        let to = parse_address(recipient)?;
        let owner = parse_address(wallet.address())?;

        let decimals = self.backend.token_decimals(chain, contract).await?;
        let required = parse_amount(amount, decimals)?;
        let balance = self.backend.token_balance(chain, contract, owner).await?;
        if balance < required {
            return Err(WalletError::InsufficientBalance {
                token: token.symbol.to_string(),
                balance: format_amount(balance, decimals),
                required: format_amount(required, decimals),
            });
        }

        let signer = wallet.signer()?;
        let tx_hash = self
            .backend
            .transfer_token(chain, signer, contract, to, required)
            .await
            .map_err(|e| {
                error!("Transfer of {} {} on {} failed: {}", amount, token.symbol, chain, e);
                e
            })?;
        let tx_hash = format!("{:?}", tx_hash);
        info!("Paid {} {} to {} on {}: {}", amount, token.symbol, recipient, chain, tx_hash);

        Ok(TransferReceipt {
            tx_link: chain.tx_link(&tx_hash),
            tx_hash,
            chain,
            token: token.symbol.to_string(),
            amount: format_amount(required, decimals),
            recipient: to_checksum(&to, None),
        })
    }
}

fn parse_address(input: &str) -> Result<Address, WalletError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|_| WalletError::InvalidAddress(input.to_string()))
}

/// Parses a human-unit amount into base units. Zero and negative amounts are rejected.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, WalletError> {
    let invalid = || WalletError::InvalidAmount(amount.to_string());
    let trimmed = amount.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(invalid());
    }
    let value: U256 = parse_units(trimmed, u32::from(decimals))
        .map_err(|_| invalid())?
        .into();
    if value.is_zero() {
        return Err(invalid());
    }
    Ok(value)
}

/// Formats base units as a human-unit decimal string without trailing zeros.
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let formatted = format_units(raw, u32::from(decimals)).unwrap_or_else(|_| raw.to_string());
    if formatted.contains('.') {
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
        trimmed.to_string()
    } else {
        formatted
    }
}
