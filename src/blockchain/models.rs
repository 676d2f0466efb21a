// src/blockchain/models.rs
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::chains::Chain;

// --- Error types for wallet operations ---

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("no wallet configured")]
    NoWallet,
    #[error("{token} is not available on {chain}")]
    UnsupportedToken { token: String, chain: Chain },
    #[error("insufficient {token} balance: have {balance}, need {required}")]
    InsufficientBalance {
        token: String,
        balance: String,
        required: String,
    },
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("transaction failed: {0}")]
    Broadcast(String),
    #[error("transaction {0} reverted")]
    Reverted(String),
    /// The transfer left the wallet but its outcome is unknown.
    #[error("transaction {tx_hash} was broadcast but not confirmed: {reason}")]
    Unconfirmed { tx_hash: String, reason: String },
}

impl WalletError {
    /// True when a node error message points at a missing gas asset.
    pub fn is_gas_shortfall(&self) -> bool {
        match self {
            WalletError::Broadcast(msg) | WalletError::Rpc(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("insufficient funds") || msg.contains("gas required exceeds")
            }
            _ => false,
        }
    }
}

// --- Wallet Models ---

/// Result of making sure the single wallet exists.
#[derive(Debug, Clone, Serialize)]
pub struct EnsuredWallet {
    pub created: bool,
    pub address: String,
}

/// One asset line in a balance report. Either a balance or a per-asset error.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AssetBalance {
    Amount { balance: String, decimals: u8 },
    NotAvailable { status: &'static str },
    Failed { error: String },
}

impl AssetBalance {
    pub fn not_available() -> Self {
        AssetBalance::NotAvailable {
            status: "not available",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub address: String,
    pub chain: Chain,
    pub native_symbol: &'static str,
    pub native: AssetBalance,
    pub tokens: BTreeMap<String, AssetBalance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub tx_link: String,
    pub chain: Chain,
    pub token: String,
    pub amount: String,
    pub recipient: String,
}

/// Remediation text attached to wallet failures.
pub fn remediation(err: &WalletError, chain: Chain, address: Option<&str>) -> Value {
    let wallet = address.unwrap_or("(none)");
    let advice = match err {
        WalletError::NoWallet => {
            "Call wallet_balance to create the wallet, fund it, then retry. Or pay manually and call mark_payment_sent.".to_string()
        }
        WalletError::UnsupportedToken { .. } => format!(
            "Switch chains with set_chain or pick a token deployed on {}.",
            chain
        ),
        WalletError::Unconfirmed { tx_hash, .. } => format!(
            "The payment was broadcast and may still settle. Check {} before doing anything else. If it succeeded, call mark_payment_sent with that link. Do not send the payment again unless the explorer shows it failed.",
            chain.tx_link(tx_hash)
        ),
        WalletError::Broadcast(_) if !err.is_gas_shortfall() => format!(
            "The node rejected or did not answer the transfer. Check {}/address/{} for a pending payment before paying manually and calling mark_payment_sent.",
            chain.info().explorer_url,
            wallet
        ),
        WalletError::InsufficientBalance { token, .. } => format!(
            "Fund wallet {} with {} on {}, or pay manually and call mark_payment_sent.",
            wallet, token, chain
        ),
        e if e.is_gas_shortfall() => format!(
            "The wallet has no {} on {} to pay gas. Send a small amount of {} to {}, or pay manually and call mark_payment_sent.",
            chain.info().native_symbol,
            chain,
            chain.info().native_symbol,
            wallet
        ),
        _ => "Check the wallet and chain settings, or pay manually and call mark_payment_sent.".to_string(),
    };
    json!({ "advice": advice, "wallet": address, "chain": chain })
}
