//! Static chain and stablecoin tables.
//!
//! The tables are consulted at call time; the only runtime choice is which
//! chain is selected in the session.

use std::fmt;

use ethers::types::Address;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Chains the custodial wallet can pay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    #[default]
    Base,
    Optimism,
    Arbitrum,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub native_symbol: &'static str,
}

/// A stablecoin and its contract address per chain. `None` means not deployed there.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub symbol: &'static str,
    addresses: [(Chain, Option<Address>); 4],
}

impl TokenInfo {
    pub fn address_on(&self, chain: Chain) -> Option<Address> {
        self.addresses
            .iter()
            .find(|(c, _)| *c == chain)
            .and_then(|(_, addr)| *addr)
    }
}

fn addr(s: &str) -> Option<Address> {
    s.parse().ok()
}

lazy_static! {
    /// Supported stablecoins, in reporting order.
    pub static ref TOKENS: Vec<TokenInfo> = vec![
        TokenInfo {
            symbol: "USDC",
            addresses: [
                (Chain::Ethereum, addr("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
                (Chain::Base, addr("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")),
                (Chain::Optimism, addr("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85")),
                (Chain::Arbitrum, addr("0xaf88d065e77c8cC2239327C5EDb3A432268e5831")),
            ],
        },
        TokenInfo {
            symbol: "USDT",
            addresses: [
                (Chain::Ethereum, addr("0xdAC17F958D2ee523a2206206994597C13D831ec7")),
                (Chain::Base, None),
                (Chain::Optimism, addr("0x94b008aA00579c1307B0EF2c499aD98a8ce58e58")),
                (Chain::Arbitrum, addr("0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9")),
            ],
        },
    ];
}

impl Chain {
    pub const ALL: [Chain; 4] = [Chain::Ethereum, Chain::Base, Chain::Optimism, Chain::Arbitrum];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Base => "base",
            Chain::Optimism => "optimism",
            Chain::Arbitrum => "arbitrum",
        }
    }

    /// Case-insensitive lookup by name. Also accepts the numeric chain id.
    pub fn parse(input: &str) -> Option<Chain> {
        let s = input.trim().to_lowercase();
        Chain::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.info().chain_id.to_string() == s)
    }

    pub fn supported_names() -> Vec<&'static str> {
        Chain::ALL.iter().map(Chain::as_str).collect()
    }

    pub fn info(&self) -> ChainInfo {
        match self {
            Chain::Ethereum => ChainInfo {
                chain_id: 1,
                rpc_url: "https://eth.llamarpc.com",
                explorer_url: "https://etherscan.io",
                native_symbol: "ETH",
            },
            Chain::Base => ChainInfo {
                chain_id: 8453,
                rpc_url: "https://mainnet.base.org",
                explorer_url: "https://basescan.org",
                native_symbol: "ETH",
            },
            Chain::Optimism => ChainInfo {
                chain_id: 10,
                rpc_url: "https://mainnet.optimism.io",
                explorer_url: "https://optimistic.etherscan.io",
                native_symbol: "ETH",
            },
            Chain::Arbitrum => ChainInfo {
                chain_id: 42161,
                rpc_url: "https://arb1.arbitrum.io/rpc",
                explorer_url: "https://arbiscan.io",
                native_symbol: "ETH",
            },
        }
    }

    /// Human-facing explorer link for a transaction hash.
    pub fn tx_link(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.info().explorer_url, tx_hash)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up a stablecoin by symbol, case-insensitively.
pub fn token(symbol: &str) -> Option<&'static TokenInfo> {
    let wanted = symbol.trim().to_uppercase();
    TOKENS.iter().find(|t| t.symbol == wanted)
}
