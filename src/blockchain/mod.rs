pub mod chains;
pub mod evm_client;
pub mod models;
pub mod wallet_manager;
