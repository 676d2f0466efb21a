//! Client for the MeatMarket REST API.

pub mod client;

pub use client::{ApiError, ApiResponse, MarketplaceClient, ResponseBody};
