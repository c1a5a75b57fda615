//! Providers Module - External Data Sources
//!
//! The balance oracle is the only external collaborator. Anything that can
//! answer "how many smallest units of token X does holder Y own" plugs in
//! behind [`BalanceOracle`] (a cache or a secondary indexer, for instance).

pub mod bscscan;

use alloy_primitives::U256;
use async_trait::async_trait;

use crate::models::errors::AppResult;
use crate::models::types::BalanceQuery;

pub use bscscan::*;

/// Smallest-unit balance lookup
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// One lookup, no retry. Errors carry an `Oracle*` error code.
    async fn fetch_balance(&self, query: &BalanceQuery) -> AppResult<U256>;
}
