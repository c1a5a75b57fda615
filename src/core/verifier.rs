//! Access verification pipeline: validate -> oracle lookup -> decide.

use std::sync::Arc;
use tracing::info;

use super::address::validate_address;
use super::decision::{decide, normalize_balance};
use crate::models::errors::AppResult;
use crate::models::types::{AccessThreshold, AccessVerdict, BalanceQuery};
use crate::providers::BalanceOracle;

/// Runs one independent verification per call. Holds no per-request state.
#[derive(Clone)]
pub struct AccessVerifier {
    oracle: Arc<dyn BalanceOracle>,
    token_contract: String,
    threshold: AccessThreshold,
}

impl AccessVerifier {
    pub fn new(
        oracle: Arc<dyn BalanceOracle>,
        token_contract: impl Into<String>,
        threshold: AccessThreshold,
    ) -> Self {
        Self {
            oracle,
            token_contract: token_contract.into(),
            threshold,
        }
    }

    /// Verify access for an untrusted address string.
    ///
    /// Invalid input fails before the oracle is touched; otherwise exactly
    /// one oracle call is made.
    pub async fn verify(&self, address: &str) -> AppResult<AccessVerdict> {
        let holder = validate_address(address)?;

        let query = BalanceQuery {
            token_contract: self.token_contract.clone(),
            holder,
        };

        let raw = self.oracle.fetch_balance(&query).await?;

        let verdict = decide(raw, &self.threshold);
        info!(
            holder = %query.holder,
            balance = normalize_balance(raw),
            threshold = %self.threshold,
            granted = verdict.granted,
            "Access decided"
        );

        Ok(verdict)
    }
}
