//! BscScan API Client - token balance oracle
//!
//! API: `GET {base}?module=account&action=tokenbalance&contractaddress=..&address=..&tag=latest&apikey=..`
//!
//! Response: `{"status":"1","message":"OK","result":"<smallest-unit balance>"}`.
//! Any Etherscan-family explorer speaking the same dialect works via
//! `ORACLE_BASE_URL`.
//!
//! One outbound call per lookup: no cache, no retry.

use alloy_primitives::U256;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use super::BalanceOracle;
use crate::models::config::OracleConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::BalanceQuery;
use crate::utils::constants::{
    ORACLE_ACTION, ORACLE_MODULE, ORACLE_STATUS_OK, ORACLE_TAG, USER_AGENT as USER_AGENT_CONST,
};

/// Raw explorer response
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// Balance string on success, error detail (or anything) otherwise
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ExplorerResponse {
    /// Interpret the payload: status flag first, then the numeric result
    pub fn into_balance(self) -> AppResult<U256> {
        if self.status != ORACLE_STATUS_OK {
            let detail = match &self.result {
                serde_json::Value::String(s) if !s.is_empty() => format!(" ({})", s),
                _ => String::new(),
            };
            let message = if self.message.is_empty() {
                "API error".to_string()
            } else {
                self.message
            };
            return Err(AppError::oracle_rejected(format!("{}{}", message, detail)));
        }

        let raw = self
            .result
            .as_str()
            .ok_or_else(|| AppError::oracle_malformed(format!("result is not a string: {}", self.result)))?;

        parse_smallest_units(raw)
    }
}

/// Parse a non-negative base-10 integer string into U256
pub fn parse_smallest_units(raw: &str) -> AppResult<U256> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::oracle_malformed(format!("non-numeric balance: {:?}", raw)));
    }
    U256::from_str_radix(raw, 10)
        .map_err(|_| AppError::oracle_malformed(format!("balance out of range: {}", raw)))
}

/// BscScan-compatible balance oracle
#[derive(Clone)]
pub struct BscScanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BscScanClient {
    /// Build the HTTP client with the configured deadline
    pub fn new(config: &OracleConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::with_source(ErrorCode::Internal, "HTTP client build failed", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl BalanceOracle for BscScanClient {
    async fn fetch_balance(&self, query: &BalanceQuery) -> AppResult<U256> {
        debug!(
            holder = %query.holder,
            contract = %query.token_contract,
            "Oracle: fetching token balance"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("module", ORACLE_MODULE),
                ("action", ORACLE_ACTION),
                ("contractaddress", query.token_contract.as_str()),
                ("address", query.holder.as_str()),
                ("tag", ORACLE_TAG),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::oracle_unavailable(format!("API request failed: HTTP {}", status)));
        }

        let body = response.text().await?;
        let parsed: ExplorerResponse = serde_json::from_str(&body)?;
        parsed.into_balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(v: serde_json::Value) -> ExplorerResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_success_payload() {
        let r = response(json!({"status": "1", "message": "OK", "result": "5000000000000000000"}));
        assert_eq!(r.into_balance().unwrap(), U256::from(5_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_zero_balance() {
        let r = response(json!({"status": "1", "message": "OK", "result": "0"}));
        assert_eq!(r.into_balance().unwrap(), U256::ZERO);
    }

    #[test]
    fn test_balance_beyond_u128() {
        let big = "340282366920938463463374607431768211456"; // 2^128
        let r = response(json!({"status": "1", "message": "OK", "result": big}));
        assert_eq!(r.into_balance().unwrap(), U256::from(1u64) << 128usize);
    }

    #[test]
    fn test_rejected_carries_message() {
        let r = response(json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}));
        let err = r.into_balance().unwrap_err();
        assert_eq!(err.code, ErrorCode::OracleRejected);
        assert_eq!(err.message, "NOTOK (Invalid API Key)");
    }

    #[test]
    fn test_rejected_without_message() {
        let r = response(json!({"status": "0"}));
        let err = r.into_balance().unwrap_err();
        assert_eq!(err.code, ErrorCode::OracleRejected);
        assert_eq!(err.message, "API error");
    }

    #[test]
    fn test_malformed_results() {
        for result in [json!("12.5"), json!("-1"), json!(""), json!("0x10"), json!(42), json!(null)] {
            let r = response(json!({"status": "1", "message": "OK", "result": result.clone()}));
            let err = r.into_balance().unwrap_err();
            assert_eq!(err.code, ErrorCode::OracleMalformedResponse, "{}", result);
        }
    }

    #[test]
    fn test_overflowing_balance_is_malformed() {
        let r = response(json!({"status": "1", "message": "OK", "result": "9".repeat(90)}));
        assert_eq!(r.into_balance().unwrap_err().code, ErrorCode::OracleMalformedResponse);
    }
}
