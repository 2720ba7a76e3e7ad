//! JSON-RPC plumbing for talking to an Ethereum node.

use std::time::{Duration, Instant};

use alloy_core::primitives::{Address, B256, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(180);

/// The slice of an `eth_getTransactionReceipt` response the deployment needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub from: Address,
    /// Populated for contract-creation transactions.
    pub contract_address: Option<Address>,
    #[serde(deserialize_with = "deserialize_hex_u64")]
    pub block_number: u64,
    /// Post-Byzantium execution status, `0x1` on success.
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        match &self.status {
            Some(status) => parse_hex_u64(status).map(|s| s == 1).unwrap_or(false),
            // Pre-Byzantium nodes omit the field; treat a mined receipt as success.
            None => true,
        }
    }
}

/// Thin JSON-RPC client over HTTP.
pub struct RpcClient {
    client: reqwest::Client,
    url: url::Url,
}

impl RpcClient {
    pub fn new(url: url::Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self { client, url })
    }

    /// Perform a single JSON-RPC call and deserialize its `result` field.
    pub async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .context(format!("Failed to send {method} request"))?;
        let body: Value = response
            .json()
            .await
            .context(format!("Failed to parse {method} response body"))?;

        if let Some(error) = body.get("error") {
            anyhow::bail!("RPC error from {method}: {error}");
        }
        let result = body
            .get("result")
            .context(format!("No result in {method} response"))?;
        serde_json::from_value(result.clone())
            .context(format!("Unexpected result shape from {method}"))
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.call("eth_chainId", vec![]).await?;
        parse_hex_u64(&hex)
    }

    /// Nonce of the account, including pending transactions.
    pub async fn transaction_count(&self, address: Address) -> Result<u64> {
        let hex: String = self
            .call(
                "eth_getTransactionCount",
                vec![json!(address), json!("pending")],
            )
            .await?;
        parse_hex_u64(&hex)
    }

    pub async fn gas_price(&self) -> Result<U256> {
        let hex: String = self.call("eth_gasPrice", vec![]).await?;
        parse_hex_u256(&hex)
    }

    pub async fn estimate_gas(&self, tx: &Value) -> Result<u64> {
        let hex: String = self.call("eth_estimateGas", vec![tx.clone()]).await?;
        parse_hex_u64(&hex)
    }

    /// Submit a signed raw transaction (`0x`-prefixed hex).
    pub async fn send_raw_transaction(&self, raw: &str) -> Result<B256> {
        self.call("eth_sendRawTransaction", vec![json!(raw)]).await
    }

    pub async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        self.call("eth_getTransactionReceipt", vec![json!(hash)])
            .await
    }

    /// Poll until the transaction is mined, then check its execution status.
    ///
    /// A receipt with status 0 means the transaction reverted on chain; that
    /// is a hard error, not something to retry.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt> {
        let start = Instant::now();
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                if !receipt.is_success() {
                    anyhow::bail!(
                        "Transaction {hash} reverted in block {}",
                        receipt.block_number
                    );
                }
                tracing::debug!(%hash, block = receipt.block_number, "Transaction mined");
                return Ok(receipt);
            }

            if start.elapsed() > RECEIPT_TIMEOUT {
                anyhow::bail!(
                    "Timed out after {}s waiting for transaction {hash} to be mined",
                    RECEIPT_TIMEOUT.as_secs()
                );
            }
            tracing::debug!(%hash, "Transaction pending, retrying...");
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(hex: &str) -> Result<u64> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .context(format!("Invalid hex quantity: {hex}"))
}

pub fn parse_hex_u256(hex: &str) -> Result<U256> {
    U256::from_str_radix(hex.trim_start_matches("0x"), 16)
        .context(format!("Invalid hex quantity: {hex}"))
}

fn deserialize_hex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let hex = String::deserialize(deserializer)?;
    parse_hex_u64(&hex).map_err(serde::de::Error::custom)
}
