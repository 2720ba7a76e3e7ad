//! Chain access seam for the deployment procedure.
//!
//! The deployer talks to the chain through [`ChainClient`], so the
//! orchestration logic can be exercised against a scripted implementation
//! without a node. [`HttpChainClient`] is the real one: it fills in nonce,
//! gas price and gas limit from the node, signs locally, and submits raw
//! transactions.

use alloy_core::primitives::{Address, B256, Bytes, U256};
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::rpc::{RpcClient, TransactionReceipt};
use crate::tx::LegacyTransaction;

/// Record of one confirmed contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub name: String,
    pub address: Address,
    pub tx_hash: B256,
    /// The account that sent the deployment transaction. Both contracts set
    /// their owner to the deployer in their constructors.
    pub deployer: Address,
    pub chain_id: u64,
}

#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// The account transactions are sent from.
    fn sender(&self) -> Address;

    async fn chain_id(&self) -> Result<u64>;

    /// Submit a contract-creation transaction and wait for it to confirm.
    async fn deploy(&self, name: &str, data: Bytes) -> Result<DeployedContract>;

    /// Submit a call transaction to a deployed contract and wait for it to
    /// confirm.
    async fn transact(&self, to: Address, data: Bytes) -> Result<B256>;
}

/// [`ChainClient`] over JSON-RPC with local signing.
pub struct HttpChainClient {
    rpc: RpcClient,
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl HttpChainClient {
    /// Connect to the endpoint and cache its chain ID, which doubles as a
    /// reachability check before any transaction is built.
    pub async fn connect(url: Url, signer: PrivateKeySigner) -> Result<Self> {
        let rpc = RpcClient::new(url)?;
        let chain_id = rpc
            .chain_id()
            .await
            .context("Failed to query the chain ID (is the RPC endpoint reachable?)")?;
        tracing::debug!(chain_id, sender = %signer.address(), "Connected to RPC endpoint");
        Ok(Self {
            rpc,
            signer,
            chain_id,
        })
    }

    async fn send_transaction(
        &self,
        to: Option<Address>,
        data: &Bytes,
    ) -> Result<(B256, TransactionReceipt)> {
        let sender = self.signer.address();
        let nonce = self.rpc.transaction_count(sender).await?;
        let gas_price = self.rpc.gas_price().await?;

        let mut call = json!({
            "from": sender,
            "data": format!("0x{}", hex::encode(data)),
            "value": "0x0",
        });
        if let Some(to) = to {
            call["to"] = json!(to);
        }
        let gas_limit = self
            .rpc
            .estimate_gas(&call)
            .await
            .context("Failed to estimate gas")?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value: U256::ZERO,
            data: data.to_vec(),
            chain_id: self.chain_id,
        };
        let raw = tx.sign(&self.signer)?;
        let hash = self
            .rpc
            .send_raw_transaction(&format!("0x{}", hex::encode(raw)))
            .await?;
        tracing::debug!(%hash, nonce, gas_limit, "Transaction submitted");

        let receipt = self.rpc.wait_for_receipt(hash).await?;
        Ok((hash, receipt))
    }
}

impl ChainClient for HttpChainClient {
    fn sender(&self) -> Address {
        self.signer.address()
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn deploy(&self, name: &str, data: Bytes) -> Result<DeployedContract> {
        tracing::info!(contract = %name, "Submitting deployment transaction...");
        let (tx_hash, receipt) = self
            .send_transaction(None, &data)
            .await
            .with_context(|| format!("Failed to deploy {name}"))?;
        let address = receipt
            .contract_address
            .with_context(|| format!("No contract address in the {name} receipt"))?;

        Ok(DeployedContract {
            name: name.to_string(),
            address,
            tx_hash,
            deployer: self.signer.address(),
            chain_id: self.chain_id,
        })
    }

    async fn transact(&self, to: Address, data: Bytes) -> Result<B256> {
        tracing::info!(%to, "Submitting call transaction...");
        let (tx_hash, _receipt) = self.send_transaction(Some(to), &data).await?;
        Ok(tx_hash)
    }
}
