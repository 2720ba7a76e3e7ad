//! Deployment orchestrator.
//!
//! One run does the whole job: compile the contracts, deploy the collectible,
//! deploy the factory with the same constructor argument, point the factory
//! at the collectible, and persist a report. Every step depends on the one
//! before it, so the first failure aborts the run.

use alloy_core::dyn_abi::DynSolValue;
use alloy_core::primitives::{Address, B256, Bytes, keccak256};
use anyhow::{Context, Result};

use crate::artifacts::ArtifactStore;
use crate::chain::{ChainClient, DeployedContract};
use crate::config::DeployConfig;
use crate::report::{DeploymentReport, REPORT_FILENAME};
use crate::solc;

/// The NFT contract, deployed first.
pub const COLLECTIBLE_CONTRACT: &str = "GoCollectible";
/// The minting factory, deployed second and then pointed at the NFT.
pub const FACTORY_CONTRACT: &str = "GoFactory";

/// Everything a caller needs to know about a finished run.
#[derive(Debug, Clone)]
pub struct DeploymentSummary {
    pub collectible: DeployedContract,
    pub factory: DeployedContract,
    pub set_nft_tx: B256,
}

pub struct Deployer {
    config: DeployConfig,
}

impl Deployer {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Compile the contracts and run the full deployment sequence.
    pub async fn deploy<C: ChainClient>(&self, client: &C) -> Result<DeploymentSummary> {
        let output = solc::compile(&self.config.solc, &self.config.contracts_dir).await?;
        let store = ArtifactStore::from_output(output)?;
        self.deploy_contracts(&store, client).await
    }

    /// Deploy both contracts from already-compiled artifacts and wire the
    /// factory to the collectible.
    pub async fn deploy_contracts<C: ChainClient>(
        &self,
        store: &ArtifactStore,
        client: &C,
    ) -> Result<DeploymentSummary> {
        // Resolve both artifacts up front: a missing contract should abort
        // before anything reaches the chain.
        let collectible_artifact = store.factory(COLLECTIBLE_CONTRACT)?;
        let factory_artifact = store.factory(FACTORY_CONTRACT)?;
        let constructor_args = [DynSolValue::Address(self.config.proxy_registry_address)];

        let chain_id = client.chain_id().await?;
        tracing::info!(
            chain_id,
            sender = %client.sender(),
            proxy_registry = %self.config.proxy_registry_address,
            "Starting deployment..."
        );

        let collectible = client
            .deploy(
                COLLECTIBLE_CONTRACT,
                collectible_artifact.deploy_data(&constructor_args)?,
            )
            .await?;
        log_deployed_contract(&collectible);

        let factory = client
            .deploy(
                FACTORY_CONTRACT,
                factory_artifact.deploy_data(&constructor_args)?,
            )
            .await?;

        let set_nft_tx = client
            .transact(factory.address, set_nft_address_call(collectible.address))
            .await
            .context("Failed to register the collectible with the factory")?;
        tracing::info!(tx = %set_nft_tx, "Factory now mints {COLLECTIBLE_CONTRACT}");
        log_deployed_contract(&factory);

        self.save_report(&collectible, &factory, set_nft_tx)?;
        Ok(DeploymentSummary {
            collectible,
            factory,
            set_nft_tx,
        })
    }

    fn save_report(
        &self,
        collectible: &DeployedContract,
        factory: &DeployedContract,
        set_nft_tx: B256,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.config.outdata).context(format!(
            "Failed to create outdata directory {}",
            self.config.outdata.display()
        ))?;
        let report = DeploymentReport::new(
            &self.config,
            collectible.clone(),
            factory.clone(),
            set_nft_tx,
        )?;
        report.save_to_file(&self.config.outdata.join(REPORT_FILENAME))
    }
}

/// Calldata for `setNftAddress(address)`.
pub fn set_nft_address_call(nft_address: Address) -> Bytes {
    let selector = &keccak256(b"setNftAddress(address)")[..4];
    let mut data = selector.to_vec();
    data.extend_from_slice(&DynSolValue::Address(nft_address).abi_encode());
    Bytes::from(data)
}

fn log_deployed_contract(contract: &DeployedContract) {
    tracing::info!("{} deployed to: {}", contract.name, contract.address);
    tracing::info!("{} hash: {}", contract.name, contract.tx_hash);
    tracing::info!("{} owner: {}", contract.name, contract.deployer);
    tracing::info!("{} chainId: {}", contract.name, contract.chain_id);
}
