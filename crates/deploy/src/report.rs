//! Deployment report persisted after a successful run.
//!
//! The report records where the contracts landed, the transaction that wired
//! them together, and a digest of the configuration that produced them, so a
//! deployment can later be matched back to its settings.

use std::path::Path;

use alloy_core::primitives::{Address, B256};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::chain::DeployedContract;
use crate::config::DeployConfig;

/// Default file name for the deployment report inside the outdata directory.
pub const REPORT_FILENAME: &str = "deployment.json";

/// The deployment-relevant slice of the configuration, hashed into the
/// report. Secrets never enter the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDigest {
    network: String,
    /// `None` for custom endpoints, whose chain ID is only known at runtime.
    chain_id: Option<u64>,
    proxy_registry_address: Address,
    solc_version: String,
    optimizer_enabled: bool,
    optimizer_runs: u32,
}

impl ConfigDigest {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            network: config.network.to_string(),
            chain_id: config.network.known_chain_id(),
            proxy_registry_address: config.proxy_registry_address,
            solc_version: config.solc.version.clone(),
            optimizer_enabled: config.solc.optimizer_enabled,
            optimizer_runs: config.solc.optimizer_runs,
        }
    }

    /// Hex-encoded SHA-256 over the canonical JSON form.
    pub fn compute_hash(&self) -> Result<String> {
        let canonical =
            serde_json::to_string(self).context("Failed to serialize config digest")?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// The persisted outcome of one deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReport {
    /// Version of the harness that produced this report.
    pub harness_version: String,
    pub deployed_at: DateTime<Utc>,
    pub config_hash: String,
    pub chain_id: u64,
    pub collectible: DeployedContract,
    pub factory: DeployedContract,
    /// Hash of the `setNftAddress` transaction linking factory to NFT.
    pub set_nft_tx: B256,
}

impl DeploymentReport {
    pub fn new(
        config: &DeployConfig,
        collectible: DeployedContract,
        factory: DeployedContract,
        set_nft_tx: B256,
    ) -> Result<Self> {
        let config_hash = ConfigDigest::from_config(config).compute_hash()?;
        Ok(Self {
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            deployed_at: Utc::now(),
            config_hash,
            chain_id: collectible.chain_id,
            collectible,
            factory,
            set_nft_tx,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize deployment report")?;
        std::fs::write(path, content)
            .context(format!("Failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Deployment report saved");
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse deployment report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;
    use crate::config::Network;

    fn sample_contract(name: &str) -> DeployedContract {
        DeployedContract {
            name: name.to_string(),
            address: Address::repeat_byte(0x11),
            tx_hash: B256::repeat_byte(0x22),
            deployer: Address::repeat_byte(0x33),
            chain_id: 4,
        }
    }

    #[test]
    fn test_config_hash_is_stable() {
        let config = DeployConfig::default();
        let first = ConfigDigest::from_config(&config).compute_hash().unwrap();
        let second = ConfigDigest::from_config(&config).compute_hash().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_config_hash_tracks_deployment_settings() {
        let base = DeployConfig::default();
        let base_hash = ConfigDigest::from_config(&base).compute_hash().unwrap();

        let mut changed = base.clone();
        changed.network = Network::Sepolia;
        assert_ne!(
            ConfigDigest::from_config(&changed).compute_hash().unwrap(),
            base_hash
        );

        let mut changed = base.clone();
        changed.proxy_registry_address = address!("0000000000000000000000000000000000000001");
        assert_ne!(
            ConfigDigest::from_config(&changed).compute_hash().unwrap(),
            base_hash
        );

        // Secrets must not influence the digest.
        let mut changed = base.clone();
        changed.private_key = "0xdeadbeef".to_string();
        assert_eq!(
            ConfigDigest::from_config(&changed).compute_hash().unwrap(),
            base_hash
        );
    }

    #[test]
    fn test_report_round_trip() {
        let temp_dir = tempdir::TempDir::new("gonft-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join(REPORT_FILENAME);

        let report = DeploymentReport::new(
            &DeployConfig::default(),
            sample_contract("GoCollectible"),
            sample_contract("GoFactory"),
            B256::repeat_byte(0x44),
        )
        .unwrap();
        report.save_to_file(&path).unwrap();

        let loaded = DeploymentReport::load_from_file(&path).unwrap();
        assert_eq!(loaded, report);
        assert_eq!(loaded.chain_id, 4);
        assert_eq!(loaded.collectible.name, "GoCollectible");
    }
}
