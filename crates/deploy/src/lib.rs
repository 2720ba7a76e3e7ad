//! gonft-deploy: one-shot deployment of the GoCollectible NFT suite.
//!
//! Compiles the Solidity sources, deploys `GoCollectible` and `GoFactory`
//! with a shared constructor argument, registers the collectible with the
//! factory, and writes a deployment report.

pub mod artifacts;
pub mod chain;
pub mod config;
pub mod deployer;
pub mod report;
pub mod rpc;
pub mod solc;
pub mod tx;

pub use alloy_core::primitives::Address;
pub use artifacts::{ArtifactStore, ContractArtifact};
pub use chain::{ChainClient, DeployedContract, HttpChainClient};
pub use config::{
    DEFAULT_PROXY_REGISTRY, DeployConfig, GONFT_CONFIG_FILENAME, Network, SolcConfig,
};
pub use deployer::{COLLECTIBLE_CONTRACT, Deployer, DeploymentSummary, FACTORY_CONTRACT};
pub use report::{ConfigDigest, DeploymentReport, REPORT_FILENAME};
