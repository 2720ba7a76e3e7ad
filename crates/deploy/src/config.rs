//! Deployment configuration for the gonft harness.
//!
//! The configuration mirrors what the deployment needs at runtime: the target
//! network (and the Alchemy API key used to build its RPC endpoint), the
//! signing key, the Solidity compiler settings, and the address handed to
//! both contract constructors. Non-secret parameters round-trip through
//! `Gonft.toml`; secrets are always injected from the environment.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_core::primitives::{Address, address};
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// The default name for the gonft configuration file.
pub const GONFT_CONFIG_FILENAME: &str = "Gonft.toml";

/// The address passed to both contract constructors (operator proxy registry).
pub const DEFAULT_PROXY_REGISTRY_ADDRESS: Address =
    address!("494449CAE41303b98425F8dDEBF88639759b55c5");

/// String form of [`DEFAULT_PROXY_REGISTRY_ADDRESS`], for CLI defaults.
pub const DEFAULT_PROXY_REGISTRY: &str = "0x494449CAE41303b98425F8dDEBF88639759b55c5";

/// The target Ethereum network.
///
/// Named networks build their RPC endpoint from an Alchemy API key; `Custom`
/// takes a full RPC URL and ignores the key.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Rinkeby,
    Sepolia,
    #[strum(default)]
    Custom(String),
}

impl Network {
    /// Build the RPC endpoint URL for this network.
    pub fn rpc_url(&self, alchemy_api_key: &str) -> Result<Url> {
        let url_str = match self {
            Network::Rinkeby | Network::Sepolia => {
                if alchemy_api_key.is_empty() {
                    anyhow::bail!(
                        "An Alchemy API key is required for the {} network (set ALCHEMY_API)",
                        self
                    );
                }
                match self {
                    Network::Rinkeby => {
                        format!("https://eth-rinkeby.alchemyapi.io/v2/{}", alchemy_api_key)
                    }
                    _ => format!("https://eth-sepolia.g.alchemy.com/v2/{}", alchemy_api_key),
                }
            }
            Network::Custom(url) => url.clone(),
        };
        Url::parse(&url_str).context("Failed to parse RPC endpoint URL")
    }

    /// The well-known chain ID of this network, if it has one.
    pub fn known_chain_id(&self) -> Option<u64> {
        match self {
            Network::Rinkeby => Some(4),
            Network::Sepolia => Some(11155111),
            Network::Custom(_) => None,
        }
    }

    /// Whether this network has been shut down upstream.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Network::Rinkeby)
    }
}

/// Solidity compiler settings.
///
/// These affect the emitted bytecode (size, gas cost) but not the behavior of
/// the deployment procedure itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolcConfig {
    /// Expected compiler version. A differing installed version is logged as
    /// a warning, not an error.
    pub version: String,
    /// Whether the optimizer is enabled.
    pub optimizer_enabled: bool,
    /// Optimizer iteration count.
    pub optimizer_runs: u32,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            version: "0.8.13".to_string(),
            optimizer_enabled: true,
            optimizer_runs: 200,
        }
    }
}

/// Complete configuration for one deployment run.
///
/// Secrets (API keys, private key) are deliberately skipped during
/// serialization so a saved `Gonft.toml` never contains credentials; they are
/// re-injected from the environment when the file is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Target network.
    pub network: Network,
    /// Address handed to both contract constructors.
    pub proxy_registry_address: Address,
    /// Directory containing the Solidity sources.
    pub contracts_dir: PathBuf,
    /// Output data directory (deployment report, saved configuration).
    pub outdata: PathBuf,
    /// Compiler settings.
    pub solc: SolcConfig,

    /// Alchemy API key for named networks.
    #[serde(skip)]
    pub alchemy_api_key: String,
    /// Hex-encoded deployer private key.
    #[serde(skip)]
    pub private_key: String,
    /// Block-explorer API key. Recorded for contract verification tooling;
    /// unused by the deployment itself.
    #[serde(skip)]
    pub etherscan_api_key: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            network: Network::Rinkeby,
            proxy_registry_address: DEFAULT_PROXY_REGISTRY_ADDRESS,
            contracts_dir: PathBuf::from("contracts"),
            outdata: PathBuf::from("data-gonft"),
            solc: SolcConfig::default(),
            alchemy_api_key: String::new(),
            private_key: String::new(),
            etherscan_api_key: String::new(),
        }
    }
}

impl DeployConfig {
    /// Overwrite secrets with values from the environment, where provided.
    pub fn with_secrets(
        mut self,
        alchemy_api_key: Option<String>,
        private_key: Option<String>,
        etherscan_api_key: Option<String>,
    ) -> Self {
        if let Some(key) = alchemy_api_key {
            self.alchemy_api_key = key;
        }
        if let Some(key) = private_key {
            self.private_key = key;
        }
        if let Some(key) = etherscan_api_key {
            self.etherscan_api_key = key;
        }
        self
    }

    /// Build the RPC endpoint URL for the configured network.
    pub fn rpc_url(&self) -> Result<Url> {
        self.network.rpc_url(&self.alchemy_api_key)
    }

    /// Parse the configured private key into a signer.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        if self.private_key.is_empty() {
            anyhow::bail!("No deployer private key configured (set PRIV_KEY)");
        }
        PrivateKeySigner::from_str(self.private_key.trim())
            .context("Invalid deployer private key (expected a 32-byte hex string)")
    }

    /// Validate the configuration eagerly so a missing or malformed
    /// environment variable fails with a clear error before any network
    /// traffic.
    pub fn validate(&self) -> Result<()> {
        self.rpc_url()?;
        self.signer()?;
        Ok(())
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deploy config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file (or a directory containing
    /// `Gonft.toml`). Secrets are left empty; see [`Self::with_secrets`].
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file or directory not found: {}",
                path.display()
            );
        }

        let config_path = if path.is_dir() {
            path.join(GONFT_CONFIG_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config from {}", config_path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }
}
