use std::path::PathBuf;

use clap::Parser;
use gonft_deploy::{DEFAULT_PROXY_REGISTRY, Network};
use tracing::level_filters::LevelFilter;

/// Deploy the GoCollectible NFT and its minting factory in one shot.
#[derive(Debug, Parser)]
#[command(name = "gonft", version, about)]
pub struct Cli {
    /// Verbosity of the logs.
    #[arg(
        short,
        long,
        env = "GONFT_VERBOSITY",
        default_value_t = LevelFilter::INFO,
        global = true
    )]
    pub verbosity: LevelFilter,

    /// Target network.
    ///
    /// `rinkeby` (default) and `sepolia` build their endpoint from the
    /// Alchemy API key; anything else is taken as a full RPC URL.
    #[arg(long, alias = "net", env = "GONFT_NETWORK", default_value_t = Network::Rinkeby)]
    pub network: Network,

    /// Alchemy API key, used to build the RPC endpoint of named networks.
    #[arg(long, env = "ALCHEMY_API", hide_env_values = true)]
    pub alchemy_api_key: Option<String>,

    /// Hex-encoded private key of the deploying account.
    #[arg(long, env = "PRIV_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Block-explorer API key, kept for contract-verification tooling.
    #[arg(long, env = "ETHER_SCAN_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Directory containing the Solidity sources.
    #[arg(long, default_value = "contracts")]
    pub contracts_dir: PathBuf,

    /// Address passed to both contract constructors.
    #[arg(long, default_value = DEFAULT_PROXY_REGISTRY)]
    pub proxy_registry: String,

    /// Output directory for the deployment report and saved configuration.
    #[arg(long, env = "GONFT_OUTDATA", default_value = "data-gonft")]
    pub outdata: PathBuf,

    /// Load the deployment configuration from this `Gonft.toml` (or a
    /// directory containing one) instead of the flags above. Secrets still
    /// come from the environment.
    #[arg(long, alias = "conf", env = "GONFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration to `<outdata>/Gonft.toml`.
    #[arg(long)]
    pub save_config: bool,
}
