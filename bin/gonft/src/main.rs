//! gonft deploys the GoCollectible NFT contract and its minting factory to an
//! Ethereum network, wires them together, and prints where they landed.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;
use gonft_deploy::{
    DeployConfig, Deployer, DeploymentSummary, GONFT_CONFIG_FILENAME, HttpChainClient,
};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let config = build_config(&cli)?;
    config.validate()?;
    if config.network.is_deprecated() {
        tracing::warn!(
            network = %config.network,
            "This network has been shut down upstream; expect the RPC endpoint to reject requests"
        );
    }

    if cli.save_config {
        std::fs::create_dir_all(&config.outdata).context(format!(
            "Failed to create outdata directory {}",
            config.outdata.display()
        ))?;
        config.save_to_file(&config.outdata.join(GONFT_CONFIG_FILENAME))?;
    }

    let signer = config.signer()?;
    let url = config.rpc_url()?;
    let client = HttpChainClient::connect(url, signer).await?;

    let deployer = Deployer::new(config);
    let summary = deployer.deploy(&client).await?;

    print_summary(&summary);
    Ok(())
}

/// Assemble the effective configuration from a config file or the CLI flags,
/// with secrets always coming from the flags/environment.
fn build_config(cli: &Cli) -> Result<DeployConfig> {
    let config = match &cli.config {
        Some(path) => DeployConfig::load_from_file(path)?,
        None => DeployConfig {
            network: cli.network.clone(),
            proxy_registry_address: cli
                .proxy_registry
                .parse()
                .context("Invalid proxy registry address")?,
            contracts_dir: cli.contracts_dir.clone(),
            outdata: cli.outdata.clone(),
            ..Default::default()
        },
    };
    Ok(config.with_secrets(
        cli.alchemy_api_key.clone(),
        cli.private_key.clone(),
        cli.etherscan_api_key.clone(),
    ))
}

fn print_summary(summary: &DeploymentSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Contract", "Address", "Tx hash", "Owner", "Chain ID"]);
    for contract in [&summary.collectible, &summary.factory] {
        table.add_row(vec![
            contract.name.clone(),
            contract.address.to_string(),
            contract.tx_hash.to_string(),
            contract.deployer.to_string(),
            contract.chain_id.to_string(),
        ]);
    }
    println!("{table}");
    println!("setNftAddress tx: {}", summary.set_nft_tx);
}
