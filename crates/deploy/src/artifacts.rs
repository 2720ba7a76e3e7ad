//! Compiled contract artifacts and constructor-argument encoding.

use std::collections::BTreeMap;

use alloy_core::dyn_abi::DynSolValue;
use alloy_core::json_abi::JsonAbi;
use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};

use crate::solc::StandardJsonOutput;

/// A deployable contract: its ABI and creation bytecode.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Build the contract-creation payload: creation bytecode followed by the
    /// ABI-encoded constructor arguments.
    ///
    /// The argument count is checked against the ABI so a mismatched call
    /// fails here instead of as an opaque revert on chain.
    pub fn deploy_data(&self, args: &[DynSolValue]) -> Result<Bytes> {
        let expected = self.abi.constructor().map(|c| c.inputs.len()).unwrap_or(0);
        if args.len() != expected {
            anyhow::bail!(
                "{} constructor takes {expected} argument(s), got {}",
                self.name,
                args.len()
            );
        }

        let mut data = self.bytecode.to_vec();
        if !args.is_empty() {
            let encoded = DynSolValue::Tuple(args.to_vec())
                .abi_encode_sequence()
                .context("Failed to ABI-encode constructor arguments")?;
            data.extend_from_slice(&encoded);
        }
        Ok(Bytes::from(data))
    }
}

/// All concrete contracts produced by one compilation run, keyed by name.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    contracts: BTreeMap<String, ContractArtifact>,
}

impl ArtifactStore {
    pub fn from_output(output: StandardJsonOutput) -> Result<Self> {
        let mut contracts = BTreeMap::new();
        for (file, file_contracts) in output.contracts {
            for (name, contract) in file_contracts {
                let abi: JsonAbi = serde_json::from_value(contract.abi)
                    .context(format!("Invalid ABI for {name} in {file}"))?;
                let object = contract.evm.bytecode.object;
                let bytecode = hex::decode(object.trim_start_matches("0x"))
                    .context(format!("Invalid bytecode hex for {name} in {file}"))?;

                // Interfaces and abstract contracts compile to empty bytecode.
                if bytecode.is_empty() {
                    tracing::debug!(contract = %name, file = %file, "Skipping non-deployable contract");
                    continue;
                }
                if contracts
                    .insert(
                        name.clone(),
                        ContractArtifact {
                            name: name.clone(),
                            abi,
                            bytecode: Bytes::from(bytecode),
                        },
                    )
                    .is_some()
                {
                    anyhow::bail!("Duplicate contract name {name} across source files");
                }
            }
        }
        Ok(Self { contracts })
    }

    /// Look up a contract by name, listing the available ones on a miss.
    pub fn factory(&self, name: &str) -> Result<&ContractArtifact> {
        self.contracts.get(name).with_context(|| {
            format!(
                "Contract {name} not found among compiled artifacts (available: {})",
                self.names().join(", ")
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.contracts.keys().map(String::as_str).collect()
    }
}
