//! Solidity compiler driver.
//!
//! Invokes `solc --standard-json` as a subprocess, feeding it every `.sol`
//! file found in the contracts directory and parsing the combined output.
//! Compilation is all-or-nothing: any error-severity diagnostic aborts the
//! run before a single transaction is sent.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::SolcConfig;

/// A single diagnostic from the compiler.
#[derive(Debug, Clone, Deserialize)]
pub struct SolcDiagnostic {
    pub severity: String,
    pub message: String,
    #[serde(rename = "formattedMessage")]
    pub formatted_message: Option<String>,
}

impl SolcDiagnostic {
    fn display_message(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

#[derive(Debug, Deserialize)]
pub struct BytecodeOutput {
    /// Hex-encoded creation bytecode, without a `0x` prefix.
    pub object: String,
}

#[derive(Debug, Deserialize)]
pub struct EvmOutput {
    pub bytecode: BytecodeOutput,
}

/// Per-contract compiler output (the slice of it we request).
#[derive(Debug, Deserialize)]
pub struct ContractOutput {
    pub abi: Value,
    pub evm: EvmOutput,
}

/// Parsed `solc --standard-json` output.
#[derive(Debug, Deserialize)]
pub struct StandardJsonOutput {
    #[serde(default)]
    pub errors: Vec<SolcDiagnostic>,
    /// Source file -> contract name -> output.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

/// Compile every Solidity source in `contracts_dir`.
pub async fn compile(config: &SolcConfig, contracts_dir: &Path) -> Result<StandardJsonOutput> {
    let sources = collect_sources(contracts_dir)?;

    let installed = query_solc_version().await?;
    if installed != config.version {
        tracing::warn!(
            installed = %installed,
            configured = %config.version,
            "Installed solc differs from the configured compiler version"
        );
    } else {
        tracing::debug!(version = %installed, "Using solc");
    }

    tracing::info!(
        sources = sources.len(),
        optimizer_enabled = config.optimizer_enabled,
        optimizer_runs = config.optimizer_runs,
        "Compiling contracts..."
    );

    let input = standard_json_input(config, &sources);
    let mut child = Command::new("solc")
        .arg("--standard-json")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn solc")?;

    let mut stdin = child.stdin.take().context("Failed to open solc stdin")?;
    stdin
        .write_all(input.to_string().as_bytes())
        .await
        .context("Failed to write standard JSON input to solc")?;
    drop(stdin);

    let output = child
        .wait_with_output()
        .await
        .context("Failed to wait for solc")?;
    if !output.status.success() {
        anyhow::bail!(
            "solc exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let parsed = parse_output(&String::from_utf8_lossy(&output.stdout))?;
    check_diagnostics(&parsed)?;
    Ok(parsed)
}

/// Parse raw standard-JSON compiler output.
pub fn parse_output(raw: &str) -> Result<StandardJsonOutput> {
    serde_json::from_str(raw).context("Failed to parse solc standard JSON output")
}

/// Log warnings and fail on any error-severity diagnostic.
pub fn check_diagnostics(output: &StandardJsonOutput) -> Result<()> {
    let mut errors = Vec::new();
    for diagnostic in &output.errors {
        if diagnostic.severity == "error" {
            errors.push(diagnostic.display_message().to_string());
        } else {
            tracing::warn!("solc: {}", diagnostic.display_message().trim_end());
        }
    }

    if !errors.is_empty() {
        anyhow::bail!("Compilation failed:\n{}", errors.join("\n"));
    }
    Ok(())
}

fn standard_json_input(config: &SolcConfig, sources: &BTreeMap<String, String>) -> Value {
    let sources: BTreeMap<&String, Value> = sources
        .iter()
        .map(|(name, content)| (name, json!({ "content": content })))
        .collect();

    json!({
        "language": "Solidity",
        "sources": sources,
        "settings": {
            "optimizer": {
                "enabled": config.optimizer_enabled,
                "runs": config.optimizer_runs,
            },
            "outputSelection": {
                "*": {
                    "*": ["abi", "evm.bytecode.object"],
                },
            },
        },
    })
}

/// Gather `<name>.sol -> content` for every Solidity file in the directory.
fn collect_sources(contracts_dir: &Path) -> Result<BTreeMap<String, String>> {
    let entries = std::fs::read_dir(contracts_dir).context(format!(
        "Failed to read contracts directory {}",
        contracts_dir.display()
    ))?;

    let mut sources = BTreeMap::new();
    for entry in entries {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("sol") {
            continue;
        }
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .context("Non-UTF-8 source file name")?
            .to_string();
        let content = std::fs::read_to_string(&path)
            .context(format!("Failed to read {}", path.display()))?;
        sources.insert(name, content);
    }

    if sources.is_empty() {
        anyhow::bail!(
            "No Solidity sources found in {}",
            contracts_dir.display()
        );
    }
    Ok(sources)
}

async fn query_solc_version() -> Result<String> {
    let output = Command::new("solc")
        .arg("--version")
        .output()
        .await
        .context("Failed to run solc (is the Solidity compiler installed and on PATH?)")?;
    if !output.status.success() {
        anyhow::bail!("solc --version exited with {}", output.status);
    }
    parse_version_output(&String::from_utf8_lossy(&output.stdout))
        .context("Unexpected solc --version output")
}

/// Extract "0.8.13" from the `Version: 0.8.13+commit.abaa5c0e...` line.
fn parse_version_output(raw: &str) -> Option<String> {
    raw.lines()
        .find_map(|line| line.trim().strip_prefix("Version: "))
        .and_then(|version| version.split('+').next())
        .map(|version| version.trim().to_string())
}
