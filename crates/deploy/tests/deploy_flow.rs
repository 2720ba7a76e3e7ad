//! Control-flow tests for the deployment procedure, run against a scripted
//! chain client so no node or compiler is needed.

use std::cell::RefCell;

use alloy_core::primitives::{Address, B256, Bytes, keccak256};
use anyhow::Result;
use gonft_deploy::chain::{ChainClient, DeployedContract};
use gonft_deploy::config::{DEFAULT_PROXY_REGISTRY_ADDRESS, DeployConfig};
use gonft_deploy::deployer::{COLLECTIBLE_CONTRACT, Deployer, FACTORY_CONTRACT};
use gonft_deploy::report::{DeploymentReport, REPORT_FILENAME};
use gonft_deploy::solc::parse_output;
use gonft_deploy::ArtifactStore;

const CHAIN_ID: u64 = 4;
const SENDER: Address = Address::repeat_byte(0xaa);
const COLLECTIBLE_ADDRESS: Address = Address::repeat_byte(0x01);
const FACTORY_ADDRESS: Address = Address::repeat_byte(0x02);

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ChainId,
    Deploy { name: String, data: Bytes },
    Transact { to: Address, data: Bytes },
}

/// Chain client that records every call and fails on cue.
#[derive(Default)]
struct ScriptedClient {
    calls: RefCell<Vec<Call>>,
    fail_deploy_of: Option<&'static str>,
    fail_transact: bool,
}

impl ScriptedClient {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl ChainClient for ScriptedClient {
    fn sender(&self) -> Address {
        SENDER
    }

    async fn chain_id(&self) -> Result<u64> {
        self.calls.borrow_mut().push(Call::ChainId);
        Ok(CHAIN_ID)
    }

    async fn deploy(&self, name: &str, data: Bytes) -> Result<DeployedContract> {
        self.calls.borrow_mut().push(Call::Deploy {
            name: name.to_string(),
            data,
        });
        if self.fail_deploy_of == Some(name) {
            anyhow::bail!("scripted failure deploying {name}");
        }
        let address = if name == COLLECTIBLE_CONTRACT {
            COLLECTIBLE_ADDRESS
        } else {
            FACTORY_ADDRESS
        };
        Ok(DeployedContract {
            name: name.to_string(),
            address,
            tx_hash: B256::repeat_byte(0x77),
            deployer: SENDER,
            chain_id: CHAIN_ID,
        })
    }

    async fn transact(&self, to: Address, data: Bytes) -> Result<B256> {
        self.calls.borrow_mut().push(Call::Transact { to, data });
        if self.fail_transact {
            anyhow::bail!("scripted failure calling the factory");
        }
        Ok(B256::repeat_byte(0x88))
    }
}

/// Canned compiler output holding both contracts, each taking one address
/// constructor argument.
fn compiled_store() -> ArtifactStore {
    let raw = r#"{
        "contracts": {
            "GoCollectible.sol": {
                "GoCollectible": {
                    "abi": [
                        {
                            "type": "constructor",
                            "inputs": [{ "name": "proxyRegistryAddress", "type": "address" }],
                            "stateMutability": "nonpayable"
                        }
                    ],
                    "evm": { "bytecode": { "object": "60016001" } }
                }
            },
            "GoFactory.sol": {
                "GoFactory": {
                    "abi": [
                        {
                            "type": "constructor",
                            "inputs": [{ "name": "proxyRegistryAddress", "type": "address" }],
                            "stateMutability": "nonpayable"
                        }
                    ],
                    "evm": { "bytecode": { "object": "60026002" } }
                }
            }
        }
    }"#;
    ArtifactStore::from_output(parse_output(raw).expect("canned output parses"))
        .expect("canned output builds a store")
}

fn test_deployer(outdata: &std::path::Path) -> Deployer {
    Deployer::new(DeployConfig {
        outdata: outdata.to_path_buf(),
        ..Default::default()
    })
}

/// The ABI word for the shared constructor argument.
fn registry_word() -> Vec<u8> {
    let mut word = vec![0u8; 12];
    word.extend_from_slice(DEFAULT_PROXY_REGISTRY_ADDRESS.as_slice());
    word
}

#[tokio::test]
async fn test_full_deployment_sequence() -> Result<()> {
    init_test_tracing();
    let temp_dir = tempdir::TempDir::new("gonft-test")?;
    let client = ScriptedClient::default();

    let summary = test_deployer(temp_dir.path())
        .deploy_contracts(&compiled_store(), &client)
        .await?;

    let calls = client.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], Call::ChainId);

    // Collectible first, factory second, both with the same argument.
    let Call::Deploy { name, data } = &calls[1] else {
        panic!("expected a deployment, got {:?}", calls[1]);
    };
    assert_eq!(name, COLLECTIBLE_CONTRACT);
    assert_eq!(&data[..4], &[0x60, 0x01, 0x60, 0x01]);
    assert_eq!(&data[4..], registry_word().as_slice());

    let Call::Deploy { name, data } = &calls[2] else {
        panic!("expected a deployment, got {:?}", calls[2]);
    };
    assert_eq!(name, FACTORY_CONTRACT);
    assert_eq!(&data[4..], registry_word().as_slice());

    // The configure call targets the factory and passes the collectible.
    let Call::Transact { to, data } = &calls[3] else {
        panic!("expected a call, got {:?}", calls[3]);
    };
    assert_eq!(*to, FACTORY_ADDRESS);
    assert_eq!(&data[..4], &keccak256(b"setNftAddress(address)")[..4]);
    assert_eq!(&data[16..], COLLECTIBLE_ADDRESS.as_slice());

    assert_eq!(summary.collectible.address, COLLECTIBLE_ADDRESS);
    assert_eq!(summary.factory.address, FACTORY_ADDRESS);

    // A successful run leaves a loadable report behind.
    let report = DeploymentReport::load_from_file(&temp_dir.path().join(REPORT_FILENAME))?;
    assert_eq!(report.chain_id, CHAIN_ID);
    assert_eq!(report.collectible.address, COLLECTIBLE_ADDRESS);
    assert_eq!(report.set_nft_tx, summary.set_nft_tx);
    Ok(())
}

#[tokio::test]
async fn test_missing_contract_aborts_before_any_transaction() -> Result<()> {
    init_test_tracing();
    let temp_dir = tempdir::TempDir::new("gonft-test")?;
    let client = ScriptedClient::default();

    let raw = r#"{
        "contracts": {
            "GoCollectible.sol": {
                "GoCollectible": {
                    "abi": [],
                    "evm": { "bytecode": { "object": "60016001" } }
                }
            }
        }
    }"#;
    let store = ArtifactStore::from_output(parse_output(raw)?)?;

    let err = test_deployer(temp_dir.path())
        .deploy_contracts(&store, &client)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains(FACTORY_CONTRACT));
    assert!(client.calls().is_empty(), "nothing should reach the chain");
    Ok(())
}

#[tokio::test]
async fn test_collectible_failure_stops_the_run() -> Result<()> {
    init_test_tracing();
    let temp_dir = tempdir::TempDir::new("gonft-test")?;
    let client = ScriptedClient {
        fail_deploy_of: Some(COLLECTIBLE_CONTRACT),
        ..Default::default()
    };

    let result = test_deployer(temp_dir.path())
        .deploy_contracts(&compiled_store(), &client)
        .await;
    assert!(result.is_err());

    let calls = client.calls();
    assert_eq!(calls.len(), 2, "no factory deployment after the failure");
    assert!(matches!(&calls[1], Call::Deploy { name, .. } if name == COLLECTIBLE_CONTRACT));
    assert!(!temp_dir.path().join(REPORT_FILENAME).exists());
    Ok(())
}

#[tokio::test]
async fn test_factory_failure_skips_configuration() -> Result<()> {
    init_test_tracing();
    let temp_dir = tempdir::TempDir::new("gonft-test")?;
    let client = ScriptedClient {
        fail_deploy_of: Some(FACTORY_CONTRACT),
        ..Default::default()
    };

    let result = test_deployer(temp_dir.path())
        .deploy_contracts(&compiled_store(), &client)
        .await;
    assert!(result.is_err());

    let calls = client.calls();
    assert_eq!(calls.len(), 3);
    assert!(
        !calls.iter().any(|c| matches!(c, Call::Transact { .. })),
        "setNftAddress must not run without a factory"
    );
    Ok(())
}

#[tokio::test]
async fn test_configuration_failure_propagates() -> Result<()> {
    init_test_tracing();
    let temp_dir = tempdir::TempDir::new("gonft-test")?;
    let client = ScriptedClient {
        fail_transact: true,
        ..Default::default()
    };

    let err = test_deployer(temp_dir.path())
        .deploy_contracts(&compiled_store(), &client)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("register the collectible"));
    assert!(!temp_dir.path().join(REPORT_FILENAME).exists());
    Ok(())
}
