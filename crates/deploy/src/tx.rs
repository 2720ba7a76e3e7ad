//! Legacy (EIP-155) transaction encoding and signing.
//!
//! Transactions are built and signed locally, then submitted through
//! `eth_sendRawTransaction`, so the RPC endpoint never sees the private key.
//! The RLP subset implemented here covers exactly what a legacy transaction
//! needs: byte strings and flat lists.

use alloy_core::primitives::{Address, B256, U256, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};

/// A pre-EIP-1559 transaction awaiting signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    /// The EIP-155 signing hash: keccak256 of the transaction fields with
    /// `(chain_id, 0, 0)` in place of the signature.
    pub fn signing_hash(&self) -> B256 {
        let payload = rlp_list(&[
            rlp_u64(self.nonce),
            rlp_u256(self.gas_price),
            rlp_u64(self.gas_limit),
            rlp_to(self.to),
            rlp_u256(self.value),
            rlp_bytes(&self.data),
            rlp_u64(self.chain_id),
            rlp_bytes(&[]),
            rlp_bytes(&[]),
        ]);
        keccak256(&payload)
    }

    /// Sign the transaction and return the raw RLP bytes for
    /// `eth_sendRawTransaction`.
    pub fn sign(&self, signer: &PrivateKeySigner) -> Result<Vec<u8>> {
        let signature = signer
            .sign_hash_sync(&self.signing_hash())
            .context("Failed to sign transaction")?;
        // EIP-155 recovery ID: v = chain_id * 2 + 35 + parity.
        let v = self.chain_id * 2 + 35 + u64::from(signature.v());

        Ok(rlp_list(&[
            rlp_u64(self.nonce),
            rlp_u256(self.gas_price),
            rlp_u64(self.gas_limit),
            rlp_to(self.to),
            rlp_u256(self.value),
            rlp_bytes(&self.data),
            rlp_u64(v),
            rlp_u256(signature.r()),
            rlp_u256(signature.s()),
        ]))
    }
}

fn rlp_length_prefix(base: u8, len: usize) -> Vec<u8> {
    if len <= 55 {
        vec![base + len as u8]
    } else {
        let len_be = len.to_be_bytes();
        let len_bytes = trim_leading_zeros(&len_be);
        let mut prefix = vec![base + 55 + len_bytes.len() as u8];
        prefix.extend_from_slice(len_bytes);
        prefix
    }
}

/// RLP string encoding.
fn rlp_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }
    let mut out = rlp_length_prefix(0x80, data.len());
    out.extend_from_slice(data);
    out
}

/// RLP list encoding over already-encoded items.
fn rlp_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len = items.iter().map(Vec::len).sum();
    let mut out = rlp_length_prefix(0xc0, payload_len);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Integers encode as their big-endian bytes without leading zeros; zero is
/// the empty string.
fn rlp_u64(value: u64) -> Vec<u8> {
    rlp_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

fn rlp_u256(value: U256) -> Vec<u8> {
    rlp_bytes(trim_leading_zeros(&value.to_be_bytes::<32>()))
}

fn rlp_to(to: Option<Address>) -> Vec<u8> {
    match to {
        Some(address) => rlp_bytes(address.as_slice()),
        None => rlp_bytes(&[]),
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
