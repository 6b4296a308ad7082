//! Caller-held signing accounts.
//!
//! # Security
//! - Keys are supplied by the caller for a single operation
//! - Keys are never logged; `Debug` prints the address only
//! - Hex key material is zeroized after parsing

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Signature, B256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use zeroize::Zeroizing;

use crate::chain::{ChainError, ChainResult};
use crate::tron::address as tron_address;

/// Environment variable the CLI reads the sender key from.
pub const SENDER_KEY_ENV_VAR: &str = "GATEWAY_SENDER_PRIVATE_KEY";

/// How the account's address is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFormat {
    /// EIP-55 checksummed hex.
    Evm,
    /// Base58check with the 0x41 prefix.
    Tron,
}

/// A secp256k1 keypair.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
    format: AddressFormat,
}

impl Account {
    /// Generate a fresh keypair locally.
    pub fn generate(format: AddressFormat) -> Self {
        Self {
            signer: PrivateKeySigner::random(),
            format,
        }
    }

    /// Parse a hex private key, with or without 0x prefix.
    pub fn from_private_key(private_key_hex: &str, format: AddressFormat) -> ChainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let bytes = Zeroizing::new(
            hex::decode(key_hex)
                .map_err(|e| ChainError::Signing(format!("Invalid private key format: {}", e)))?,
        );
        let signer = PrivateKeySigner::from_slice(&bytes)
            .map_err(|e| ChainError::Signing(format!("Invalid private key: {}", e)))?;
        Ok(Self { signer, format })
    }

    /// Load the sender key from [`SENDER_KEY_ENV_VAR`].
    pub fn from_env(format: AddressFormat) -> ChainResult<Self> {
        let key = Zeroizing::new(std::env::var(SENDER_KEY_ENV_VAR).map_err(|_| {
            ChainError::Signing(format!("Environment variable {} not set", SENDER_KEY_ENV_VAR))
        })?);
        Self::from_private_key(&key, format)
    }

    /// Same key, rendered for another chain family.
    pub fn with_format(mut self, format: AddressFormat) -> Self {
        self.format = format;
        self
    }

    pub fn evm_address(&self) -> Address {
        self.signer.address()
    }

    /// Address in this account's native format.
    pub fn address(&self) -> String {
        match self.format {
            AddressFormat::Evm => self.signer.address().to_checksum(None),
            AddressFormat::Tron => tron_address::encode(&self.signer.address()),
        }
    }

    pub fn format(&self) -> AddressFormat {
        self.format
    }

    /// Hex-encoded private key for handing to the caller's key store.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signer.to_bytes()))
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &B256) -> ChainResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| ChainError::Signing(e.to_string()))
    }

    /// Sign a complete transaction request; returns the EIP-2718 encoding.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> ChainResult<Vec<u8>> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope: TxEnvelope = tx
            .with_from(self.signer.address())
            .build(&wallet)
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        Ok(envelope.encoded_2718())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .field("private_key", &"<redacted>")
            .finish()
    }
}
