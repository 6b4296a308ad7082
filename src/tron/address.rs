//! Base58check Tron addresses.
//!
//! A Tron address is the 20-byte Ethereum-style account prefixed with 0x41,
//! followed by the first four bytes of a double SHA-256 checksum.

use alloy::primitives::Address;
use sha2::{Digest, Sha256};

use crate::chain::{ChainError, ChainResult};

/// Mainnet address prefix byte.
pub const ADDRESS_PREFIX: u8 = 0x41;

const CHECKSUM_LEN: usize = 4;
const PAYLOAD_LEN: usize = 21;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Base58check form of `account`.
pub fn encode(account: &Address) -> String {
    let mut bytes = Vec::with_capacity(PAYLOAD_LEN + CHECKSUM_LEN);
    bytes.push(ADDRESS_PREFIX);
    bytes.extend_from_slice(account.as_slice());
    let check = checksum(&bytes);
    bytes.extend_from_slice(&check);
    bs58::encode(bytes).into_string()
}

/// Parse a base58check Tron address.
pub fn decode(address: &str) -> ChainResult<Address> {
    let invalid = || ChainError::InvalidAddress(address.to_string());
    let bytes = bs58::decode(address.trim()).into_vec().map_err(|_| invalid())?;
    if bytes.len() != PAYLOAD_LEN + CHECKSUM_LEN || bytes[0] != ADDRESS_PREFIX {
        return Err(invalid());
    }
    let (payload, check) = bytes.split_at(PAYLOAD_LEN);
    if checksum(payload) != check {
        return Err(invalid());
    }
    Ok(Address::from_slice(&payload[1..]))
}

/// `41`-prefixed hex form used by non-`visible` API calls.
pub fn to_hex(account: &Address) -> String {
    format!("{:02x}{}", ADDRESS_PREFIX, hex::encode(account.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    const USDT_HEX: &str = "41a614f803b6fd780986a42c78ec9c7f77e6ded13c";

    #[test]
    fn test_usdt_contract_address() {
        let account = decode(USDT).unwrap();
        assert_eq!(to_hex(&account), USDT_HEX);
        assert_eq!(encode(&account), USDT);
    }

    #[test]
    fn test_bad_checksum() {
        // Last character changed
        assert!(matches!(
            decode("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u"),
            Err(ChainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_rejects_evm_hex() {
        assert!(decode("0xa614f803b6fd780986a42c78ec9c7f77e6ded13c").is_err());
        assert!(decode("").is_err());
    }
}
