//! Transaction request construction.
//!
//! # Responsibilities
//! - Native transfers in EIP-1559 (Ethereum) or legacy (BNB Smart Chain) form
//! - ERC-20/BEP-20 `transfer` calls with a fixed gas limit
//! - ABI encoding shared with the Tron contract client

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

/// Gas for a plain value transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Gas limit for token `transfer` calls. Token transfers touch contract
/// storage and do not fit in a plain transfer's 21000.
pub const TOKEN_TRANSFER_GAS_LIMIT: u64 = 100_000;

/// Cap on the EIP-1559 priority fee (3 gwei).
pub const MAX_PRIORITY_FEE_WEI: u128 = 3_000_000_000;

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

/// Fields every transfer carries.
#[derive(Debug, Clone, Copy)]
pub struct TransferFields {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub chain_id: u64,
}

impl TransferFields {
    fn request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_value(self.value)
            .with_nonce(self.nonce)
            .with_chain_id(self.chain_id)
    }
}

/// Type-2 transaction: max fee at the node's gas price, priority fee capped.
pub fn eip1559_transfer(
    fields: &TransferFields,
    gas_limit: u64,
    gas_price: u128,
    priority_fee_cap: u128,
) -> TransactionRequest {
    fields
        .request()
        .with_gas_limit(gas_limit)
        .with_max_fee_per_gas(gas_price)
        .with_max_priority_fee_per_gas(priority_fee_cap.min(gas_price))
}

/// Legacy transaction at the node's gas price.
pub fn legacy_transfer(fields: &TransferFields, gas_limit: u64, gas_price: u128) -> TransactionRequest {
    fields
        .request()
        .with_gas_limit(gas_limit)
        .with_gas_price(gas_price)
}

/// Legacy `transfer(recipient, amount)` call on `contract`.
pub fn token_transfer(
    fields: &TransferFields,
    contract: Address,
    gas_price: u128,
) -> TransactionRequest {
    let data = transfer_calldata(fields.to, fields.value);
    TransactionRequest::default()
        .with_from(fields.from)
        .with_to(contract)
        .with_value(U256::ZERO)
        .with_input(data)
        .with_nonce(fields.nonce)
        .with_chain_id(fields.chain_id)
        .with_gas_limit(TOKEN_TRANSFER_GAS_LIMIT)
        .with_gas_price(gas_price)
}

/// Selector-prefixed calldata for `transfer(address,uint256)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Calldata for `balanceOf(address)`.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

/// Calldata without the 4-byte selector, as Tron's `parameter` field wants it.
pub fn strip_selector(calldata: &[u8]) -> &[u8] {
    calldata.get(4..).unwrap_or_default()
}

/// Decode a single `uint256` return word.
pub fn decode_uint_word(data: &[u8]) -> Option<U256> {
    data.get(..32).map(U256::from_be_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> TransferFields {
        TransferFields {
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x22),
            value: U256::from(1_000u64),
            nonce: 4,
            chain_id: 1,
        }
    }

    #[test]
    fn test_eip1559_priority_capped_by_gas_price() {
        let tx = eip1559_transfer(&fields(), 21_000, 1_000_000_000, MAX_PRIORITY_FEE_WEI);
        assert_eq!(tx.max_fee_per_gas, Some(1_000_000_000));
        assert_eq!(tx.max_priority_fee_per_gas, Some(1_000_000_000));

        let tx = eip1559_transfer(&fields(), 21_000, 50_000_000_000, MAX_PRIORITY_FEE_WEI);
        assert_eq!(tx.max_priority_fee_per_gas, Some(MAX_PRIORITY_FEE_WEI));
        assert_eq!(tx.nonce, Some(4));
    }

    #[test]
    fn test_token_transfer_targets_contract() {
        let contract = Address::repeat_byte(0x33);
        let tx = token_transfer(&fields(), contract, 5_000_000_000);
        assert_eq!(tx.to, Some(contract.into()));
        assert_eq!(tx.gas, Some(TOKEN_TRANSFER_GAS_LIMIT));
        assert_eq!(tx.value, Some(U256::ZERO));
    }

    #[test]
    fn test_transfer_calldata_layout() {
        let data = transfer_calldata(Address::repeat_byte(0x22), U256::from(5u64));
        // transfer(address,uint256) selector
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 64);
        let params = strip_selector(&data);
        assert_eq!(&params[12..32], Address::repeat_byte(0x22).as_slice());
        assert_eq!(decode_uint_word(&params[32..]), Some(U256::from(5u64)));
    }

    #[test]
    fn test_decode_short_word() {
        assert_eq!(decode_uint_word(&[0u8; 31]), None);
        assert_eq!(strip_selector(&[1, 2]), &[] as &[u8]);
    }
}
