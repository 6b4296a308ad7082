//! Ether-family sends, token transfers and best-effort confirmations
//! against an in-memory node.

use std::str::FromStr;

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;

use chain_gateway::blockchain::transaction::{transfer_calldata, TOKEN_TRANSFER_GAS_LIMIT};
use chain_gateway::blockchain::{Account, AddressFormat, ChainId, NodeTransaction};
use chain_gateway::chain::{
    ChainError, ChainService, Confirmations, CreatedWallet, Source, SweepOutcome, WalletTag,
};
use chain_gateway::coins::account::{BNB, ETHEREUM};
use chain_gateway::coins::EvmService;
use chain_gateway::providers::TokenContract;

mod common;
use common::MockEvmNode;

const SENDER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

fn sender() -> Account {
    Account::from_private_key(SENDER_KEY, AddressFormat::Evm).unwrap()
}

fn decode(raw: &[u8]) -> TxEnvelope {
    TxEnvelope::decode_2718(&mut &raw[..]).unwrap()
}

#[tokio::test]
async fn test_broadcast_nonce_matches_node_nonce() {
    let node = MockEvmNode {
        nonce: 7,
        gas_price: 5_000_000_000,
        gas_estimate: 21_000,
        ..Default::default()
    };
    let service = EvmService::with_node(node.clone(), &ETHEREUM, ChainId::ETHEREUM);

    let txid = service
        .send(RECIPIENT, Decimal::from_str("0.01").unwrap(), Source::Account(&sender()))
        .await
        .unwrap();

    let broadcasts = node.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(txid, format!("{:#x}", alloy::primitives::keccak256(&broadcasts[0])));

    let tx = decode(&broadcasts[0]);
    assert_eq!(tx.nonce(), 7);
    assert_eq!(tx.chain_id(), Some(1));
    assert_eq!(tx.gas_limit(), 21_000);
    assert_eq!(tx.max_fee_per_gas(), 5_000_000_000);
    assert_eq!(tx.max_priority_fee_per_gas(), Some(3_000_000_000));
    assert_eq!(tx.value(), U256::from(10_000_000_000_000_000u64));
    assert_eq!(tx.to(), Some(Address::from_str(RECIPIENT).unwrap()));
}

#[tokio::test]
async fn test_priority_fee_never_exceeds_gas_price() {
    let node = MockEvmNode {
        gas_price: 1_000_000_000,
        ..Default::default()
    };
    let service = EvmService::with_node(node.clone(), &ETHEREUM, ChainId::ETHEREUM);

    service
        .send(RECIPIENT, Decimal::ONE, Source::Account(&sender()))
        .await
        .unwrap();

    let tx = decode(&node.broadcasts()[0]);
    assert_eq!(tx.max_priority_fee_per_gas(), Some(1_000_000_000));
}

#[tokio::test]
async fn test_bep20_transfer_uses_fixed_gas_and_chain() {
    let node = MockEvmNode {
        nonce: 3,
        ..Default::default()
    };
    let service = EvmService::with_node(node.clone(), &BNB, ChainId::BNB_SMART_CHAIN);
    let contract = Address::repeat_byte(0x55);

    service
        .send_token(
            RECIPIENT,
            Decimal::from_str("2.5").unwrap(),
            &sender(),
            TokenContract::bep20(contract),
        )
        .await
        .unwrap();

    let tx = decode(&node.broadcasts()[0]);
    assert_eq!(tx.gas_limit(), TOKEN_TRANSFER_GAS_LIMIT);
    assert_eq!(tx.gas_limit(), 100_000);
    assert_eq!(tx.chain_id(), Some(56));
    assert_eq!(tx.nonce(), 3);
    assert_eq!(tx.to(), Some(contract));
    assert_eq!(tx.value(), U256::ZERO);

    let amount = U256::from(2_500_000_000_000_000_000u128);
    let expected = transfer_calldata(Address::from_str(RECIPIENT).unwrap(), amount);
    assert_eq!(tx.input(), &expected);
}

#[tokio::test]
async fn test_bnb_native_transfer_is_legacy() {
    let node = MockEvmNode::default();
    let service = EvmService::with_node(node.clone(), &BNB, ChainId::BNB_SMART_CHAIN);

    service
        .send(RECIPIENT, Decimal::ONE, Source::Account(&sender()))
        .await
        .unwrap();

    let tx = decode(&node.broadcasts()[0]);
    assert!(matches!(tx, TxEnvelope::Legacy(_)));
    assert_eq!(tx.gas_limit(), 21_000);
    assert_eq!(tx.gas_price(), Some(5_000_000_000));
}

#[tokio::test]
async fn test_sweep_sends_to_main_address() {
    let node = MockEvmNode::default();
    let service = EvmService::with_node(node.clone(), &ETHEREUM, ChainId::ETHEREUM);

    let outcome = service
        .sweep(RECIPIENT, Source::Account(&sender()), Decimal::ONE)
        .await
        .unwrap();

    assert!(matches!(outcome, SweepOutcome::Broadcast(_)));
    let tx = decode(&node.broadcasts()[0]);
    assert_eq!(tx.to(), Some(Address::from_str(RECIPIENT).unwrap()));
}

#[tokio::test]
async fn test_send_needs_signing_account() {
    let node = MockEvmNode::default();
    let service = EvmService::with_node(node.clone(), &ETHEREUM, ChainId::ETHEREUM);

    let result = service.send(RECIPIENT, Decimal::ONE, Source::Custody).await;

    assert!(matches!(result, Err(ChainError::Unsupported { .. })));
    assert!(node.broadcasts().is_empty());
}

#[tokio::test]
async fn test_invalid_recipient() {
    let service = EvmService::with_node(MockEvmNode::default(), &ETHEREUM, ChainId::ETHEREUM);

    let result = service
        .send("not-an-address", Decimal::ONE, Source::Account(&sender()))
        .await;

    assert!(matches!(result, Err(ChainError::InvalidAddress(_))));
}

#[tokio::test]
async fn test_confirmations_depth() {
    let node = MockEvmNode {
        transaction: Some(NodeTransaction {
            hash: Default::default(),
            block_number: Some(100),
        }),
        head: 112,
        ..Default::default()
    };
    let service = EvmService::with_node(node, &ETHEREUM, ChainId::ETHEREUM);

    let confirmations = service.confirmations(&format!("0x{}", "ab".repeat(32))).await.unwrap();

    assert_eq!(confirmations, Confirmations::Confirmed(12));
    assert_eq!(confirmations.as_sentinel(), 12);
}

#[tokio::test]
async fn test_confirmations_swallow_node_errors() {
    let node = MockEvmNode {
        lookups_fail: true,
        ..Default::default()
    };
    let service = EvmService::with_node(node, &ETHEREUM, ChainId::ETHEREUM);

    let confirmations = service.confirmations(&format!("0x{}", "ab".repeat(32))).await.unwrap();

    assert_eq!(confirmations, Confirmations::Unknown);
    assert_eq!(confirmations.as_sentinel(), -1);
}

#[tokio::test]
async fn test_confirmations_unknown_for_pending_or_malformed() {
    let pending = MockEvmNode {
        transaction: Some(NodeTransaction {
            hash: Default::default(),
            block_number: None,
        }),
        ..Default::default()
    };
    let service = EvmService::with_node(pending, &ETHEREUM, ChainId::ETHEREUM);

    let txid = format!("0x{}", "cd".repeat(32));
    assert_eq!(service.confirmations(&txid).await.unwrap(), Confirmations::Unknown);
    assert_eq!(service.confirmations("0x1234").await.unwrap(), Confirmations::Unknown);
}

#[tokio::test]
async fn test_created_account_balance() {
    let mut node = MockEvmNode::default();
    let service = EvmService::with_node(node.clone(), &ETHEREUM, ChainId::ETHEREUM);

    let created = service.create_wallet(&WalletTag::new("ignored")).await.unwrap();
    let CreatedWallet::Account(account) = created else {
        panic!("expected a local account");
    };

    node.balances.insert(
        account.evm_address(),
        U256::from(1_500_000_000_000_000_000u128),
    );
    let service = EvmService::with_node(node, &ETHEREUM, ChainId::ETHEREUM);

    let balance = service.balance_of(&account.address()).await.unwrap();
    assert_eq!(balance, Decimal::from_str("1.5").unwrap());
}
