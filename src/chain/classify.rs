//! Transfer intent from per-address transaction details.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::chain::types::{TransferDetail, WalletTag};

const SEND: &str = "send";
const RECEIVE: &str = "receive";

/// Intent of a wallet transaction. Computed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifiedTransfer {
    /// Withdrawal from custody to an external address.
    Send { amount: Decimal },
    /// Deposit from an external address into a tagged wallet.
    Receive {
        tag: Option<String>,
        amount: Decimal,
        address: Option<String>,
    },
    /// Withdrawal from custody into another tagged wallet.
    SendAndReceive {
        tag: Option<String>,
        send_amount: Decimal,
        receive_amount: Decimal,
        address: Option<String>,
    },
    /// Internal sweep from a tagged wallet into custody.
    Transit,
    /// Any other shape (multi-output, no entries, foreign categories).
    Unknown,
}

impl ClassifiedTransfer {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ClassifiedTransfer::Unknown)
    }
}

/// Classify `details` relative to the custody wallet.
///
/// Total: every input produces a value.
pub fn classify(details: &[TransferDetail], custody: &WalletTag) -> ClassifiedTransfer {
    let mut sends = details.iter().filter(|d| d.category == SEND);
    let mut receives = details.iter().filter(|d| d.category == RECEIVE);

    if details
        .iter()
        .any(|d| d.category != SEND && d.category != RECEIVE)
    {
        return ClassifiedTransfer::Unknown;
    }

    let send = match (sends.next(), sends.next()) {
        (one, None) => one,
        _ => return ClassifiedTransfer::Unknown,
    };
    let receive = match (receives.next(), receives.next()) {
        (one, None) => one,
        _ => return ClassifiedTransfer::Unknown,
    };

    match (send, receive) {
        (Some(send), None) => ClassifiedTransfer::Send {
            amount: send.amount,
        },
        (None, Some(receive)) => ClassifiedTransfer::Receive {
            tag: receive.account.clone(),
            amount: receive.amount,
            address: receive.address.clone(),
        },
        (Some(send), Some(receive)) => {
            let is_custody = |d: &TransferDetail| d.account.as_deref() == Some(custody.as_str());
            if is_custody(send) {
                ClassifiedTransfer::SendAndReceive {
                    tag: receive.account.clone(),
                    send_amount: send.amount,
                    receive_amount: receive.amount,
                    address: receive.address.clone(),
                }
            } else if is_custody(receive) {
                ClassifiedTransfer::Transit
            } else {
                ClassifiedTransfer::Unknown
            }
        }
        (None, None) => ClassifiedTransfer::Unknown,
    }
}
