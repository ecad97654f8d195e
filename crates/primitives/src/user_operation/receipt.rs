//! Receipts of included user operations

use super::UserOperationHash;
use crate::utils::decode_revert_string;
use ethers::types::{Address, Bytes, Log, H256, U256, U64};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Failure detail used when the bundler reports a revert without any reason
const UNKNOWN_REVERT_REASON: &str = "user operation execution reverted without a reason";

/// Subset of the bundle transaction receipt attached to a user operation receipt
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceiptSummary {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default)]
    pub block_number: Option<U64>,
}

/// Receipt of the user operation (returned from the RPC endpoint eth_getUserOperationReceipt)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    #[serde(rename = "userOpHash")]
    pub user_operation_hash: UserOperationHash,
    #[serde(default)]
    pub entry_point: Option<Address>,
    pub sender: Address,
    pub nonce: U256,
    #[serde(default)]
    pub paymaster: Option<Address>,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
    pub success: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub logs: Vec<Log>,
    #[serde(rename = "receipt")]
    pub tx_receipt: TransactionReceiptSummary,
}

/// Terminal outcome of a user operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InclusionOutcome {
    /// Executed successfully in the given bundle transaction
    Included { transaction_hash: H256 },
    /// Included on-chain but the account execution reverted
    Reverted { reason: String },
}

/// Result of waiting for a submitted user operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionReceipt {
    pub user_operation_hash: UserOperationHash,
    pub outcome: InclusionOutcome,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
}

impl InclusionReceipt {
    pub fn success(&self) -> bool {
        matches!(self.outcome, InclusionOutcome::Included { .. })
    }

    /// Bundle transaction hash, only present on success
    pub fn transaction_hash(&self) -> Option<H256> {
        match self.outcome {
            InclusionOutcome::Included { transaction_hash } => Some(transaction_hash),
            InclusionOutcome::Reverted { .. } => None,
        }
    }

    /// Failure detail, only present when the execution reverted
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            InclusionOutcome::Included { .. } => None,
            InclusionOutcome::Reverted { reason } => Some(reason),
        }
    }
}

/// Bundlers either forward the raw revert data or an already decoded message.
fn revert_reason(reason: Option<String>) -> String {
    let reason = match reason {
        Some(reason) if !reason.trim().is_empty() => reason,
        _ => return UNKNOWN_REVERT_REASON.into(),
    };

    match Bytes::from_str(&reason) {
        Ok(data) if data.is_empty() => UNKNOWN_REVERT_REASON.into(),
        Ok(data) => decode_revert_string(&data).unwrap_or(reason),
        Err(_) => reason,
    }
}

impl From<UserOperationReceipt> for InclusionReceipt {
    fn from(receipt: UserOperationReceipt) -> Self {
        let outcome = if receipt.success {
            InclusionOutcome::Included { transaction_hash: receipt.tx_receipt.transaction_hash }
        } else {
            InclusionOutcome::Reverted { reason: revert_reason(receipt.reason) }
        };

        Self {
            user_operation_hash: receipt.user_operation_hash,
            outcome,
            actual_gas_cost: receipt.actual_gas_cost,
            actual_gas_used: receipt.actual_gas_used,
        }
    }
}
