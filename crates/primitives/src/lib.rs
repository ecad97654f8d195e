//! Account abstraction (ERC-4337) primitive types
//!
//! This crate contains the EntryPoint v0.7 user operation, its receipts and gas estimations,
//! the meta-transactions batched into it and helper functions for packing them.

pub mod constants;
mod meta_transaction;
mod user_operation;
mod utils;

pub use meta_transaction::{MetaTransaction, Operation};
pub use user_operation::{
    calculate_user_operation_max_gas_cost, FeeData, InclusionOutcome, InclusionReceipt,
    TransactionReceiptSummary, UserOperation, UserOperationGasEstimation, UserOperationHash,
    UserOperationReceipt,
};
pub use utils::{
    as_checksum_addr, decode_revert_string, pack_factory_data, pack_paymaster_data, pack_uint128,
};
