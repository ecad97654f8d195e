//! Calls batched into a single user operation

use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// How the account executes a meta-transaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl From<Operation> for u8 {
    fn from(value: Operation) -> Self {
        value as u8
    }
}

/// A call the smart account executes as part of a user operation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTransaction {
    /// Target contract (or EOA)
    pub to: Address,
    /// Amount of wei sent along with the call
    pub value: U256,
    /// ABI-encoded call data
    pub data: Bytes,
    #[serde(default)]
    pub operation: Operation,
}

impl MetaTransaction {
    pub fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self { to, value, data, operation: Operation::Call }
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }
}
