//! Basic transaction type for account abstraction (ERC-4337), EntryPoint v0.7 flavour

mod hash;
mod receipt;

use crate::utils::{
    as_checksum_addr, as_checksum_addr_opt, pack_factory_data, pack_paymaster_data, pack_uint128,
};
use ethers::{
    abi::{encode, Token},
    types::{Address, Bytes, H256, U256},
    utils::keccak256,
};
pub use hash::UserOperationHash;
pub use receipt::{
    InclusionOutcome, InclusionReceipt, TransactionReceiptSummary, UserOperationReceipt,
};
use serde::{Deserialize, Serialize};

fn is_empty_bytes(bytes: &Bytes) -> bool {
    bytes.is_empty()
}

/// User operation as exchanged with bundlers (unpacked EntryPoint v0.7 form)
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// Sender of the user operation (the smart account)
    #[serde(serialize_with = "as_checksum_addr")]
    pub sender: Address,

    /// Nonce (anti replay protection)
    pub nonce: U256,

    /// Factory deploying the account (only for the first user operation of an account)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_checksum_addr_opt"
    )]
    pub factory: Option<Address>,

    /// Call data passed to the factory
    #[serde(default, skip_serializing_if = "is_empty_bytes")]
    pub factory_data: Bytes,

    /// The data that is passed to the sender during the main execution call
    pub call_data: Bytes,

    /// The amount of gas to allocate for the main execution call
    pub call_gas_limit: U256,

    /// The amount of gas to allocate for the verification step
    pub verification_gas_limit: U256,

    /// The amount of gas to pay bundler to compensate for the pre-verification execution and
    /// calldata
    pub pre_verification_gas: U256,

    /// Maximum fee per gas (similar to EIP-1559)
    pub max_fee_per_gas: U256,

    /// Maximum priority fee per gas (similar to EIP-1559)
    pub max_priority_fee_per_gas: U256,

    /// Paymaster sponsoring the user operation
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_checksum_addr_opt"
    )]
    pub paymaster: Option<Address>,

    #[serde(default, skip_serializing_if = "U256::is_zero")]
    pub paymaster_verification_gas_limit: U256,

    #[serde(default, skip_serializing_if = "U256::is_zero")]
    pub paymaster_post_op_gas_limit: U256,

    #[serde(default, skip_serializing_if = "is_empty_bytes")]
    pub paymaster_data: Bytes,

    /// Data passed to the account along with the nonce during the verification step
    pub signature: Bytes,
}

impl UserOperation {
    /// Legacy `initCode` (factory address followed by factory data)
    pub fn init_code(&self) -> Bytes {
        match self.factory {
            Some(factory) => pack_factory_data(factory, &self.factory_data).into(),
            None => Bytes::default(),
        }
    }

    /// Legacy `paymasterAndData` (paymaster address, both paymaster gas limits, paymaster data)
    pub fn paymaster_and_data(&self) -> Bytes {
        match self.paymaster {
            Some(paymaster) => pack_paymaster_data(
                paymaster,
                self.paymaster_verification_gas_limit,
                self.paymaster_post_op_gas_limit,
                &self.paymaster_data,
            )
            .into(),
            None => Bytes::default(),
        }
    }

    /// Whether a signature has been attached
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Packs the user operation without signature (`PackedUserOperation` minus the signature)
    pub fn pack_without_signature(&self) -> Bytes {
        encode(&[
            Token::Address(self.sender),
            Token::Uint(self.nonce),
            Token::FixedBytes(keccak256(self.init_code()).to_vec()),
            Token::FixedBytes(keccak256(&self.call_data).to_vec()),
            Token::FixedBytes(
                pack_uint128(self.verification_gas_limit, self.call_gas_limit).to_vec(),
            ),
            Token::Uint(self.pre_verification_gas),
            Token::FixedBytes(
                pack_uint128(self.max_priority_fee_per_gas, self.max_fee_per_gas).to_vec(),
            ),
            Token::FixedBytes(keccak256(self.paymaster_and_data()).to_vec()),
        ])
        .into()
    }

    /// Calculates the hash of the user operation, as computed by the entry point
    pub fn hash(&self, entry_point: &Address, chain_id: u64) -> UserOperationHash {
        H256::from(keccak256(encode(&[
            Token::FixedBytes(keccak256(self.pack_without_signature()).to_vec()),
            Token::Address(*entry_point),
            Token::Uint(U256::from(chain_id)),
        ])))
        .into()
    }

    /// Maximum amount of wei the user operation may cost
    pub fn max_gas_cost(&self) -> U256 {
        calculate_user_operation_max_gas_cost(self)
    }

    // Builder pattern helpers

    /// Sets the sender of the user operation
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Sets the nonce of the user operation
    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the factory and factory data of the user operation
    pub fn factory(mut self, factory: Option<Address>, factory_data: Bytes) -> Self {
        self.factory = factory;
        self.factory_data = factory_data;
        self
    }

    /// Sets the call data of the user operation
    pub fn call_data(mut self, call_data: Bytes) -> Self {
        self.call_data = call_data;
        self
    }

    /// Sets the call gas limit of the user operation
    pub fn call_gas_limit(mut self, call_gas_limit: U256) -> Self {
        self.call_gas_limit = call_gas_limit;
        self
    }

    /// Sets the verification gas limit of the user operation
    pub fn verification_gas_limit(mut self, verification_gas_limit: U256) -> Self {
        self.verification_gas_limit = verification_gas_limit;
        self
    }

    /// Sets the pre-verification gas of the user operation
    pub fn pre_verification_gas(mut self, pre_verification_gas: U256) -> Self {
        self.pre_verification_gas = pre_verification_gas;
        self
    }

    /// Sets the max fee per gas of the user operation
    pub fn max_fee_per_gas(mut self, max_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = max_fee_per_gas;
        self
    }

    /// Sets the max priority fee per gas of the user operation
    pub fn max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: U256) -> Self {
        self.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    /// Sets the paymaster fields of the user operation
    pub fn paymaster(
        mut self,
        paymaster: Option<Address>,
        verification_gas_limit: U256,
        post_op_gas_limit: U256,
        paymaster_data: Bytes,
    ) -> Self {
        self.paymaster = paymaster;
        self.paymaster_verification_gas_limit = verification_gas_limit;
        self.paymaster_post_op_gas_limit = post_op_gas_limit;
        self.paymaster_data = paymaster_data;
        self
    }

    /// Sets the signature of the user operation
    pub fn signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }
}

/// Pessimistic upper bound of what the user operation costs: every gas field is assumed to be
/// fully consumed at the max fee per gas.
pub fn calculate_user_operation_max_gas_cost(uo: &UserOperation) -> U256 {
    let gas = uo
        .call_gas_limit
        .saturating_add(uo.verification_gas_limit)
        .saturating_add(uo.pre_verification_gas)
        .saturating_add(uo.paymaster_verification_gas_limit)
        .saturating_add(uo.paymaster_post_op_gas_limit);
    gas.saturating_mul(uo.max_fee_per_gas)
}

/// Gas estimations for user operation (returned from the RPC endpoint eth_estimateUserOperationGas)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationGasEstimation {
    pub pre_verification_gas: U256,
    pub verification_gas_limit: U256,
    pub call_gas_limit: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,
}

/// EIP-1559 fee data reported by the node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeData {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}
