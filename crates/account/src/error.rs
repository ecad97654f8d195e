use ethers::types::Address;
use safebatch_contracts::CallDataError;
use safebatch_primitives::UserOperationHash;
use safebatch_rpc::RpcError;
use std::time::Duration;
use thiserror::Error;

/// Errors of the Safe account workflow
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    CallData(#[from] CallDataError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// No meta-transaction to batch
    #[error("at least one transaction is required")]
    EmptyBatch,

    #[error("threshold {threshold} is invalid for {owners} owner(s)")]
    InvalidThreshold { threshold: u64, owners: usize },

    #[error("at least one private key is required to sign")]
    NoSigners,

    #[error("invalid private key: {inner}")]
    InvalidPrivateKey { inner: String },

    #[error("signer {signer:?} supplied more than once")]
    DuplicateSigner { signer: Address },

    /// Validity bounds are `uint48` timestamps
    #[error("validity bound {value} does not fit in 48 bits")]
    InvalidValidity { value: u64 },

    #[error("signing error: {inner}")]
    Signing { inner: String },

    /// User operation was about to be submitted without a signature
    #[error("user operation is not signed")]
    MissingSignature,

    #[error("user operation {user_operation_hash} not included after {timeout:?}")]
    InclusionTimeout { user_operation_hash: UserOperationHash, timeout: Duration },
}
