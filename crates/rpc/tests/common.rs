#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, H256, U256, U64};
use jsonrpsee::{
    core::RpcResult,
    server::{ServerBuilder, ServerHandle},
    types::ErrorObject,
};
use safebatch_primitives::{
    constants::rpc_error_codes::{SIGNATURE, VALIDATION},
    TransactionReceiptSummary, UserOperation, UserOperationGasEstimation, UserOperationHash,
    UserOperationReceipt,
};
use safebatch_rpc::EthApiServer;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

pub const CHAIN_ID: u64 = 11155111;
pub const ENTRY_POINT: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";
pub const TRANSACTION_HASH: &str =
    "0x95418c07086df02ff6bc9e8bdc150b380cb761beecc098630440bcec6e862702";

pub fn entry_point() -> Address {
    ENTRY_POINT.parse().unwrap()
}

/// Bundler state shared between the server and the test
#[derive(Default)]
pub struct DummyBundlerState {
    pub submitted: Vec<UserOperation>,
    /// Receipt queries answered with `null` before a receipt is returned
    pub pending_polls: usize,
    pub receipt_polls: usize,
    pub receipts: HashMap<UserOperationHash, UserOperationReceipt>,
}

#[derive(Clone, Default)]
pub struct DummyBundler {
    pub state: Arc<Mutex<DummyBundlerState>>,
}

#[async_trait]
impl EthApiServer for DummyBundler {
    async fn chain_id(&self) -> RpcResult<U64> {
        Ok(U64::from(CHAIN_ID))
    }

    async fn supported_entry_points(&self) -> RpcResult<Vec<Address>> {
        Ok(vec![entry_point()])
    }

    async fn send_user_operation(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationHash> {
        if user_operation.signature.is_empty() {
            return Err(ErrorObject::owned(
                SIGNATURE,
                "Invalid UserOp signature or paymaster signature",
                None::<bool>,
            ));
        }

        let hash = user_operation.hash(&entry_point, CHAIN_ID);
        let receipt = UserOperationReceipt {
            user_operation_hash: hash,
            entry_point: Some(entry_point),
            sender: user_operation.sender,
            nonce: user_operation.nonce,
            paymaster: None,
            actual_gas_cost: U256::from(21_000) * user_operation.max_fee_per_gas,
            actual_gas_used: U256::from(21_000),
            success: true,
            reason: None,
            logs: vec![],
            tx_receipt: TransactionReceiptSummary {
                transaction_hash: TRANSACTION_HASH.parse::<H256>().unwrap(),
                block_hash: None,
                block_number: Some(16u64.into()),
            },
        };

        let mut state = self.state.lock().unwrap();
        state.submitted.push(user_operation);
        state.receipts.insert(hash, receipt);
        Ok(hash)
    }

    async fn estimate_user_operation_gas(
        &self,
        user_operation: UserOperation,
        _entry_point: Address,
    ) -> RpcResult<UserOperationGasEstimation> {
        if user_operation.call_data.is_empty() {
            return Err(ErrorObject::owned(
                VALIDATION,
                "AA23 reverted",
                Some(serde_json::json!({ "reason": "empty call data" })),
            ));
        }

        Ok(UserOperationGasEstimation {
            pre_verification_gas: 50_000.into(),
            verification_gas_limit: 150_000.into(),
            call_gas_limit: 100_000.into(),
            paymaster_verification_gas_limit: None,
            paymaster_post_op_gas_limit: None,
        })
    }

    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> RpcResult<Option<UserOperationReceipt>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;
        if state.pending_polls > 0 {
            state.pending_polls -= 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&user_operation_hash).cloned())
    }
}

/// Starts the dummy bundler on a random local port
pub async fn start_dummy_bundler(bundler: DummyBundler) -> (SocketAddr, ServerHandle) {
    let server = ServerBuilder::default().build("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.start(bundler.into_rpc());
    (addr, handle)
}
