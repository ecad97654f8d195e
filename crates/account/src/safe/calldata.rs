//! Account call data executing a batch of meta-transactions

use crate::error::AccountError;
use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes, U256},
};
use safebatch_contracts::{ExecuteUserOpCall, MultiSendCall};
use safebatch_primitives::{MetaTransaction, Operation};

/// Packs transactions the way `MultiSend.multiSend` expects them:
/// `uint8 operation ++ address to ++ uint256 value ++ uint256 length ++ data` for each transaction.
pub(crate) fn encode_multi_send(transactions: &[MetaTransaction]) -> Bytes {
    let mut packed = Vec::new();
    for tx in transactions {
        let mut word = [0u8; 32];
        packed.push(u8::from(tx.operation));
        packed.extend_from_slice(tx.to.as_bytes());
        tx.value.to_big_endian(&mut word);
        packed.extend_from_slice(&word);
        U256::from(tx.data.len()).to_big_endian(&mut word);
        packed.extend_from_slice(&word);
        packed.extend_from_slice(&tx.data);
    }
    packed.into()
}

/// `executeUserOp` call data of the 4337 module. A single transaction is executed directly,
/// several transactions are delegated to MultiSend.
pub(crate) fn create_account_call_data(
    transactions: &[MetaTransaction],
    multi_send: Address,
) -> Result<Bytes, AccountError> {
    let call = match transactions {
        [] => return Err(AccountError::EmptyBatch),
        [tx] => ExecuteUserOpCall {
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            operation: tx.operation.into(),
        },
        txs => ExecuteUserOpCall {
            to: multi_send,
            value: U256::zero(),
            data: MultiSendCall { transactions: encode_multi_send(txs) }.encode().into(),
            operation: Operation::DelegateCall.into(),
        },
    };
    Ok(call.encode().into())
}

/// Splits packed MultiSend transactions back into meta-transactions
#[cfg(test)]
pub(crate) fn decode_multi_send(mut packed: &[u8]) -> Vec<MetaTransaction> {
    let mut transactions = Vec::new();
    while !packed.is_empty() {
        let operation = if packed[0] == 0 { Operation::Call } else { Operation::DelegateCall };
        let to = Address::from_slice(&packed[1..21]);
        let value = U256::from_big_endian(&packed[21..53]);
        let len = U256::from_big_endian(&packed[53..85]).as_usize();
        let data = Bytes::from(packed[85..85 + len].to_vec());
        transactions.push(MetaTransaction::new(to, value, data).operation(operation));
        packed = &packed[85 + len..];
    }
    transactions
}
