use crate::error::RpcError;
use async_trait::async_trait;
use ethers::{
    prelude::ContractError,
    providers::Middleware,
    types::{Address, U256},
};
use safebatch_contracts::EntryPoint;
use safebatch_primitives::{decode_revert_string, FeeData};
use std::sync::Arc;
use tracing::debug;

/// Execution node queries needed to assemble a user operation
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Nonce of `sender` (key 0) as tracked by the entry point
    async fn get_nonce(&self, entry_point: &Address, sender: &Address) -> Result<U256, RpcError>;

    /// Current EIP-1559 fee estimate
    async fn get_fee_data(&self) -> Result<FeeData, RpcError>;

    async fn get_chain_id(&self) -> Result<u64, RpcError>;
}

/// [NodeApi](NodeApi) over any `ethers` middleware
#[derive(Clone)]
pub struct EthNode<M: Middleware + 'static> {
    eth_client: Arc<M>,
}

impl<M: Middleware + 'static> EthNode<M> {
    pub fn new(eth_client: Arc<M>) -> Self {
        Self { eth_client }
    }

    pub fn eth_client(&self) -> Arc<M> {
        self.eth_client.clone()
    }

    fn contract_error(err: ContractError<M>) -> RpcError {
        match err {
            ContractError::Revert(data) => RpcError::Node {
                inner: decode_revert_string(&data)
                    .unwrap_or_else(|| format!("execution reverted: {data}")),
            },
            ContractError::DecodingError(e) => RpcError::Decode { inner: e.to_string() },
            ContractError::AbiError(e) => RpcError::Decode { inner: e.to_string() },
            _ => RpcError::Node { inner: err.to_string() },
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> NodeApi for EthNode<M> {
    async fn get_nonce(&self, entry_point: &Address, sender: &Address) -> Result<U256, RpcError> {
        let entry_point = EntryPoint::new(*entry_point, self.eth_client.clone());
        let nonce = entry_point
            .get_nonce(*sender, U256::zero())
            .call()
            .await
            .map_err(Self::contract_error)?;
        debug!("Nonce of {sender:?}: {nonce}");
        Ok(nonce)
    }

    async fn get_fee_data(&self) -> Result<FeeData, RpcError> {
        let (max_fee_per_gas, max_priority_fee_per_gas) = self
            .eth_client
            .estimate_eip1559_fees(None)
            .await
            .map_err(|e| RpcError::Node { inner: e.to_string() })?;
        debug!("Fee data: max fee {max_fee_per_gas}, max priority fee {max_priority_fee_per_gas}");
        Ok(FeeData { max_fee_per_gas, max_priority_fee_per_gas })
    }

    async fn get_chain_id(&self) -> Result<u64, RpcError> {
        let chain_id = self
            .eth_client
            .get_chainid()
            .await
            .map_err(|e| RpcError::Node { inner: e.to_string() })?;
        u64::try_from(chain_id).map_err(|e| RpcError::Decode {
            inner: format!("chain id {chain_id} out of range: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::{
        abi::AbiEncode,
        providers::{MockProvider, Provider},
        types::Bytes,
    };

    fn mocked() -> (EthNode<Provider<MockProvider>>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (EthNode::new(Arc::new(provider)), mock)
    }

    #[tokio::test]
    async fn chain_id() {
        let (node, mock) = mocked();
        mock.push(U256::from(11155111u64)).unwrap();
        assert_eq!(node.get_chain_id().await.unwrap(), 11155111);
    }

    #[tokio::test]
    async fn chain_id_out_of_range_is_decode_error() {
        let (node, mock) = mocked();
        mock.push(U256::MAX).unwrap();
        assert!(matches!(node.get_chain_id().await, Err(RpcError::Decode { .. })));
    }

    #[tokio::test]
    async fn nonce_from_entry_point() {
        let (node, mock) = mocked();
        mock.push::<Bytes, Bytes>(U256::from(5).encode().into()).unwrap();
        let nonce = node.get_nonce(&Address::random(), &Address::random()).await.unwrap();
        assert_eq!(nonce, U256::from(5));
    }
}
