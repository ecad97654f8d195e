use crate::{bundler_api::EthApiClient, error::RpcError};
use async_trait::async_trait;
use ethers::types::Address;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use safebatch_primitives::{
    UserOperation, UserOperationGasEstimation, UserOperationHash, UserOperationReceipt,
};
use tracing::debug;

/// Bundler endpoints used to estimate, submit and track user operations
#[async_trait]
pub trait BundlerApi: Send + Sync {
    async fn estimate_user_operation_gas(
        &self,
        user_operation: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationGasEstimation, RpcError>;

    async fn send_user_operation(
        &self,
        user_operation: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationHash, RpcError>;

    /// `None` until the user operation is included
    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: &UserOperationHash,
    ) -> Result<Option<UserOperationReceipt>, RpcError>;

    async fn supported_entry_points(&self) -> Result<Vec<Address>, RpcError>;

    async fn chain_id(&self) -> Result<u64, RpcError>;
}

/// [BundlerApi](BundlerApi) over JSON-RPC (HTTP)
#[derive(Clone)]
pub struct HttpBundler {
    url: String,
    client: HttpClient,
}

impl HttpBundler {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let url = url.into();
        let client = HttpClientBuilder::default().build(&url)?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BundlerApi for HttpBundler {
    async fn estimate_user_operation_gas(
        &self,
        user_operation: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationGasEstimation, RpcError> {
        debug!("eth_estimateUserOperationGas for sender {:?}", user_operation.sender);
        let estimation = EthApiClient::estimate_user_operation_gas(
            &self.client,
            user_operation.clone(),
            *entry_point,
        )
        .await?;
        debug!("Gas estimation: {estimation:?}");
        Ok(estimation)
    }

    async fn send_user_operation(
        &self,
        user_operation: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationHash, RpcError> {
        debug!("eth_sendUserOperation for sender {:?}", user_operation.sender);
        Ok(EthApiClient::send_user_operation(&self.client, user_operation.clone(), *entry_point)
            .await?)
    }

    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: &UserOperationHash,
    ) -> Result<Option<UserOperationReceipt>, RpcError> {
        debug!("eth_getUserOperationReceipt for {user_operation_hash}");
        Ok(EthApiClient::get_user_operation_receipt(&self.client, *user_operation_hash).await?)
    }

    async fn supported_entry_points(&self) -> Result<Vec<Address>, RpcError> {
        Ok(EthApiClient::supported_entry_points(&self.client).await?)
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(EthApiClient::chain_id(&self.client).await?.as_u64())
    }
}
