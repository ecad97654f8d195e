use crate::error::AccountError;
use safebatch_primitives::{
    constants::inclusion::{POLL_INTERVAL_MS, TIMEOUT_SECS},
    InclusionReceipt, UserOperationHash,
};
use safebatch_rpc::BundlerApi;
use std::time::Duration;
use tracing::{debug, info};

/// How long and how often to poll the bundler for a receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InclusionWait {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for InclusionWait {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            timeout: Duration::from_secs(TIMEOUT_SECS),
        }
    }
}

/// Pending user operation accepted by a bundler
pub struct SendUserOperationResponse<'a, B: BundlerApi + ?Sized> {
    user_operation_hash: UserOperationHash,
    bundler: &'a B,
}

impl<'a, B: BundlerApi + ?Sized> SendUserOperationResponse<'a, B> {
    pub(crate) fn new(user_operation_hash: UserOperationHash, bundler: &'a B) -> Self {
        Self { user_operation_hash, bundler }
    }

    /// Hash returned by the bundler
    pub fn user_operation_hash(&self) -> UserOperationHash {
        self.user_operation_hash
    }

    /// Waits for inclusion with the default [InclusionWait](InclusionWait)
    pub async fn included(&self) -> Result<InclusionReceipt, AccountError> {
        self.included_with(InclusionWait::default()).await
    }

    /// Polls `eth_getUserOperationReceipt` until a receipt is available.
    ///
    /// Fails with [InclusionTimeout](AccountError::InclusionTimeout) once `wait.timeout` has
    /// elapsed; any RPC error ends the wait immediately. Dropping the future stops polling.
    pub async fn included_with(
        &self,
        wait: InclusionWait,
    ) -> Result<InclusionReceipt, AccountError> {
        let poll = async {
            loop {
                if let Some(receipt) =
                    self.bundler.get_user_operation_receipt(&self.user_operation_hash).await?
                {
                    return Ok::<_, AccountError>(InclusionReceipt::from(receipt));
                }
                debug!("User operation {} not included yet", self.user_operation_hash);
                tokio::time::sleep(wait.poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(wait.timeout, poll).await.map_err(|_| {
            AccountError::InclusionTimeout {
                user_operation_hash: self.user_operation_hash,
                timeout: wait.timeout,
            }
        })??;

        info!(
            "User operation {} included (success: {})",
            self.user_operation_hash,
            receipt.success()
        );
        Ok(receipt)
    }
}
