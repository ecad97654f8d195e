//! Batch, sign and submit a user operation through a Safe account

use ethers::{
    signers::{LocalWallet, Signer},
    types::{Address, U256},
    utils::{hex, to_checksum},
};
use safebatch_account::{InclusionWait, SafeAccount, SafeInitOptions, UserOperationOverrides};
use safebatch_contracts::{create_call_data, get_function_selector};
use safebatch_primitives::{
    calculate_user_operation_max_gas_cost, InclusionOutcome, InclusionReceipt, MetaTransaction,
};
use safebatch_rpc::{BundlerApi, NodeApi};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Invalid or inconsistent configuration, raised before any network access
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not set")]
    Missing { name: &'static str },

    #[error("{name} {value:?} is not a valid chain id")]
    InvalidChainId { name: &'static str, value: String },

    #[error("{name} {value:?} is not a valid URL: {inner}")]
    InvalidUrl { name: &'static str, value: String, inner: String },

    #[error("{name} {value:?} must be an http(s) URL")]
    UnsupportedScheme { name: &'static str, value: String },

    #[error("{name} {value:?} is not a valid address")]
    InvalidAddress { name: &'static str, value: String },

    #[error("{name} is not a valid private key: {inner}")]
    InvalidPrivateKey { name: &'static str, inner: String },

    #[error("private key belongs to {key_address:?}, not to the owner {owner:?}")]
    KeyMismatch { owner: Address, key_address: Address },
}

/// Validated workflow configuration
#[derive(Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub chain_id: u64,
    pub bundler_url: Url,
    pub node_url: Url,
    pub owner: Address,
    private_key: String,
}

impl fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("chain_id", &self.chain_id)
            .field("bundler_url", &self.bundler_url.as_str())
            .field("node_url", &self.node_url.as_str())
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

fn required<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing { name });
    }
    Ok(value)
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let value = required(name, value)?;
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.into(),
        inner: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme { name, value: value.into() }),
    }
}

impl WorkflowConfig {
    /// Validates the raw values, named after their environment variables in errors
    pub fn new(
        chain_id: &str,
        bundler_url: &str,
        node_url: &str,
        owner: &str,
        private_key: &str,
    ) -> Result<Self, ConfigError> {
        let chain_id = required("CHAIN_ID", chain_id)?;
        let chain_id = chain_id.parse::<u64>().map_err(|_| ConfigError::InvalidChainId {
            name: "CHAIN_ID",
            value: chain_id.into(),
        })?;

        let bundler_url = parse_url("BUNDLER_URL", bundler_url)?;
        let node_url = parse_url("JSON_RPC_NODE_PROVIDER", node_url)?;

        let owner_str = required("PUBLIC_ADDRESS", owner)?;
        let owner = Address::from_str(owner_str).map_err(|_| ConfigError::InvalidAddress {
            name: "PUBLIC_ADDRESS",
            value: owner_str.into(),
        })?;

        let private_key = required("PRIVATE_KEY", private_key)?;
        let wallet = LocalWallet::from_str(private_key).map_err(|e| {
            ConfigError::InvalidPrivateKey { name: "PRIVATE_KEY", inner: e.to_string() }
        })?;
        if wallet.address() != owner {
            return Err(ConfigError::KeyMismatch { owner, key_address: wallet.address() });
        }

        Ok(Self { chain_id, bundler_url, node_url, owner, private_key: private_key.into() })
    }

    pub(crate) fn private_key(&self) -> &str {
        &self.private_key
    }
}

/// What to batch and how to assemble and track the user operation
#[derive(Clone, Debug)]
pub struct WorkflowParams {
    /// Target of every batched call
    pub to: Address,
    /// Human-readable function signature, e.g. `mint(address)`
    pub function: String,
    pub types: Vec<String>,
    pub args: Vec<String>,
    pub value: U256,
    /// Number of identical calls in the batch
    pub count: usize,
    /// Already deployed account, the counterfactual account of the owner otherwise
    pub account: Option<Address>,
    pub salt_nonce: U256,
    pub overrides: UserOperationOverrides,
    pub wait: InclusionWait,
}

/// Account handle the workflow operates on
pub fn safe_account(
    owner: Address,
    account: Option<Address>,
    salt_nonce: U256,
) -> eyre::Result<SafeAccount> {
    let options = SafeInitOptions { salt_nonce, ..Default::default() };
    Ok(match account {
        Some(address) => SafeAccount::new_with(address, options),
        None => SafeAccount::initialize_new_account_with(vec![owner], options)?,
    })
}

/// Fails when the node or the bundler serves another chain than configured
pub async fn check_chain_id<N, B>(
    config: &WorkflowConfig,
    node: &N,
    bundler: &B,
) -> eyre::Result<()>
where
    N: NodeApi + ?Sized,
    B: BundlerApi + ?Sized,
{
    let (node_chain_id, bundler_chain_id) =
        tokio::try_join!(node.get_chain_id(), bundler.chain_id())?;
    if node_chain_id != config.chain_id {
        eyre::bail!("Node chain id {node_chain_id} does not match CHAIN_ID {}", config.chain_id);
    }
    if bundler_chain_id != config.chain_id {
        eyre::bail!(
            "Bundler chain id {bundler_chain_id} does not match CHAIN_ID {}",
            config.chain_id
        );
    }

    let entry_point = SafeInitOptions::default().entry_point;
    match bundler.supported_entry_points().await {
        Ok(entry_points) if !entry_points.contains(&entry_point) => {
            warn!("Bundler does not list entry point {entry_point:?} as supported")
        }
        Ok(_) => {}
        Err(err) => warn!("Could not query the bundler supported entry points: {err}"),
    }
    Ok(())
}

/// Runs the whole workflow: batch `params.count` identical calls, assemble and sign the user
/// operation, submit it and wait for its inclusion.
///
/// A reverted user operation is returned as a receipt, every other failure as an error.
pub async fn run_workflow<N, B>(
    config: &WorkflowConfig,
    params: &WorkflowParams,
    node: &N,
    bundler: &B,
) -> eyre::Result<InclusionReceipt>
where
    N: NodeApi + ?Sized,
    B: BundlerApi + ?Sized,
{
    let account = safe_account(config.owner, params.account, params.salt_nonce)?;
    println!("Account address (sender): {}", to_checksum(&account.address(), None));

    let selector = get_function_selector(&params.function)?;
    println!("{} selector: 0x{}", params.function, hex::encode(selector));
    let call_data = create_call_data(selector, &params.types, &params.args)?;

    let transactions =
        vec![MetaTransaction::new(params.to, params.value, call_data); params.count];

    let mut uo = account
        .create_user_operation(&transactions, node, bundler, params.overrides.clone())
        .await?;

    let cost = calculate_user_operation_max_gas_cost(&uo);
    println!("This user operation may cost up to {cost} wei");
    println!(
        "Please fund the sender account {} with more than {cost} wei",
        to_checksum(&uo.sender, None)
    );

    uo.signature = account.sign_user_operation(&uo, &[config.private_key()], config.chain_id)?;
    println!("{}", serde_json::to_string_pretty(&uo)?);

    let response = account.send_user_operation(&uo, bundler, config.chain_id).await?;
    println!("User operation {} sent. Waiting to be included...", response.user_operation_hash());
    info!("Waiting for inclusion (timeout {:?})", params.wait.timeout);

    let receipt = response.included_with(params.wait).await?;
    println!("User operation receipt received.");
    println!("{receipt:#?}");
    match &receipt.outcome {
        InclusionOutcome::Included { transaction_hash } => {
            println!(
                "{} calls were executed. The transaction hash is {transaction_hash:?}",
                params.count
            )
        }
        InclusionOutcome::Reverted { reason } => {
            println!("User operation execution failed: {reason}")
        }
    }

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::types::H256;
    use safebatch_primitives::{
        FeeData, TransactionReceiptSummary, UserOperation, UserOperationGasEstimation,
        UserOperationHash, UserOperationReceipt,
    };
    use safebatch_rpc::RpcError;
    use std::{sync::Mutex, time::Duration};

    const OWNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const OWNER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn config() -> WorkflowConfig {
        WorkflowConfig::new(
            "11155111",
            "https://bundler.example.com/rpc",
            "http://localhost:8545",
            OWNER,
            OWNER_KEY,
        )
        .unwrap()
    }

    #[test]
    fn valid_config() {
        let config = config();
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.owner, OWNER.parse::<Address>().unwrap());
        assert_eq!(config.node_url.as_str(), "http://localhost:8545/");
        // private key stays out of debug output
        assert!(!format!("{config:?}").contains(OWNER_KEY));

        let prefixed = WorkflowConfig::new(
            " 1 ",
            "http://localhost:3000",
            "http://localhost:8545",
            OWNER,
            &format!("0x{OWNER_KEY}"),
        );
        assert!(prefixed.is_ok());
    }

    #[test]
    fn invalid_config() {
        let new = |chain_id, bundler, node, owner, key| {
            WorkflowConfig::new(chain_id, bundler, node, owner, key).unwrap_err()
        };
        let (bundler, node) = ("http://localhost:3000", "http://localhost:8545");

        assert_eq!(
            new("", bundler, node, OWNER, OWNER_KEY),
            ConfigError::Missing { name: "CHAIN_ID" }
        );
        assert!(matches!(
            new("sepolia", bundler, node, OWNER, OWNER_KEY),
            ConfigError::InvalidChainId { .. }
        ));
        assert!(matches!(
            new("1", "localhost", node, OWNER, OWNER_KEY),
            ConfigError::InvalidUrl { name: "BUNDLER_URL", .. }
        ));
        assert!(matches!(
            new("1", bundler, "ws://localhost:8546", OWNER, OWNER_KEY),
            ConfigError::UnsupportedScheme { name: "JSON_RPC_NODE_PROVIDER", .. }
        ));
        assert!(matches!(
            new("1", bundler, node, "0x1234", OWNER_KEY),
            ConfigError::InvalidAddress { .. }
        ));
        assert!(matches!(
            new("1", bundler, node, OWNER, "0xdead"),
            ConfigError::InvalidPrivateKey { .. }
        ));
        assert!(matches!(
            new("1", bundler, node, OWNER, OTHER_KEY),
            ConfigError::KeyMismatch { .. }
        ));
        assert_eq!(
            new("1", bundler, node, OWNER, " "),
            ConfigError::Missing { name: "PRIVATE_KEY" }
        );
    }

    struct Node {
        chain_id: u64,
    }

    #[async_trait]
    impl NodeApi for Node {
        async fn get_nonce(&self, _: &Address, _: &Address) -> Result<U256, RpcError> {
            Ok(U256::zero())
        }

        async fn get_fee_data(&self) -> Result<FeeData, RpcError> {
            Ok(FeeData { max_fee_per_gas: 10.into(), max_priority_fee_per_gas: 1.into() })
        }

        async fn get_chain_id(&self) -> Result<u64, RpcError> {
            Ok(self.chain_id)
        }
    }

    #[derive(Default)]
    struct Bundler {
        sent: Mutex<Vec<UserOperation>>,
        revert: bool,
        chain_id: Option<u64>,
    }

    #[async_trait]
    impl BundlerApi for Bundler {
        async fn estimate_user_operation_gas(
            &self,
            _: &UserOperation,
            _: &Address,
        ) -> Result<UserOperationGasEstimation, RpcError> {
            Ok(UserOperationGasEstimation {
                pre_verification_gas: 1_000.into(),
                verification_gas_limit: 2_000.into(),
                call_gas_limit: 3_000.into(),
                ..Default::default()
            })
        }

        async fn send_user_operation(
            &self,
            uo: &UserOperation,
            entry_point: &Address,
        ) -> Result<UserOperationHash, RpcError> {
            self.sent.lock().unwrap().push(uo.clone());
            Ok(uo.hash(entry_point, 11155111))
        }

        async fn get_user_operation_receipt(
            &self,
            hash: &UserOperationHash,
        ) -> Result<Option<UserOperationReceipt>, RpcError> {
            Ok(Some(UserOperationReceipt {
                user_operation_hash: *hash,
                entry_point: None,
                sender: Address::zero(),
                nonce: U256::zero(),
                paymaster: None,
                actual_gas_cost: 60_000.into(),
                actual_gas_used: 6_000.into(),
                success: !self.revert,
                reason: None,
                logs: vec![],
                tx_receipt: TransactionReceiptSummary {
                    transaction_hash: H256::repeat_byte(0xaa),
                    ..Default::default()
                },
            }))
        }

        async fn supported_entry_points(&self) -> Result<Vec<Address>, RpcError> {
            Ok(vec![SafeInitOptions::default().entry_point])
        }

        async fn chain_id(&self) -> Result<u64, RpcError> {
            Ok(self.chain_id.unwrap_or(11155111))
        }
    }

    fn params() -> WorkflowParams {
        WorkflowParams {
            to: "0x9a7af758aE5d7B6aAE84fe4C5Ba67c041dFE5336".parse().unwrap(),
            function: "mint(address)".into(),
            types: vec!["address".into()],
            args: vec!["0x2f3675Be2999325826e05C8c2178a615d756748d".into()],
            value: U256::zero(),
            count: 2,
            account: None,
            salt_nonce: U256::zero(),
            overrides: Default::default(),
            wait: InclusionWait {
                poll_interval: Duration::from_millis(5),
                timeout: Duration::from_secs(1),
            },
        }
    }

    #[tokio::test]
    async fn chain_id_mismatch() {
        let config = config();
        assert!(check_chain_id(&config, &Node { chain_id: 11155111 }, &Bundler::default())
            .await
            .is_ok());
        assert!(check_chain_id(&config, &Node { chain_id: 1 }, &Bundler::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn bundler_chain_id_mismatch() {
        let bundler = Bundler { chain_id: Some(1), ..Default::default() };
        let err = check_chain_id(&config(), &Node { chain_id: 11155111 }, &bundler)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Bundler chain id 1"));
    }

    #[tokio::test]
    async fn end_to_end() {
        let bundler = Bundler::default();
        let node = Node { chain_id: 11155111 };
        let receipt = run_workflow(&config(), &params(), &node, &bundler).await.unwrap();

        assert!(receipt.success());
        assert_eq!(receipt.transaction_hash(), Some(H256::repeat_byte(0xaa)));

        let sent = bundler.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].is_signed());
        assert!(sent[0].factory.is_some());
        assert_eq!(
            sent[0].sender,
            safe_account(OWNER.parse().unwrap(), None, U256::zero()).unwrap().address()
        );
    }

    #[tokio::test]
    async fn end_to_end_reverted() {
        let bundler = Bundler { revert: true, ..Default::default() };
        let node = Node { chain_id: 11155111 };
        let receipt = run_workflow(&config(), &params(), &node, &bundler).await.unwrap();

        assert!(!receipt.success());
        assert_eq!(receipt.transaction_hash(), None);
        assert!(!receipt.failure_reason().unwrap().is_empty());
    }

    #[tokio::test]
    async fn encoding_error_stops_before_submission() {
        let bundler = Bundler::default();
        let params = WorkflowParams { function: "mint(address".into(), ..params() };
        assert!(run_workflow(&config(), &params, &Node { chain_id: 11155111 }, &bundler)
            .await
            .is_err());
        assert!(bundler.sent.lock().unwrap().is_empty());
    }
}
