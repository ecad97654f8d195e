use crate::{
    utils::{parse_address, parse_u256},
    workflow::{ConfigError, WorkflowConfig},
};
use clap::Parser;
use ethers::types::{Address, U256};
use safebatch_account::{InclusionWait, UserOperationOverrides};
use safebatch_primitives::constants::inclusion::{POLL_INTERVAL_MS, TIMEOUT_SECS};
use std::time::Duration;

/// Connection and owner configuration, read from the environment (or `.env`) by default
#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Chain id the user operation is signed for.
    #[clap(long, env = "CHAIN_ID", default_value = "")]
    pub chain_id: String,

    /// Bundler JSON-RPC endpoint.
    #[clap(long, env = "BUNDLER_URL", default_value = "")]
    pub bundler_url: String,

    /// Execution node JSON-RPC endpoint.
    #[clap(long = "node-url", env = "JSON_RPC_NODE_PROVIDER", default_value = "")]
    pub node_url: String,

    /// Address of the Safe owner.
    #[clap(long, env = "PUBLIC_ADDRESS", default_value = "")]
    pub owner: String,

    /// Private key of the Safe owner (hex).
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true, default_value = "")]
    pub private_key: String,
}

impl ConfigArgs {
    /// Validates the arguments into a [WorkflowConfig](WorkflowConfig)
    pub fn config(&self) -> Result<WorkflowConfig, ConfigError> {
        WorkflowConfig::new(
            &self.chain_id,
            &self.bundler_url,
            &self.node_url,
            &self.owner,
            &self.private_key,
        )
    }
}

/// Calls batched into the user operation
#[derive(Debug, Clone, Parser)]
pub struct BatchArgs {
    /// Contract every batched call is sent to.
    #[clap(
        long,
        default_value = "0x9a7af758aE5d7B6aAE84fe4C5Ba67c041dFE5336",
        value_parser = parse_address
    )]
    pub to: Address,

    /// Function signature of the call.
    #[clap(long, default_value = "mint(address)")]
    pub function: String,

    /// Parameter types of the function.
    #[clap(long, num_args = 0.., default_value = "address")]
    pub types: Vec<String>,

    /// Arguments of the call, one per parameter type.
    #[clap(
        long,
        num_args = 0..,
        allow_negative_numbers = true,
        default_value = "0x2f3675Be2999325826e05C8c2178a615d756748d"
    )]
    pub args: Vec<String>,

    /// Wei sent along with every call.
    #[clap(long, default_value = "0", value_parser = parse_u256)]
    pub value: U256,

    /// Number of identical calls in the batch.
    #[clap(long, default_value_t = 2, value_parser = value_parser_count)]
    pub count: usize,
}

fn value_parser_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("{s} is not a positive number of calls")),
        Ok(count) => Ok(count),
    }
}

/// Account selection
#[derive(Debug, Clone, Parser)]
pub struct AccountArgs {
    /// Already deployed Safe account. By default the counterfactual account of the owner is
    /// used (and deployed by the first user operation).
    #[clap(long, value_parser = parse_address)]
    pub account: Option<Address>,

    /// Salt nonce of the counterfactual account.
    #[clap(long, default_value = "0", value_parser = parse_u256)]
    pub salt_nonce: U256,
}

/// Percentage multipliers applied to the node and bundler values (100 keeps them unchanged)
#[derive(Debug, Clone, Parser)]
pub struct MultiplierArgs {
    #[clap(long)]
    pub call_gas_limit_multiplier: Option<u64>,

    #[clap(long)]
    pub verification_gas_limit_multiplier: Option<u64>,

    #[clap(long)]
    pub pre_verification_gas_multiplier: Option<u64>,

    #[clap(long)]
    pub max_fee_per_gas_multiplier: Option<u64>,

    #[clap(long)]
    pub max_priority_fee_per_gas_multiplier: Option<u64>,
}

impl From<&MultiplierArgs> for UserOperationOverrides {
    fn from(args: &MultiplierArgs) -> Self {
        Self {
            call_gas_limit_percentage_multiplier: args.call_gas_limit_multiplier,
            verification_gas_limit_percentage_multiplier: args.verification_gas_limit_multiplier,
            pre_verification_gas_percentage_multiplier: args.pre_verification_gas_multiplier,
            max_fee_per_gas_percentage_multiplier: args.max_fee_per_gas_multiplier,
            max_priority_fee_per_gas_percentage_multiplier: args
                .max_priority_fee_per_gas_multiplier,
            ..Default::default()
        }
    }
}

/// Waiting for inclusion
#[derive(Debug, Clone, Parser)]
pub struct WaitArgs {
    /// Interval between two receipt queries (in milliseconds).
    #[clap(long, default_value_t = POLL_INTERVAL_MS)]
    pub poll_interval: u64,

    /// Time after which waiting for inclusion gives up (in seconds).
    #[clap(long, default_value_t = TIMEOUT_SECS)]
    pub timeout: u64,
}

impl From<&WaitArgs> for InclusionWait {
    fn from(args: &WaitArgs) -> Self {
        Self {
            poll_interval: Duration::from_millis(args.poll_interval),
            timeout: Duration::from_secs(args.timeout),
        }
    }
}
