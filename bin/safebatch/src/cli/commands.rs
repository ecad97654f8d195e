use super::args::{AccountArgs, BatchArgs, ConfigArgs, MultiplierArgs, WaitArgs};
use crate::{
    utils::{create_http_provider, parse_address},
    workflow::{check_chain_id, run_workflow, safe_account, WorkflowParams},
};
use clap::Parser;
use ethers::{
    types::Address,
    utils::{hex, to_checksum},
};
use safebatch_contracts::get_function_selector;
use safebatch_rpc::{EthNode, HttpBundler};
use std::sync::Arc;
use tracing::info;

/// Print the counterfactual address of the owner's Safe account
#[derive(Debug, Parser)]
pub struct AddressCommand {
    /// Address of the Safe owner.
    #[clap(long, env = "PUBLIC_ADDRESS", value_parser = parse_address)]
    owner: Address,

    /// Account selection
    #[clap(flatten)]
    account: AccountArgs,
}

impl AddressCommand {
    /// Execute the command
    pub fn execute(self) -> eyre::Result<()> {
        let account = safe_account(self.owner, self.account.account, self.account.salt_nonce)?;
        println!("{}", to_checksum(&account.address(), None));
        Ok(())
    }
}

/// Print the selector of a function signature
#[derive(Debug, Parser)]
pub struct SelectorCommand {
    /// Function signature, e.g. `mint(address)`
    signature: String,
}

impl SelectorCommand {
    /// Execute the command
    pub fn execute(self) -> eyre::Result<()> {
        let selector = get_function_selector(&self.signature)?;
        println!("0x{}", hex::encode(selector));
        Ok(())
    }
}

/// Batch calls into a user operation, sign it, send it to the bundler and wait for inclusion
#[derive(Debug, Parser)]
pub struct SendCommand {
    /// Connection and owner configuration
    #[clap(flatten)]
    config: ConfigArgs,

    /// Batched calls
    #[clap(flatten)]
    batch: BatchArgs,

    /// Account selection
    #[clap(flatten)]
    account: AccountArgs,

    /// Gas and fee multipliers
    #[clap(flatten)]
    multipliers: MultiplierArgs,

    /// Inclusion wait
    #[clap(flatten)]
    wait: WaitArgs,
}

impl SendCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let config = self.config.config()?;
        info!("Starting with {config:?}");

        let eth_client = Arc::new(create_http_provider(config.node_url.as_str())?);
        let node = EthNode::new(eth_client);
        let bundler = HttpBundler::new(config.bundler_url.as_str())?;

        check_chain_id(&config, &node, &bundler).await?;

        let params = WorkflowParams {
            to: self.batch.to,
            function: self.batch.function,
            types: self.batch.types,
            args: self.batch.args,
            value: self.batch.value,
            count: self.batch.count,
            account: self.account.account,
            salt_nonce: self.account.salt_nonce,
            overrides: (&self.multipliers).into(),
            wait: (&self.wait).into(),
        };
        run_workflow(&config, &params, &node, &bundler).await?;

        Ok(())
    }
}
