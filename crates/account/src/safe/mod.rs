//! Safe smart account (Safe 1.4.1 with the Safe4337Module 0.3.0)

mod address;
mod calldata;
mod signature;

use crate::{
    error::AccountError,
    overrides::{resolve, UserOperationOverrides},
    submission::SendUserOperationResponse,
};
use ethers::types::{Address, Bytes, H256, U256};
use lazy_static::lazy_static;
use safebatch_primitives::{
    constants::{
        entry_point,
        safe::{
            MODULE_SETUP, MULTI_SEND, PROXY_CREATION_CODE, PROXY_FACTORY, SAFE_4337_MODULE,
            SINGLETON,
        },
        user_operation::{
            CALL_GAS_LIMIT_PERCENTAGE, MAX_FEE_PER_GAS_PERCENTAGE,
            MAX_PRIORITY_FEE_PER_GAS_PERCENTAGE, PRE_VERIFICATION_GAS_PERCENTAGE,
            VERIFICATION_GAS_LIMIT_PERCENTAGE,
        },
    },
    FeeData, MetaTransaction, UserOperation,
};
use safebatch_rpc::{BundlerApi, NodeApi};
use std::{fmt::Debug, str::FromStr};
use tracing::{debug, info, warn};

fn constant<T: FromStr>(value: &str) -> T
where
    T::Err: Debug,
{
    value.parse().expect("invalid built-in constant")
}

lazy_static! {
    static ref DEFAULT_INIT_OPTIONS: SafeInitOptions = SafeInitOptions {
        threshold: 1,
        salt_nonce: U256::zero(),
        entry_point: constant(entry_point::ADDRESS),
        singleton: constant(SINGLETON),
        proxy_factory: constant(PROXY_FACTORY),
        safe_4337_module: constant(SAFE_4337_MODULE),
        module_setup: constant(MODULE_SETUP),
        multi_send: constant(MULTI_SEND),
        proxy_creation_code: constant(PROXY_CREATION_CODE),
    };
}

/// Parameters of a Safe deployment and the contracts the account works with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeInitOptions {
    /// Number of owner signatures required
    pub threshold: u64,
    pub salt_nonce: U256,
    pub entry_point: Address,
    pub singleton: Address,
    pub proxy_factory: Address,
    pub safe_4337_module: Address,
    pub module_setup: Address,
    pub multi_send: Address,
    /// Creation code of the proxy deployed by `proxy_factory`
    pub proxy_creation_code: Bytes,
}

impl Default for SafeInitOptions {
    fn default() -> Self {
        DEFAULT_INIT_OPTIONS.clone()
    }
}

/// Handle of a Safe smart account, deployed or not
#[derive(Clone, Debug)]
pub struct SafeAccount {
    address: Address,
    factory: Option<Address>,
    factory_data: Bytes,
    options: SafeInitOptions,
}

impl SafeAccount {
    /// Wraps an already deployed account
    pub fn new(address: Address) -> Self {
        Self::new_with(address, SafeInitOptions::default())
    }

    /// Wraps an already deployed account using non-default contracts (or threshold)
    pub fn new_with(address: Address, options: SafeInitOptions) -> Self {
        Self { address, factory: None, factory_data: Bytes::default(), options }
    }

    /// Counterfactual account owned by `owners` (threshold 1, salt nonce 0)
    pub fn initialize_new_account(owners: Vec<Address>) -> Result<Self, AccountError> {
        Self::initialize_new_account_with(owners, SafeInitOptions::default())
    }

    /// Counterfactual account owned by `owners`. No network access: the address is derived from
    /// the `Safe.setup` initializer, the salt nonce and the proxy creation code.
    pub fn initialize_new_account_with(
        owners: Vec<Address>,
        options: SafeInitOptions,
    ) -> Result<Self, AccountError> {
        if options.threshold == 0 || options.threshold as usize > owners.len() {
            return Err(AccountError::InvalidThreshold {
                threshold: options.threshold,
                owners: owners.len(),
            });
        }

        let initializer = address::setup_initializer(&owners, &options);
        let account_address = address::proxy_address(&initializer, &options);
        let factory_data = address::factory_data(&initializer, &options);
        debug!("Safe account {account_address:?} for owners {owners:?}");

        Ok(Self {
            address: account_address,
            factory: Some(options.proxy_factory),
            factory_data,
            options,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Proxy factory, only for accounts created by `initialize_new_account*`
    pub fn factory(&self) -> Option<Address> {
        self.factory
    }

    pub fn factory_data(&self) -> &Bytes {
        &self.factory_data
    }

    pub fn entry_point(&self) -> Address {
        self.options.entry_point
    }

    pub fn options(&self) -> &SafeInitOptions {
        &self.options
    }

    /// Account call data executing `transactions` in the supplied order
    pub fn create_account_call_data(
        &self,
        transactions: &[MetaTransaction],
    ) -> Result<Bytes, AccountError> {
        calldata::create_account_call_data(transactions, self.options.multi_send)
    }

    /// Builds the unsigned user operation executing `transactions`.
    ///
    /// The nonce and the fee data are fetched from the node concurrently, the gas limits are
    /// estimated by the bundler with a dummy signature. Values given in `overrides` replace what
    /// would be fetched; errors of either endpoint are returned as is.
    pub async fn create_user_operation<N, B>(
        &self,
        transactions: &[MetaTransaction],
        node: &N,
        bundler: &B,
        overrides: UserOperationOverrides,
    ) -> Result<UserOperation, AccountError>
    where
        N: NodeApi + ?Sized,
        B: BundlerApi + ?Sized,
    {
        let call_data = match overrides.call_data.clone() {
            Some(call_data) => call_data,
            None => self.create_account_call_data(transactions)?,
        };

        let nonce = async {
            match overrides.nonce {
                Some(nonce) => Ok(nonce),
                None => node.get_nonce(&self.options.entry_point, &self.address).await,
            }
        };
        let fee_data = async {
            if overrides.has_fees() {
                Ok(FeeData::default())
            } else {
                node.get_fee_data().await
            }
        };
        let (nonce, fee_data) = tokio::try_join!(nonce, fee_data)?;

        let mut uo = UserOperation::default()
            .sender(self.address)
            .nonce(nonce)
            .call_data(call_data)
            .max_fee_per_gas(resolve(
                overrides.max_fee_per_gas,
                fee_data.max_fee_per_gas,
                overrides.max_fee_per_gas_percentage_multiplier,
                MAX_FEE_PER_GAS_PERCENTAGE,
            ))
            .max_priority_fee_per_gas(resolve(
                overrides.max_priority_fee_per_gas,
                fee_data.max_priority_fee_per_gas,
                overrides.max_priority_fee_per_gas_percentage_multiplier,
                MAX_PRIORITY_FEE_PER_GAS_PERCENTAGE,
            ));

        // the account is deployed by its first user operation
        if nonce.is_zero() && self.factory.is_some() {
            uo = uo.factory(self.factory, self.factory_data.clone());
        }

        let estimation = if overrides.has_gas_limits() {
            Default::default()
        } else {
            let estimation_uo = uo.clone().signature(self.dummy_signature()?);
            bundler.estimate_user_operation_gas(&estimation_uo, &self.options.entry_point).await?
        };

        let uo = uo
            .call_gas_limit(resolve(
                overrides.call_gas_limit,
                estimation.call_gas_limit,
                overrides.call_gas_limit_percentage_multiplier,
                CALL_GAS_LIMIT_PERCENTAGE,
            ))
            .verification_gas_limit(resolve(
                overrides.verification_gas_limit,
                estimation.verification_gas_limit,
                overrides.verification_gas_limit_percentage_multiplier,
                VERIFICATION_GAS_LIMIT_PERCENTAGE,
            ))
            .pre_verification_gas(resolve(
                overrides.pre_verification_gas,
                estimation.pre_verification_gas,
                overrides.pre_verification_gas_percentage_multiplier,
                PRE_VERIFICATION_GAS_PERCENTAGE,
            ));

        info!(
            "User operation for {:?} assembled (nonce {}, {} transaction(s))",
            self.address,
            uo.nonce,
            transactions.len()
        );
        Ok(uo)
    }

    /// Placeholder signature with one ECDSA signature per required owner
    pub fn dummy_signature(&self) -> Result<Bytes, AccountError> {
        signature::dummy_signature(self.options.threshold)
    }

    /// EIP-712 `SafeOp` hash the owners sign
    pub fn get_user_operation_hash(
        &self,
        uo: &UserOperation,
        chain_id: u64,
        valid_after: u64,
        valid_until: u64,
    ) -> H256 {
        signature::safe_operation_hash(
            uo,
            chain_id,
            self.options.safe_4337_module,
            self.options.entry_point,
            valid_after,
            valid_until,
        )
    }

    /// Signs `uo` with every private key, without validity bounds.
    ///
    /// The signature is returned, not assigned to the user operation.
    pub fn sign_user_operation<K: AsRef<str>>(
        &self,
        uo: &UserOperation,
        private_keys: &[K],
        chain_id: u64,
    ) -> Result<Bytes, AccountError> {
        self.sign_user_operation_with_validity(uo, private_keys, chain_id, 0, 0)
    }

    /// Signs `uo` with every private key, valid between `valid_after` and `valid_until`
    /// (timestamps, `0` meaning unbounded)
    pub fn sign_user_operation_with_validity<K: AsRef<str>>(
        &self,
        uo: &UserOperation,
        private_keys: &[K],
        chain_id: u64,
        valid_after: u64,
        valid_until: u64,
    ) -> Result<Bytes, AccountError> {
        let hash = self.get_user_operation_hash(uo, chain_id, valid_after, valid_until);
        signature::sign_safe_operation_hash(hash, private_keys, valid_after, valid_until)
    }

    /// Submits a signed user operation. Unsigned operations are rejected before contacting the
    /// bundler.
    pub async fn send_user_operation<'a, B: BundlerApi + ?Sized>(
        &self,
        uo: &UserOperation,
        bundler: &'a B,
        chain_id: u64,
    ) -> Result<SendUserOperationResponse<'a, B>, AccountError> {
        if !uo.is_signed() {
            return Err(AccountError::MissingSignature);
        }

        let user_operation_hash =
            bundler.send_user_operation(uo, &self.options.entry_point).await?;

        let expected = uo.hash(&self.options.entry_point, chain_id);
        if expected != user_operation_hash {
            warn!(
                "Bundler returned user operation hash {user_operation_hash}, expected {expected}"
            );
        }
        info!("User operation {user_operation_hash} sent");

        Ok(SendUserOperationResponse::new(user_operation_hash, bundler))
    }
}
