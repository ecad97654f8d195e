//! Counterfactual address of a Safe proxy

use super::SafeInitOptions;
use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes, H256, U256},
    utils::{get_create2_address_from_hash, keccak256},
};
use safebatch_contracts::{CreateProxyWithNonceCall, EnableModulesCall, SetupCall};

/// `Safe.setup` call enabling the 4337 module and installing it as fallback handler
pub(crate) fn setup_initializer(owners: &[Address], options: &SafeInitOptions) -> Bytes {
    let enable_modules = EnableModulesCall { modules: vec![options.safe_4337_module] };

    SetupCall {
        owners: owners.to_vec(),
        threshold: U256::from(options.threshold),
        to: options.module_setup,
        data: enable_modules.encode().into(),
        fallback_handler: options.safe_4337_module,
        payment_token: Address::zero(),
        payment: U256::zero(),
        payment_receiver: Address::zero(),
    }
    .encode()
    .into()
}

/// Call data passed to the proxy factory when the account is deployed
pub(crate) fn factory_data(initializer: &Bytes, options: &SafeInitOptions) -> Bytes {
    CreateProxyWithNonceCall {
        singleton: options.singleton,
        initializer: initializer.clone(),
        salt_nonce: options.salt_nonce,
    }
    .encode()
    .into()
}

/// Address the proxy factory deploys `initializer` to with CREATE2
pub(crate) fn proxy_address(initializer: &Bytes, options: &SafeInitOptions) -> Address {
    let mut salt_nonce = [0u8; 32];
    options.salt_nonce.to_big_endian(&mut salt_nonce);
    let salt = keccak256([keccak256(initializer).as_slice(), salt_nonce.as_slice()].concat());

    let deployment_code = [
        options.proxy_creation_code.as_ref(),
        H256::from(options.singleton).as_bytes(),
    ]
    .concat();

    get_create2_address_from_hash(options.proxy_factory, salt, keccak256(deployment_code))
}
