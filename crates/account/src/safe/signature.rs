//! EIP-712 `SafeOp` hash and owner signatures of the Safe4337Module

use crate::error::AccountError;
use ethers::{
    abi::{encode, Token},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, H256, U256},
    utils::{hex, keccak256},
};
use lazy_static::lazy_static;
use safebatch_primitives::{
    constants::safe::{DOMAIN_TYPE, DUMMY_ECDSA_SIGNATURE, SAFE_OP_TYPE},
    UserOperation,
};
use std::str::FromStr;

/// Largest `uint48` timestamp
pub(crate) const MAX_VALIDITY: u64 = (1 << 48) - 1;

lazy_static! {
    static ref DOMAIN_TYPEHASH: [u8; 32] = keccak256(DOMAIN_TYPE);
    static ref SAFE_OP_TYPEHASH: [u8; 32] = keccak256(SAFE_OP_TYPE);
}

/// Validity window prepended to the owner signatures (`uint48 validAfter ++ uint48 validUntil`)
pub(crate) fn validity_prefix(valid_after: u64, valid_until: u64) -> [u8; 12] {
    let mut prefix = [0u8; 12];
    prefix[..6].copy_from_slice(&valid_after.to_be_bytes()[2..]);
    prefix[6..].copy_from_slice(&valid_until.to_be_bytes()[2..]);
    prefix
}

/// Well formed signature that lets the bundler simulate validation before the owners sign
pub(crate) fn dummy_signature(signers: u64) -> Result<Bytes, AccountError> {
    let dummy = Bytes::from_str(DUMMY_ECDSA_SIGNATURE)
        .map_err(|e| AccountError::Signing { inner: e.to_string() })?;

    let mut signature = validity_prefix(0, 0).to_vec();
    for _ in 0..signers.max(1) {
        signature.extend_from_slice(&dummy);
    }
    Ok(signature.into())
}

/// Hash the owners sign, as computed by `Safe4337Module.getOperationHash`
pub(crate) fn safe_operation_hash(
    uo: &UserOperation,
    chain_id: u64,
    safe_4337_module: Address,
    entry_point: Address,
    valid_after: u64,
    valid_until: u64,
) -> H256 {
    let domain_separator = keccak256(encode(&[
        Token::FixedBytes(DOMAIN_TYPEHASH.to_vec()),
        Token::Uint(U256::from(chain_id)),
        Token::Address(safe_4337_module),
    ]));

    let safe_op_struct_hash = keccak256(encode(&[
        Token::FixedBytes(SAFE_OP_TYPEHASH.to_vec()),
        Token::Address(uo.sender),
        Token::Uint(uo.nonce),
        Token::FixedBytes(keccak256(uo.init_code()).to_vec()),
        Token::FixedBytes(keccak256(&uo.call_data).to_vec()),
        Token::Uint(uo.verification_gas_limit),
        Token::Uint(uo.call_gas_limit),
        Token::Uint(uo.pre_verification_gas),
        Token::Uint(uo.max_priority_fee_per_gas),
        Token::Uint(uo.max_fee_per_gas),
        Token::FixedBytes(keccak256(uo.paymaster_and_data()).to_vec()),
        Token::Uint(U256::from(valid_after)),
        Token::Uint(U256::from(valid_until)),
        Token::Address(entry_point),
    ]));

    keccak256([&[0x19, 0x01], &domain_separator[..], &safe_op_struct_hash[..]].concat()).into()
}

/// Parses a hex encoded (optionally `0x` prefixed) secp256k1 private key
pub(crate) fn parse_private_key(private_key: &str) -> Result<LocalWallet, AccountError> {
    let private_key = private_key.trim();
    let bytes = hex::decode(private_key.strip_prefix("0x").unwrap_or(private_key))
        .map_err(|e| AccountError::InvalidPrivateKey { inner: e.to_string() })?;
    if bytes.len() != 32 {
        return Err(AccountError::InvalidPrivateKey {
            inner: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }
    LocalWallet::from_bytes(&bytes)
        .map_err(|e| AccountError::InvalidPrivateKey { inner: e.to_string() })
}

/// Signs `hash` with every key. Signatures are ordered by ascending signer address and prefixed
/// by the validity window.
pub(crate) fn sign_safe_operation_hash<K: AsRef<str>>(
    hash: H256,
    private_keys: &[K],
    valid_after: u64,
    valid_until: u64,
) -> Result<Bytes, AccountError> {
    if private_keys.is_empty() {
        return Err(AccountError::NoSigners);
    }
    if let Some(value) = [valid_after, valid_until].into_iter().find(|v| *v > MAX_VALIDITY) {
        return Err(AccountError::InvalidValidity { value });
    }

    let mut signatures = Vec::with_capacity(private_keys.len());
    for key in private_keys {
        let wallet = parse_private_key(key.as_ref())?;
        let signer = wallet.address();
        if signatures.iter().any(|(address, _)| *address == signer) {
            return Err(AccountError::DuplicateSigner { signer });
        }
        let signature =
            wallet.sign_hash(hash).map_err(|e| AccountError::Signing { inner: e.to_string() })?;
        signatures.push((signer, signature));
    }
    signatures.sort_by_key(|(signer, _)| *signer);

    let mut encoded = validity_prefix(valid_after, valid_until).to_vec();
    for (_, signature) in signatures {
        encoded.extend_from_slice(&signature.to_vec());
    }
    Ok(encoded.into())
}
