//! Misc utils

use ethers::{
    abi::AbiDecode,
    types::{Address, Bytes, U128, U256},
    utils::to_checksum,
};

/// Selector of the solidity `Error(string)` revert
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Converts address to checksum address
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Converts Option address to checksum
pub fn as_checksum_addr_opt<S>(val: &Option<Address>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if let Some(addr) = val {
        s.serialize_str(&to_checksum(addr, None))
    } else {
        s.serialize_none()
    }
}

/// Packs paymaster fields into the `paymasterAndData` form signed and hashed on-chain
pub fn pack_paymaster_data(
    addr: Address,
    paymaster_verification_gas_limit: U256,
    paymaster_post_op_gas_limit: U256,
    paymaster_data: &Bytes,
) -> Vec<u8> {
    if addr.is_zero() {
        vec![]
    } else {
        let gas_data = pack_uint128(paymaster_verification_gas_limit, paymaster_post_op_gas_limit);
        [addr.0.to_vec(), gas_data.to_vec(), paymaster_data.to_vec()].concat()
    }
}

/// Packs factory and factory data into the legacy `initCode` form
pub fn pack_factory_data(factory: Address, factory_data: &Bytes) -> Vec<u8> {
    if factory.is_zero() {
        vec![]
    } else {
        [factory.0.to_vec(), factory_data.to_vec()].concat()
    }
}

/// Packs two uint128
pub fn pack_uint128(a: U256, b: U256) -> [u8; 32] {
    let mut res = [0u8; 32];
    let a: U128 = {
        let mut tem = [0; 32];
        a.to_big_endian(&mut tem);
        U128::from_big_endian(&tem[16..32])
    };
    let b: U128 = {
        let mut tem = [0; 32];
        b.to_big_endian(&mut tem);
        U128::from_big_endian(&tem[16..32])
    };
    a.to_big_endian(&mut res[0..16]);
    b.to_big_endian(&mut res[16..32]);
    res
}

/// Unpacks two uint128 from bytes
#[cfg(test)]
pub(crate) fn unpack_uint128(buf: &[u8; 32]) -> (U256, U256) {
    (U256::from_big_endian(&buf[0..16]), U256::from_big_endian(&buf[16..32]))
}

/// Decodes the message of `Error(string)` revert data
pub fn decode_revert_string(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (error_sig, reason) = data.split_at(4);
    if error_sig == ERROR_STRING_SELECTOR {
        <String as AbiDecode>::decode(reason).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::AbiEncode;

    #[test]
    fn pack_unpack_u128() {
        let a: U256 = 100.into();
        let b: U256 = 200.into();
        let packed = pack_uint128(a, b);
        let (new_a, new_b) = unpack_uint128(&packed);
        assert_eq!(a, new_a, "unpack a worked");
        assert_eq!(b, new_b, "unpack b worked");
    }

    #[test]
    fn pack_factory_data_prefixes_address() {
        let addr: Address = "0x4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67".parse().unwrap();
        let data: Bytes = "0x12345678".parse().unwrap();
        let packed = pack_factory_data(addr, &data);
        assert_eq!(packed.len(), 24);
        assert_eq!(Address::from_slice(&packed[..20]), addr);
        assert_eq!(&packed[20..], data.as_ref());
        assert!(pack_factory_data(Address::zero(), &data).is_empty());
    }

    #[test]
    fn pack_paymaster_data_layout() {
        let addr: Address = "0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5".parse().unwrap();
        let data: Bytes = "0xabcd".parse().unwrap();
        let packed = pack_paymaster_data(addr, 50_000.into(), 10_000.into(), &data);
        assert_eq!(packed.len(), 20 + 32 + 2);
        let mut gas = [0u8; 32];
        gas.copy_from_slice(&packed[20..52]);
        assert_eq!(unpack_uint128(&gas), (50_000.into(), 10_000.into()));
        assert!(pack_paymaster_data(Address::zero(), 1.into(), 1.into(), &data).is_empty());
    }

    #[test]
    fn revert_string_decoding() {
        let message = "ERC721: token already minted".to_string();
        let data = [ERROR_STRING_SELECTOR.to_vec(), message.encode()].concat();
        assert_eq!(decode_revert_string(&data).as_deref(), Some("ERC721: token already minted"));
        assert_eq!(decode_revert_string(&[0x01, 0x02]), None);
        assert_eq!(decode_revert_string(&[0xde, 0xad, 0xbe, 0xef, 0x00]), None);
    }
}
