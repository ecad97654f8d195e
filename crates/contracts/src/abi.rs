//! Call data from human-readable function signatures and textual arguments

use crate::error::CallDataError;
use ethers::{
    abi::{
        decode,
        encode,
        token::{LenientTokenizer, Tokenizer},
        ParamType, Token,
    },
    types::{Bytes, Selector},
    utils::keccak256,
};

/// Splits a parameter list on the commas that are not nested inside tuples
fn split_top_level(params: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let last = params[start..].trim();
    if !(last.is_empty() && parts.is_empty()) {
        parts.push(last);
    }
    Some(parts)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Bit or byte width of a sized type, digits only and without leading zeros
fn parse_size(size: &str) -> Option<usize> {
    if size.is_empty() || size.starts_with('0') || !size.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    size.parse().ok()
}

fn parse_elementary(ty: &str) -> Result<ParamType, String> {
    let int_bits = |bits: &str| match parse_size(bits) {
        Some(bits) if bits <= 256 && bits % 8 == 0 => Ok(bits),
        _ => Err(format!("invalid integer width {bits:?}")),
    };

    match ty {
        "address" => Ok(ParamType::Address),
        "bool" => Ok(ParamType::Bool),
        "string" => Ok(ParamType::String),
        "bytes" => Ok(ParamType::Bytes),
        "uint" => Ok(ParamType::Uint(256)),
        "int" => Ok(ParamType::Int(256)),
        _ => {
            if let Some(bits) = ty.strip_prefix("uint") {
                int_bits(bits).map(ParamType::Uint)
            } else if let Some(bits) = ty.strip_prefix("int") {
                int_bits(bits).map(ParamType::Int)
            } else if let Some(len) = ty.strip_prefix("bytes") {
                match parse_size(len) {
                    Some(len) if len <= 32 => Ok(ParamType::FixedBytes(len)),
                    _ => Err(format!("invalid byte length {len:?}")),
                }
            } else {
                Err("not an ABI type".into())
            }
        }
    }
}

fn parse_type_inner(ty: &str) -> Result<ParamType, String> {
    let ty = ty.trim();

    if let Some(rest) = ty.strip_suffix(']') {
        let open = rest.rfind('[').ok_or("unbalanced brackets")?;
        let inner = Box::new(parse_type_inner(&rest[..open])?);
        let len = rest[open + 1..].trim();
        return if len.is_empty() {
            Ok(ParamType::Array(inner))
        } else {
            let len = parse_size(len).ok_or_else(|| format!("invalid array length {len:?}"))?;
            Ok(ParamType::FixedArray(inner, len))
        };
    }

    if let Some(rest) = ty.strip_prefix('(') {
        let components = rest
            .strip_suffix(')')
            .and_then(split_top_level)
            .ok_or("unbalanced parentheses")?;
        return components
            .into_iter()
            .map(parse_type_inner)
            .collect::<Result<Vec<_>, _>>()
            .map(ParamType::Tuple);
    }

    parse_elementary(ty)
}

/// Parses a single type tag (`address`, `uint256[]`, `(bool,bytes)`, ...).
///
/// Only canonical Solidity types are accepted; `uint` and `int` are aliases of their 256 bit form.
pub fn parse_type(ty: &str) -> Result<ParamType, CallDataError> {
    parse_type_inner(ty)
        .map_err(|inner| CallDataError::UnknownType { ty: ty.trim().to_string(), inner })
}

/// Parses a list of type tags
pub fn parse_types<T: AsRef<str>>(types: &[T]) -> Result<Vec<ParamType>, CallDataError> {
    types.iter().map(|ty| parse_type(ty.as_ref())).collect()
}

/// Parses `name(type,...)` and returns the canonical form used for hashing
pub fn canonical_signature(signature: &str) -> Result<String, CallDataError> {
    let malformed = || CallDataError::MalformedSignature { signature: signature.to_string() };

    let signature = signature.trim();
    let open = signature.find('(').ok_or_else(malformed)?;
    let inner = signature[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
    let name = signature[..open].trim();
    if !is_identifier(name) {
        return Err(malformed());
    }

    let params = split_top_level(inner).ok_or_else(malformed)?;
    if params.iter().any(|p| p.is_empty()) {
        return Err(malformed());
    }
    let types = parse_types(&params)?;

    Ok(format!("{name}({})", types.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")))
}

/// Computes the 4-byte selector of a function signature such as `mint(address)`
pub fn get_function_selector(signature: &str) -> Result<Selector, CallDataError> {
    let canonical = canonical_signature(signature)?;
    let hash = keccak256(canonical.as_bytes());
    Ok([hash[0], hash[1], hash[2], hash[3]])
}

fn tokenize(ty: &ParamType, value: &str) -> Result<Token, CallDataError> {
    let value = value.trim();
    // hex-like types are accepted with or without the 0x prefix
    let raw = match ty {
        ParamType::Address | ParamType::Bytes | ParamType::FixedBytes(_) => {
            value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value)
        }
        _ => value,
    };
    LenientTokenizer::tokenize(ty, raw).map_err(|e| CallDataError::InvalidValue {
        ty: ty.to_string(),
        value: value.to_string(),
        inner: e.to_string(),
    })
}

/// Encodes `values` as the declared `types` and prefixes them with `selector`
pub fn create_call_data<T: AsRef<str>, V: AsRef<str>>(
    selector: Selector,
    types: &[T],
    values: &[V],
) -> Result<Bytes, CallDataError> {
    if types.len() != values.len() {
        return Err(CallDataError::LengthMismatch { types: types.len(), values: values.len() });
    }

    let types = parse_types(types)?;
    let tokens = types
        .iter()
        .zip(values)
        .map(|(ty, value)| tokenize(ty, value.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok([selector.to_vec(), encode(&tokens)].concat().into())
}

/// Splits call data into its selector and the parameters decoded as `types`
pub fn decode_call_data<T: AsRef<str>>(
    types: &[T],
    data: &[u8],
) -> Result<(Selector, Vec<Token>), CallDataError> {
    if data.len() < 4 {
        return Err(CallDataError::MissingSelector { len: data.len() });
    }
    let types = parse_types(types)?;
    let (selector, params) = data.split_at(4);
    let tokens =
        decode(&types, params).map_err(|e| CallDataError::Decode { inner: e.to_string() })?;
    Ok(([selector[0], selector[1], selector[2], selector[3]], tokens))
}
