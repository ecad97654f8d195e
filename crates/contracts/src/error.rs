use thiserror::Error;

/// Errors raised while building or decoding call data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallDataError {
    /// Function signature is not of the form `name(type,...)`
    #[error("malformed function signature {signature:?}")]
    MalformedSignature {
        /// The offending signature
        signature: String,
    },

    /// Parameter type tag could not be parsed
    #[error("unknown parameter type {ty:?}: {inner}")]
    UnknownType {
        /// The offending type tag
        ty: String,
        /// The inner error message
        inner: String,
    },

    /// Value is not representable as its declared type
    #[error("value {value:?} cannot be encoded as {ty}: {inner}")]
    InvalidValue {
        /// Declared type
        ty: String,
        /// The offending value
        value: String,
        /// The inner error message
        inner: String,
    },

    /// Number of type tags and values differ
    #[error("{types} parameter types given for {values} values")]
    LengthMismatch {
        /// Number of type tags
        types: usize,
        /// Number of values
        values: usize,
    },

    /// Call data too short to contain a selector
    #[error("call data of {len} bytes has no function selector")]
    MissingSelector {
        /// Length of the call data
        len: usize,
    },

    /// ABI decoding error
    #[error("abi decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },
}
