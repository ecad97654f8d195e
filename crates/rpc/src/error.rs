use jsonrpsee::core::ClientError;
use thiserror::Error;

/// Errors returned by the bundler and node clients
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The endpoint answered with a JSON-RPC error object
    #[error("request rejected with code {code}: {message}")]
    Rejected {
        /// JSON-RPC error code
        code: i32,
        /// Error message
        message: String,
        /// Raw JSON of the error data, if any
        data: Option<String>,
    },

    /// The endpoint could not be reached or the request failed in transit
    #[error("transport error: {inner}")]
    Transport {
        /// The inner error message
        inner: String,
    },

    /// Execution node error
    #[error("node error: {inner}")]
    Node {
        /// The inner error message
        inner: String,
    },

    /// Response could not be decoded
    #[error("decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },
}

impl RpcError {
    /// JSON-RPC error code of a rejection
    pub fn code(&self) -> Option<i32> {
        match self {
            RpcError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Call(obj) => RpcError::Rejected {
                code: obj.code(),
                message: obj.message().to_string(),
                data: obj.data().map(|data| data.get().to_string()),
            },
            ClientError::ParseError(err) => RpcError::Decode { inner: err.to_string() },
            err => RpcError::Transport { inner: err.to_string() },
        }
    }
}
