//! Account abstraction (ERC-4337) RPC clients
//!
//! The bundler is reached over the ERC-4337 `eth` namespace JSON-RPC methods, the execution node
//! through an `ethers` middleware. Both are hidden behind async traits so the account logic can be
//! driven by any implementation.

mod bundler;
mod bundler_api;
mod error;
mod node;

pub use bundler::{BundlerApi, HttpBundler};
pub use bundler_api::{EthApiClient, EthApiServer};
pub use error::RpcError;
pub use node::{EthNode, NodeApi};
