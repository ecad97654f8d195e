//! Account abstraction (ERC-4337) and Safe smart contract interfaces
//!
//! Contract bindings are generated from human-readable ABIs, call data for arbitrary functions is
//! built from a textual signature and textual arguments.

pub mod abi;
mod error;
mod gen;

pub use abi::{create_call_data, decode_call_data, get_function_selector};
pub use error::CallDataError;
pub use gen::{
    CreateProxyWithNonceCall, EnableModulesCall, EntryPoint, ExecuteUserOpCall, MultiSend,
    MultiSendCall, Safe, Safe4337Module, SafeModuleSetup, SafeProxyFactory, SetupCall,
};
