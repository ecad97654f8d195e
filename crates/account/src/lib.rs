//! Safe smart accounts for account abstraction (ERC-4337)
//!
//! A [SafeAccount](SafeAccount) derives the counterfactual address of a Safe, batches
//! meta-transactions into a user operation, signs it on behalf of the owners and submits it to a
//! bundler.

mod error;
mod overrides;
pub mod safe;
mod submission;

pub use error::AccountError;
pub use overrides::UserOperationOverrides;
pub use safe::{SafeAccount, SafeInitOptions};
pub use submission::{InclusionWait, SendUserOperationResponse};
