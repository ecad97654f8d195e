use ethers::types::{Bytes, U256};

/// Values overriding what the node and the bundler report while assembling a user operation.
///
/// Absolute values win over estimations. Percentage multipliers scale the estimations
/// (`100` leaves them unchanged) and are ignored for fields given absolutely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserOperationOverrides {
    pub nonce: Option<U256>,
    pub call_data: Option<Bytes>,
    pub call_gas_limit: Option<U256>,
    pub verification_gas_limit: Option<U256>,
    pub pre_verification_gas: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,

    pub call_gas_limit_percentage_multiplier: Option<u64>,
    pub verification_gas_limit_percentage_multiplier: Option<u64>,
    pub pre_verification_gas_percentage_multiplier: Option<u64>,
    pub max_fee_per_gas_percentage_multiplier: Option<u64>,
    pub max_priority_fee_per_gas_percentage_multiplier: Option<u64>,
}

impl UserOperationOverrides {
    /// All three gas limits are given, no estimation is needed
    pub fn has_gas_limits(&self) -> bool {
        self.call_gas_limit.is_some() &&
            self.verification_gas_limit.is_some() &&
            self.pre_verification_gas.is_some()
    }

    /// Both fee fields are given, no fee data is needed
    pub fn has_fees(&self) -> bool {
        self.max_fee_per_gas.is_some() && self.max_priority_fee_per_gas.is_some()
    }
}

/// Scales `value` by `percentage` / 100, saturating at `U256::MAX`
pub(crate) fn apply_percentage(value: U256, percentage: u64) -> U256 {
    let percentage = U256::from(percentage);
    let (whole, rest) = value.div_mod(100.into());
    whole.saturating_mul(percentage).saturating_add(rest * percentage / 100)
}

/// Absolute override if given, otherwise the scaled estimation
pub(crate) fn resolve(
    absolute: Option<U256>,
    estimation: U256,
    multiplier: Option<u64>,
    default_multiplier: u64,
) -> U256 {
    absolute.unwrap_or_else(|| {
        apply_percentage(estimation, multiplier.unwrap_or(default_multiplier))
    })
}
