//! Account abstraction (ERC-4337) and Safe related constants

/// Entry point smart contract
pub mod entry_point {
    /// Address of the entry point smart contract
    pub const ADDRESS: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";
}

/// Safe contracts (Safe 1.4.1, Safe4337Module 0.3.0)
pub mod safe {
    /// Safe L2 singleton the proxies delegate to
    pub const SINGLETON: &str = "0x29fcB43b46531BcA003ddC8FCB67FFE91900C762";
    /// Proxy factory deploying Safe proxies with CREATE2
    pub const PROXY_FACTORY: &str = "0x4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67";
    /// Module validating and executing user operations
    pub const SAFE_4337_MODULE: &str = "0x75cf11467937ce3F2f357CE24ffc3DBF8fD5c226";
    /// Setup helper enabling the 4337 module during `Safe.setup`
    pub const MODULE_SETUP: &str = "0x2dd68b007B46fBe91B9A7c3EDa5A7a1063cB5b47";
    /// MultiSend library (delegate-called for batches)
    pub const MULTI_SEND: &str = "0x38869bf66a61cF6bDB996A6aE40D5853Fd43B526";
    /// Creation code of the `SafeProxy` deployed by the proxy factory
    pub const PROXY_CREATION_CODE: &str = "0x608060405234801561001057600080fd5b506040516101e63803806101e68339818101604052602081101561003357600080fd5b8101908080519060200190929190505050600073ffffffffffffffffffffffffffffffffffffffff168173ffffffffffffffffffffffffffffffffffffffff1614156100ca576040517f08c379a00000000000000000000000000000000000000000000000000000000081526004018080602001828103825260228152602001806101c46022913960400191505060405180910390fd5b806000806101000a81548173ffffffffffffffffffffffffffffffffffffffff021916908373ffffffffffffffffffffffffffffffffffffffff1602179055505060ab806101196000396000f3fe608060405273ffffffffffffffffffffffffffffffffffffffff600054167fa619486e0000000000000000000000000000000000000000000000000000000060003514156050578060005260206000f35b3660008037600080366000845af43d6000803e60008114156070573d6000fd5b3d6000f3fea264697066735822122003d1488ee65e08fa41e58e888a9865554c535f2c77126a82cb4c0f917f31441364736f6c63430007060033496e76616c69642073696e676c65746f6e20616464726573732070726f7669646564";
    /// EIP-712 domain type used by the 4337 module
    pub const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
    /// EIP-712 type of the operation signed by the Safe owners
    pub const SAFE_OP_TYPE: &str = "SafeOp(address safe,uint256 nonce,bytes initCode,bytes callData,uint128 verificationGasLimit,uint128 callGasLimit,uint256 preVerificationGas,uint128 maxPriorityFeePerGas,uint128 maxFeePerGas,bytes paymasterAndData,uint48 validAfter,uint48 validUntil,address entryPoint)";
    /// ECDSA signature used per signer while estimating gas (r, s, v)
    pub const DUMMY_ECDSA_SIGNATURE: &str = "0xfffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c";
}

/// User operation assembly
pub mod user_operation {
    /// Default percentage applied to the estimated call gas limit
    pub const CALL_GAS_LIMIT_PERCENTAGE: u64 = 100;
    /// Default percentage applied to the estimated verification gas limit
    pub const VERIFICATION_GAS_LIMIT_PERCENTAGE: u64 = 100;
    /// Default percentage applied to the estimated pre-verification gas
    pub const PRE_VERIFICATION_GAS_PERCENTAGE: u64 = 100;
    /// Default percentage applied to the max fee per gas reported by the node
    pub const MAX_FEE_PER_GAS_PERCENTAGE: u64 = 100;
    /// Default percentage applied to the max priority fee per gas reported by the node
    pub const MAX_PRIORITY_FEE_PER_GAS_PERCENTAGE: u64 = 100;
}

/// Inclusion polling
pub mod inclusion {
    /// Interval between two receipt queries (in milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 2_000;
    /// Time after which waiting for inclusion gives up (in seconds)
    pub const TIMEOUT_SECS: u64 = 180;
}

/// Bundler RPC error codes (ERC-4337)
pub mod rpc_error_codes {
    pub const VALIDATION: i32 = -32500;
    pub const PAYMASTER: i32 = -32501;
    pub const OPCODE: i32 = -32502;
    pub const EXPIRATION: i32 = -32503;
    pub const ENTITY_BANNED_OR_THROTTLED: i32 = -32504;
    pub const STAKE_TOO_LOW: i32 = -32505;
    pub const SIGNATURE_AGGREGATOR: i32 = -32506;
    pub const SIGNATURE: i32 = -32507;
    pub const EXECUTION: i32 = -32521;
    pub const SANITY_CHECK: i32 = -32602;
}
