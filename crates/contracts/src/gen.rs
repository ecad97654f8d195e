use ethers::contract::abigen;

abigen!(
    EntryPoint,
    r#"[
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce)
    ]"#
);

abigen!(
    Safe,
    r#"[
        function setup(address[] calldata owners,uint256 threshold,address to,bytes calldata data,address fallbackHandler,address paymentToken,uint256 payment,address paymentReceiver) external
    ]"#
);

abigen!(
    SafeProxyFactory,
    r#"[
        function createProxyWithNonce(address singleton,bytes memory initializer,uint256 saltNonce) external returns (address proxy)
    ]"#
);

abigen!(
    SafeModuleSetup,
    r#"[
        function enableModules(address[] calldata modules) external
    ]"#
);

abigen!(
    Safe4337Module,
    r#"[
        function executeUserOp(address to,uint256 value,bytes calldata data,uint8 operation) external
    ]"#
);

abigen!(
    MultiSend,
    r#"[
        function multiSend(bytes memory transactions) external payable
    ]"#
);
