mod common;

use common::{entry_point, start_dummy_bundler, DummyBundler, CHAIN_ID, TRANSACTION_HASH};
use ethers::types::U256;
use safebatch_primitives::{
    constants::rpc_error_codes::{SIGNATURE, VALIDATION},
    InclusionReceipt, UserOperation,
};
use safebatch_rpc::{BundlerApi, HttpBundler, RpcError};

fn user_operation() -> UserOperation {
    UserOperation::default()
        .sender("0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap())
        .nonce(U256::zero())
        .call_data("0x7bb37428".parse().unwrap())
        .max_fee_per_gas(1_000_000_000u64.into())
        .max_priority_fee_per_gas(100_000_000u64.into())
}

#[tokio::test]
async fn chain_id_and_entry_points() {
    let (addr, handle) = start_dummy_bundler(DummyBundler::default()).await;
    let bundler = HttpBundler::new(format!("http://{addr}")).unwrap();

    assert_eq!(bundler.chain_id().await.unwrap(), CHAIN_ID);
    assert_eq!(bundler.supported_entry_points().await.unwrap(), vec![entry_point()]);

    handle.stop().unwrap();
}

#[tokio::test]
async fn estimate_user_operation_gas() {
    let (addr, handle) = start_dummy_bundler(DummyBundler::default()).await;
    let bundler = HttpBundler::new(format!("http://{addr}")).unwrap();

    let estimation =
        bundler.estimate_user_operation_gas(&user_operation(), &entry_point()).await.unwrap();
    assert_eq!(estimation.call_gas_limit, U256::from(100_000));
    assert_eq!(estimation.verification_gas_limit, U256::from(150_000));
    assert_eq!(estimation.pre_verification_gas, U256::from(50_000));
    assert_eq!(estimation.paymaster_verification_gas_limit, None);

    handle.stop().unwrap();
}

#[tokio::test]
async fn estimation_rejection_keeps_code_and_data() {
    let (addr, handle) = start_dummy_bundler(DummyBundler::default()).await;
    let bundler = HttpBundler::new(format!("http://{addr}")).unwrap();

    let uo = user_operation().call_data(Default::default());
    match bundler.estimate_user_operation_gas(&uo, &entry_point()).await {
        Err(RpcError::Rejected { code, message, data }) => {
            assert_eq!(code, VALIDATION);
            assert_eq!(message, "AA23 reverted");
            assert!(data.unwrap().contains("empty call data"));
        }
        res => panic!("unexpected result {res:?}"),
    }

    handle.stop().unwrap();
}

#[tokio::test]
async fn send_user_operation_and_get_receipt() {
    let dummy = DummyBundler::default();
    dummy.state.lock().unwrap().pending_polls = 1;
    let (addr, handle) = start_dummy_bundler(dummy.clone()).await;
    let bundler = HttpBundler::new(format!("http://{addr}")).unwrap();

    let uo = user_operation().signature(vec![1u8; 77].into());
    let hash = bundler.send_user_operation(&uo, &entry_point()).await.unwrap();
    assert_eq!(hash, uo.hash(&entry_point(), CHAIN_ID));
    assert_eq!(dummy.state.lock().unwrap().submitted, vec![uo.clone()]);

    // not included yet
    assert!(bundler.get_user_operation_receipt(&hash).await.unwrap().is_none());

    let receipt = bundler.get_user_operation_receipt(&hash).await.unwrap().unwrap();
    assert_eq!(receipt.user_operation_hash, hash);
    assert_eq!(receipt.sender, uo.sender);

    let inclusion = InclusionReceipt::from(receipt);
    assert!(inclusion.success());
    assert_eq!(inclusion.transaction_hash(), Some(TRANSACTION_HASH.parse().unwrap()));
    assert_eq!(dummy.state.lock().unwrap().receipt_polls, 2);

    handle.stop().unwrap();
}

#[tokio::test]
async fn unsigned_user_operation_is_rejected() {
    let (addr, handle) = start_dummy_bundler(DummyBundler::default()).await;
    let bundler = HttpBundler::new(format!("http://{addr}")).unwrap();

    let err = bundler.send_user_operation(&user_operation(), &entry_point()).await.unwrap_err();
    assert_eq!(err.code(), Some(SIGNATURE));

    handle.stop().unwrap();
}

#[tokio::test]
async fn unreachable_bundler_is_transport_error() {
    let (addr, handle) = start_dummy_bundler(DummyBundler::default()).await;
    handle.stop().unwrap();
    handle.stopped().await;

    let bundler = HttpBundler::new(format!("http://{addr}")).unwrap();
    assert!(matches!(bundler.chain_id().await, Err(RpcError::Transport { .. })));
}

#[test]
fn invalid_bundler_url() {
    assert!(matches!(HttpBundler::new("not a url"), Err(RpcError::Transport { .. })));
}
