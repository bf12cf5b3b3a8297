use std::time::{Duration, Instant};

use crate::support::{
    helpers::{fast_client, init_tracing},
    mock_rpc::{unreachable_url, MockEndpoint, Reply},
};
use anyhow::Result;
use evm_rpc_failover::{FailureKind, RpcError};
use serde_json::json;

fn exhausted(err: &anyhow::Error) -> &RpcError {
    match err.downcast_ref::<RpcError>() {
        Some(rpc @ RpcError::Exhausted { .. }) => rpc,
        other => panic!("expected exhausted error, got {other:?}"),
    }
}

#[tokio::test]
async fn falls_over_to_healthy_endpoint_and_sticks_to_it() -> Result<()> {
    init_tracing();
    let dead = unreachable_url().await?;
    let failing = MockEndpoint::start(Reply::rpc_error(-32000, "header not found")).await?;
    let healthy = MockEndpoint::start(Reply::Result(json!("0x2a"))).await?;
    let client = fast_client(
        &[dead.as_str(), failing.url(), healthy.url()],
        Duration::from_secs(2),
    )?;

    assert_eq!(client.call("eth_blockNumber", &[]).await?, json!("0x2a"));
    assert_eq!(client.sticky_index(), 2);

    assert_eq!(client.call("eth_blockNumber", &[]).await?, json!("0x2a"));
    assert_eq!(failing.hits(), 1, "sticky endpoint must be probed first");
    assert_eq!(healthy.hits(), 2);

    failing.shutdown().await;
    healthy.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn exhaustion_reports_last_probed_endpoint() -> Result<()> {
    init_tracing();
    let garbage = MockEndpoint::start(Reply::Garbage(502)).await?;
    let failing = MockEndpoint::start(Reply::Error {
        status: 500,
        code: -32603,
        message: "internal error".into(),
    })
    .await?;
    let client = fast_client(&[garbage.url(), failing.url()], Duration::from_secs(2))?;

    let err = client.call("eth_getBalance", &[json!("0x0"), json!("latest")]).await.unwrap_err();
    let rpc = exhausted(&err);
    let last = rpc.last_attempt().expect("an attempt must have run");

    assert_eq!(last.endpoint(), failing.url());
    assert_eq!(last.kind(), FailureKind::Protocol);
    assert!(err.to_string().contains("internal error"));
    assert_eq!(client.sticky_index(), 0);
    assert_eq!(client.metrics().total_failures, 2);

    garbage.shutdown().await;
    failing.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn garbage_responses_count_as_network_failures() -> Result<()> {
    let garbage = MockEndpoint::start(Reply::Garbage(200)).await?;
    let client = fast_client(&[garbage.url()], Duration::from_secs(2))?;

    let err = client.call("eth_chainId", &[]).await.unwrap_err();
    let last = exhausted(&err).last_attempt().expect("attempt ran");
    assert_eq!(last.kind(), FailureKind::Network);

    garbage.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn hanging_endpoint_times_out_and_next_endpoint_answers() -> Result<()> {
    init_tracing();
    let slow = MockEndpoint::start(Reply::Hang).await?;
    let fast = MockEndpoint::start(Reply::Result(json!("0x10"))).await?;
    let client = fast_client(&[slow.url(), fast.url()], Duration::from_millis(200))?;

    let start = Instant::now();
    let value = client.call("eth_blockNumber", &[]).await?;

    assert_eq!(value, json!("0x10"));
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(slow.hits(), 1);
    assert_eq!(fast.hits(), 1);
    assert_eq!(client.sticky_index(), 1);
    assert_eq!(client.metrics().total_timeouts, 1);

    slow.shutdown().await;
    fast.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn request_ids_are_unique_and_increasing() -> Result<()> {
    let first = MockEndpoint::start(Reply::Result(json!(true))).await?;
    let second = MockEndpoint::start(Reply::Result(json!(true))).await?;
    first.enqueue(Reply::rpc_error(-32005, "rate limited"));
    let client = fast_client(&[first.url(), second.url()], Duration::from_secs(2))?;

    for _ in 0..3 {
        client.call("net_listening", &[]).await?;
    }

    assert_eq!(first.ids(), vec![1]);
    assert_eq!(second.ids(), vec![2, 3, 4]);

    for request in second.requests() {
        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["method"], "net_listening");
        assert_eq!(request["params"], json!([]));
    }

    first.shutdown().await;
    second.shutdown().await;
    Ok(())
}
