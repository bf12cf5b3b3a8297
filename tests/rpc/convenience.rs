use std::time::Duration;

use crate::support::{
    helpers::fast_client,
    mock_rpc::{MockEndpoint, Reply},
};
use anyhow::Result;
use evm_rpc_failover::{addr_topic, BlockTag, LogFilter, RpcClient, RpcConfig, ERC20_TRANSFER_TOPIC};
use serde_json::json;

const TOKEN: &str = "0x55d398326f99059fF775485246999027B3197955";
const WALLET: &str = "0xAbC0000000000000000000000000000000000001";

#[tokio::test]
async fn block_number_parses_hex_result() -> Result<()> {
    let node = MockEndpoint::start(Reply::Result(json!("0x10"))).await?;
    let client = fast_client(&[node.url()], Duration::from_secs(2))?;

    assert_eq!(client.block_number().await?, 16);

    let request = &node.requests()[0];
    assert_eq!(request["method"], "eth_blockNumber");
    assert_eq!(request["params"], json!([]));

    node.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn get_logs_sends_filter_and_returns_entries_untouched() -> Result<()> {
    let logs = json!([
        {"address": TOKEN, "topics": [ERC20_TRANSFER_TOPIC], "data": "0x01"},
        {"address": TOKEN, "topics": [ERC20_TRANSFER_TOPIC], "data": "0x02"},
    ]);
    let node = MockEndpoint::start(Reply::Result(logs.clone())).await?;
    let client = fast_client(&[node.url()], Duration::from_secs(2))?;

    let filter = LogFilter::erc20_transfers_to(TOKEN, WALLET)?
        .from_block(BlockTag::Number(40_000_000))
        .to_block(BlockTag::Latest);
    let entries = client.get_logs(&filter).await?;

    assert_eq!(json!(entries), logs);
    let params = &node.requests()[0]["params"];
    assert_eq!(params.as_array().map(Vec::len), Some(1));
    assert_eq!(params[0]["fromBlock"], "0x2625a00");
    assert_eq!(params[0]["topics"][2][0], addr_topic(WALLET)?);

    node.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn client_from_config_reaches_configured_endpoints() -> Result<()> {
    let node = MockEndpoint::start(Reply::Result(json!("0x38"))).await?;
    let config = RpcConfig::builder()
        .endpoint(node.url())
        .attempt_timeout(Duration::from_secs(2))
        .chain_id(56)
        .build()?;
    let client = RpcClient::from_config(&config)?;

    assert_eq!(client.chain_id().await?, config.chain_id().unwrap_or_default());
    assert_eq!(client.endpoints(), [node.url()]);

    node.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn typed_request_decodes_result() -> Result<()> {
    let node = MockEndpoint::start(Reply::Result(json!({"number": "0x1", "hash": "0xabc"}))).await?;
    let client = fast_client(&[node.url()], Duration::from_secs(2))?;

    #[derive(serde::Deserialize)]
    struct Header {
        number: String,
        hash: String,
    }

    let header: Header = client
        .request("eth_getBlockByNumber", &[json!("latest"), json!(false)])
        .await?;
    assert_eq!(header.number, "0x1");
    assert_eq!(header.hash, "0xabc");

    node.shutdown().await;
    Ok(())
}
