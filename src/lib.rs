pub mod config;
pub mod rpc;
pub mod telemetry;

pub use config::{RpcConfig, RpcConfigBuilder, RpcConfigParams};
pub use rpc::{
    addr_topic, parse_hex_quantity, to_hex, AttemptError, BlockTag, EndpointRotator, FailureKind,
    HttpReply, HttpTransport, LogFilter, RetryPolicy, RpcClient, RpcClientOptions, RpcError,
    RpcMetricsSnapshot, RpcTransport, ERC20_TRANSFER_TOPIC, U256,
};
pub use telemetry::init_tracing;
