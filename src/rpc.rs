//! JSON-RPC client plumbing: endpoint rotation, single-attempt execution,
//! retry policy, metrics, envelope codec, and EVM wire helpers.

mod attempt;
pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod options;
pub mod retry;
pub mod transport;
pub mod wire;

pub use client::RpcClient;
pub use endpoints::EndpointRotator;
pub use error::{AttemptError, FailureKind, RpcError};
pub use metrics::RpcMetricsSnapshot;
pub use options::RpcClientOptions;
pub use retry::RetryPolicy;
pub use transport::{HttpReply, HttpTransport, RpcTransport};
pub use alloy_primitives::U256;
pub use wire::{addr_topic, parse_hex_quantity, to_hex, BlockTag, LogFilter, ERC20_TRANSFER_TOPIC};
