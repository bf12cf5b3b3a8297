//! Encoding helpers for EVM JSON-RPC parameters: hex quantities, address
//! topics, and a typed `eth_getLogs` filter.

use alloy_primitives::U256;
use anyhow::{bail, Context, Result};
use serde::Serialize;

/// `keccak256("Transfer(address,address,uint256)")`.
pub const ERC20_TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

const ADDRESS_HEX_CHARS: usize = 40;
const TOPIC_HEX_CHARS: usize = 64;

/// Encodes a 256-bit unsigned quantity as minimal `0x`-prefixed lowercase hex.
///
/// ```
/// use evm_rpc_failover::{to_hex, U256};
/// assert_eq!(to_hex(U256::from(255u32)), "0xff");
/// assert_eq!(to_hex(U256::ZERO), "0x0");
/// ```
pub fn to_hex(value: U256) -> String {
    let encoded = hex::encode(value.to_be_bytes::<32>());
    let digits = encoded.trim_start_matches('0');
    if digits.is_empty() {
        "0x0".to_owned()
    } else {
        format!("0x{digits}")
    }
}

/// Parses a hex quantity such as `0x1b4` into a 256-bit value. The prefix is
/// optional; signs, separators and more than 64 significant digits are rejected.
pub fn parse_hex_quantity(text: &str) -> Result<U256> {
    let trimmed = text.trim();
    let digits = strip_hex_prefix(trimmed);
    if digits.is_empty() {
        bail!("empty hex quantity {trimmed:?}");
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("invalid hex quantity {trimmed:?}");
    }
    U256::from_str_radix(digits, 16).with_context(|| format!("invalid hex quantity {trimmed:?}"))
}

/// Left-pads a 20-byte address into a 32-byte log topic.
pub fn addr_topic(address: &str) -> Result<String> {
    let digits = strip_hex_prefix(address.trim());
    if digits.len() != ADDRESS_HEX_CHARS {
        bail!(
            "address {address:?} must have {ADDRESS_HEX_CHARS} hex digits, got {}",
            digits.len()
        );
    }
    hex::decode(digits).with_context(|| format!("address {address:?} is not valid hex"))?;

    Ok(format!(
        "0x{:0>width$}",
        digits.to_ascii_lowercase(),
        width = TOPIC_HEX_CHARS
    ))
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Block selector for log filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTag {
    Number(u64),
    Latest,
    Earliest,
    Pending,
}

impl Serialize for BlockTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockTag::Number(number) => serializer.serialize_str(&to_hex(U256::from(*number))),
            BlockTag::Latest => serializer.serialize_str("latest"),
            BlockTag::Earliest => serializer.serialize_str("earliest"),
            BlockTag::Pending => serializer.serialize_str("pending"),
        }
    }
}

/// `eth_getLogs` filter object. Each topic position holds either nothing
/// (wildcard) or a list of accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Option<Vec<String>>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_block(mut self, block: BlockTag) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: BlockTag) -> Self {
        self.to_block = Some(block);
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets topic position `position`, filling earlier positions with wildcards.
    pub fn topic(mut self, position: usize, values: Vec<String>) -> Self {
        if self.topics.len() <= position {
            self.topics.resize(position + 1, None);
        }
        self.topics[position] = Some(values);
        self
    }

    /// ERC-20 `Transfer` events emitted by `token` whose recipient is `to`.
    pub fn erc20_transfers_to(token: &str, to: &str) -> Result<Self> {
        Ok(Self::new()
            .address(token.to_ascii_lowercase())
            .topic(0, vec![ERC20_TRANSFER_TOPIC.to_owned()])
            .topic(2, vec![addr_topic(to)?]))
    }

    /// ERC-20 `Transfer` events emitted by `token` whose sender is `from`.
    pub fn erc20_transfers_from(token: &str, from: &str) -> Result<Self> {
        Ok(Self::new()
            .address(token.to_ascii_lowercase())
            .topic(0, vec![ERC20_TRANSFER_TOPIC.to_owned()])
            .topic(1, vec![addr_topic(from)?]))
    }
}
