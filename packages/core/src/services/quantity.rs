//! Hex-encoded JSON-RPC scalars.
//!
//! Ethereum JSON-RPC encodes integers as `0x`-prefixed hex strings. They are
//! decoded as `u256` and narrowed to `u128`, so fee values above 2^53 never
//! pass through a JSON number.

use serde::{Deserialize, Serialize};

/// An unsigned integer carried as a hex string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "ethnum::u256")]
pub struct Quantity(u128);

impl Quantity {
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    /// Narrow to `u64`, as used for block numbers.
    pub fn to_u64(self) -> Result<u64, String> {
        u64::try_from(self.0).map_err(|_| format!("quantity {} does not fit in 64 bits", self.0))
    }
}

impl TryFrom<ethnum::u256> for Quantity {
    type Error = String;

    fn try_from(value: ethnum::u256) -> Result<Self, Self::Error> {
        u128::try_from(value)
            .map(Quantity)
            .map_err(|_| format!("quantity {} does not fit in 128 bits", value))
    }
}

/// Block selector accepted by `eth_getBlockByNumber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum BlockTag {
    Pending,
    Number(u64),
}

impl From<BlockTag> for String {
    fn from(value: BlockTag) -> Self {
        match value {
            BlockTag::Pending => "pending".to_string(),
            BlockTag::Number(n) => format!("{:#x}", n),
        }
    }
}
