use std::fmt;

/// Subnetwork id the node assigns to the reward-granting transaction
pub const COINBASE_SUBNETWORK_ID: &str = "0100000000000000000000000000000000000000";

/// Opaque hex identifier of a block as reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TipHash(String);

impl TipHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TipHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TipHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A block fetched with its transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub hash: TipHash,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Total number of outputs across all transactions
    pub fn output_count(&self) -> usize {
        self.transactions.iter().map(|tx| tx.outputs.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Subnetwork id, when the node reports one
    pub subnetwork_id: Option<String>,
    pub outputs: Vec<Output>,
}

impl Transaction {
    /// Whether the node marks this transaction as the block reward
    pub fn is_coinbase(&self) -> bool {
        self.subnetwork_id.as_deref() == Some(COINBASE_SUBNETWORK_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Amount in the smallest unit
    pub amount_raw: u64,
    /// Destination address of the output
    pub miner_address: String,
}
