use crate::transaction::NodeTransaction;
use serde::{Deserialize, Serialize};

/// Block as served by the node's `/blocks/seq` endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NodeBlock {
    pub height: i64,
    pub generator: String,
    pub timestamp: i64,

    /// Block reward reported by the node. Absent on nodes predating rewards.
    #[serde(default)]
    pub reward: Option<i64>,

    #[serde(default)]
    pub transactions: Vec<NodeTransaction>,
}

impl NodeBlock {
    pub fn tx_count(&self) -> i64 {
        self.transactions.len() as i64
    }
}

/// Response of `/blocks/height`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct ChainHeight {
    pub height: i64,
}
