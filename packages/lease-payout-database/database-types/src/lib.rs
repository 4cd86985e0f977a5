use strum::{AsRefStr, EnumString};

/// Ledger backends.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum DbType {
    Postgres,
    #[default]
    Sqlite,
}

/// A stored block. `fees` and `reward` are frozen at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: i64,
    pub generator: String,
    pub fees: i64,
    pub reward: i64,
    pub tx_count: i64,
    pub timestamp: i64,
}

/// A stored lease. `end_height` is `None` while the lease is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub start_height: i64,
    pub end_height: Option<i64>,
    pub amount: i64,
}

impl Lease {
    /// Whether the lease earns at `height`, given the activation delay.
    pub fn is_active_at(&self, height: i64, activation_delay: i64) -> bool {
        height >= self.start_height + activation_delay
            && self.end_height.map_or(true, |end| height <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub alias: String,
    pub address: String,
}

/// Sum of the active lease amounts of one leaser at one height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseShare {
    pub height: i64,
    pub sender: String,
    pub amount: i64,
}
