use async_trait::async_trait;
use lease_payout::prelude::{
    AssetDetails, MassTransferRequest, NodeApi, NodeBlock, NodeTransaction, PayoutError,
    PayoutResult, TransferApi, TransferRequest,
};
use lease_payout_database::{
    queries,
    types::{Block, Lease},
    LedgerConnectionPool,
};
use lease_payout_lib::config::IndexerConfig;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};
use tempfile::TempDir;

/// A migrated SQLite ledger living in a temporary directory. The directory
/// is removed on drop.
pub struct TestLedger {
    pub pool: LedgerConnectionPool,
    _dir: TempDir,
}

impl TestLedger {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
        let pool = LedgerConnectionPool::connect(&url).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        queries::run_migration(&mut conn).await.unwrap();

        Self { pool, _dir: dir }
    }

    pub async fn blocks(&self) -> Vec<Block> {
        let mut conn = self.pool.acquire().await.unwrap();
        queries::all_blocks(&mut conn, None, None).await.unwrap()
    }

    pub async fn leases(&self) -> Vec<Lease> {
        let mut conn = self.pool.acquire().await.unwrap();
        queries::all_leases(&mut conn).await.unwrap()
    }

    pub async fn first_gap(&self) -> Option<i64> {
        let mut conn = self.pool.acquire().await.unwrap();
        queries::first_gap_height(&mut conn).await.unwrap()
    }

    pub async fn put_block(&self, block: &Block) {
        let mut conn = self.pool.acquire().await.unwrap();
        queries::upsert_block(&mut conn, block).await.unwrap();
    }
}

pub fn indexer_config(batch_size: u64) -> IndexerConfig {
    IndexerConfig {
        batch_size,
        ..IndexerConfig::default()
    }
}

pub fn transfer_tx(id: &str, fee: i64) -> NodeTransaction {
    NodeTransaction {
        kind: Some(4),
        id: Some(id.to_string()),
        fee: Some(fee),
        ..NodeTransaction::default()
    }
}

pub fn lease_tx(id: &str, sender: &str, recipient: &str, amount: i64) -> NodeTransaction {
    NodeTransaction {
        kind: Some(8),
        id: Some(id.to_string()),
        fee: Some(100000),
        sender: Some(sender.to_string()),
        recipient: Some(recipient.to_string()),
        amount: Some(amount),
        ..NodeTransaction::default()
    }
}

pub fn cancel_tx(id: &str, lease_id: &str) -> NodeTransaction {
    NodeTransaction {
        kind: Some(9),
        id: Some(id.to_string()),
        fee: Some(100000),
        lease_id: Some(lease_id.to_string()),
        ..NodeTransaction::default()
    }
}

/// In-memory node serving a scripted chain, alias table and mass transfer
/// endpoint.
#[derive(Debug, Default)]
pub struct MockNode {
    blocks: Mutex<BTreeMap<i64, NodeBlock>>,
    aliases: Mutex<HashMap<String, String>>,
    assets: Mutex<HashMap<String, AssetDetails>>,
    unreachable_from: Mutex<Option<i64>>,
    rejected_assets: Mutex<HashSet<Option<String>>>,
    rejected_recipients: Mutex<HashSet<String>>,
    submitted: Mutex<Vec<MassTransferRequest>>,
    transferred: Mutex<Vec<TransferRequest>>,
    alias_lookups: AtomicUsize,
}

impl MockNode {
    /// Empty blocks `0..=tip`, all generated by `generator`.
    pub fn with_chain(tip: i64, generator: &str) -> Self {
        let node = Self::default();
        node.extend_chain(tip, generator);
        node
    }

    /// Append empty blocks generated by `generator` up to `tip`.
    pub fn extend_chain(&self, tip: i64, generator: &str) {
        let mut blocks = self.blocks.lock().unwrap();
        let next = blocks.keys().next_back().map_or(0, |h| h + 1);
        for height in next..=tip {
            blocks.insert(
                height,
                NodeBlock {
                    height,
                    generator: generator.to_string(),
                    timestamp: 1_500_000_000_000 + height * 60_000,
                    reward: None,
                    transactions: vec![],
                },
            );
        }
    }

    pub fn set_generator(&self, height: i64, generator: &str) {
        if let Some(block) = self.blocks.lock().unwrap().get_mut(&height) {
            block.generator = generator.to_string();
        }
    }

    pub fn push_tx(&self, height: i64, tx: NodeTransaction) {
        if let Some(block) = self.blocks.lock().unwrap().get_mut(&height) {
            block.transactions.push(tx);
        }
    }

    pub fn add_alias(&self, name: &str, address: &str) {
        self.aliases
            .lock()
            .unwrap()
            .insert(name.to_string(), address.to_string());
    }

    pub fn add_asset(&self, asset_id: &str, name: &str, decimals: u32) {
        self.assets.lock().unwrap().insert(
            asset_id.to_string(),
            AssetDetails {
                asset_id: asset_id.to_string(),
                name: name.to_string(),
                decimals,
            },
        );
    }

    /// Fail every block request reaching `height` or above. `None` heals the
    /// node.
    pub fn unreachable_from(&self, height: Option<i64>) {
        *self.unreachable_from.lock().unwrap() = height;
    }

    /// Reject mass transfers of `asset_id`; `None` is the native asset.
    pub fn reject_asset(&self, asset_id: Option<&str>) {
        self.rejected_assets
            .lock()
            .unwrap()
            .insert(asset_id.map(str::to_string));
    }

    pub fn reject_recipient(&self, recipient: &str) {
        self.rejected_recipients
            .lock()
            .unwrap()
            .insert(recipient.to_string());
    }

    pub fn alias_lookups(&self) -> usize {
        self.alias_lookups.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<MassTransferRequest> {
        self.submitted.lock().unwrap().clone()
    }

    /// Accepted individual transfers.
    pub fn transferred(&self) -> Vec<TransferRequest> {
        self.transferred.lock().unwrap().clone()
    }
}

fn unavailable(url: String) -> PayoutError {
    PayoutError::NodeResponseError {
        url,
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn chain_height(&self) -> PayoutResult<i64> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0))
    }

    async fn blocks_range(&self, start: i64, end: i64) -> PayoutResult<Vec<NodeBlock>> {
        if let Some(height) = *self.unreachable_from.lock().unwrap() {
            if end >= height {
                return Err(unavailable(format!("/blocks/seq/{start}/{end}")));
            }
        }

        // Served newest first to make sure callers order blocks themselves.
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .range(start..=end)
            .rev()
            .map(|(_, block)| block.clone())
            .collect())
    }

    async fn resolve_alias(&self, alias: &str) -> PayoutResult<String> {
        self.alias_lookups.fetch_add(1, Ordering::SeqCst);
        self.aliases
            .lock()
            .unwrap()
            .get(alias)
            .cloned()
            .ok_or_else(|| PayoutError::NodeResponseError {
                url: format!("/alias/by-alias/{alias}"),
                status: 404,
                message: format!("alias {alias} does not exist"),
            })
    }
}

#[async_trait]
impl TransferApi for MockNode {
    async fn mass_transfer(&self, request: &MassTransferRequest) -> PayoutResult<String> {
        if self
            .rejected_assets
            .lock()
            .unwrap()
            .contains(&request.asset_id)
        {
            return Err(unavailable("/assets/masstransfer".to_string()));
        }

        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(request.clone());
        Ok(format!("tx{}", submitted.len()))
    }

    async fn transfer(&self, request: &TransferRequest) -> PayoutResult<String> {
        let rejected = self
            .rejected_assets
            .lock()
            .unwrap()
            .contains(&request.asset_id)
            || self
                .rejected_recipients
                .lock()
                .unwrap()
                .contains(&request.recipient);
        if rejected {
            return Err(unavailable("/assets/transfer".to_string()));
        }

        let mut transferred = self.transferred.lock().unwrap();
        transferred.push(request.clone());
        Ok(format!("transfer{}", transferred.len()))
    }

    async fn asset_details(&self, asset_id: &str) -> PayoutResult<AssetDetails> {
        self.assets
            .lock()
            .unwrap()
            .get(asset_id)
            .cloned()
            .ok_or_else(|| unavailable(format!("/assets/details/{asset_id}")))
    }
}
