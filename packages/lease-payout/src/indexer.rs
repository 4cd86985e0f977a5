use crate::{database::Ledger, fees::FeePolicy, node::NodeApi, PayoutError, PayoutResult};
use lease_payout_database::{
    queries,
    types::{Alias, Lease},
    LedgerConnectionPool,
};
use lease_payout_lib::config::IndexerConfig;
use lease_payout_types::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[cfg(feature = "metrics")]
use lease_payout_metrics::METRICS;

/// What one indexing run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub resumed_from: i64,
    pub remote_height: i64,
    pub batches: u64,
    pub blocks: u64,
    pub leases_opened: u64,
    pub leases_closed: u64,
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct BatchStats {
    blocks: u64,
    leases_opened: u64,
    leases_closed: u64,
    skipped: u64,
}

/// Mirrors blocks and lease lifecycles from the node into the ledger.
///
/// A run resumes from the first gap of the ledger and walks up to the chain
/// height in batches. Each batch is written in its own transaction, and the
/// next batch is only fetched once the previous one committed. Any network
/// or storage error stops the run; the ledger is left at the last committed
/// batch, from which the next run resumes.
pub struct LedgerIndexer<N: NodeApi> {
    config: IndexerConfig,
    policy: FeePolicy,
    pool: LedgerConnectionPool,
    node: N,
}

impl<N: NodeApi> LedgerIndexer<N> {
    pub fn new(config: IndexerConfig, pool: LedgerConnectionPool, node: N) -> Self {
        let policy = FeePolicy::new(config.fee_policy.clone());
        Self {
            config,
            policy,
            pool,
            node,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub async fn run(&self) -> PayoutResult<IndexSummary> {
        if self.config.batch_size == 0 {
            return Err(PayoutError::ConfigurationError(
                "batch size must be positive".to_string(),
            ));
        }

        let resume = {
            let mut conn = self.pool.acquire().await?;
            queries::first_gap_height(&mut conn).await?.unwrap_or(0)
        };
        let remote = self.node.chain_height().await?;

        let mut summary = IndexSummary {
            resumed_from: resume,
            remote_height: remote,
            ..IndexSummary::default()
        };

        if resume > remote {
            info!("Ledger is up to date at height {remote}.");
            return Ok(summary);
        }

        info!("Indexing blocks {resume} to {remote}.");

        let batch_size = self.config.batch_size as i64;
        let mut start = resume;
        while start <= remote {
            let end = (start + batch_size - 1).min(remote);
            let stats = self.index_batch(start, end).await?;

            summary.batches += 1;
            summary.blocks += stats.blocks;
            summary.leases_opened += stats.leases_opened;
            summary.leases_closed += stats.leases_closed;
            summary.skipped += stats.skipped;

            start = end + 1;
        }

        info!(
            "Indexed {} blocks in {} batches: {} leases opened, {} closed, {} records skipped.",
            summary.blocks,
            summary.batches,
            summary.leases_opened,
            summary.leases_closed,
            summary.skipped
        );

        Ok(summary)
    }

    async fn index_batch(&self, start: i64, end: i64) -> PayoutResult<BatchStats> {
        let timer = Instant::now();

        let mut blocks = self.node.blocks_range(start, end).await?;
        blocks.sort_by_key(|b| b.height);

        let mut ledger = Ledger::new(self.pool.clone());
        ledger.start_transaction().await?;

        let stats = match self.apply_blocks(&mut ledger, &blocks).await {
            Ok(stats) => stats,
            Err(e) => return Err(abort_batch(&mut ledger, start, end, e).await),
        };

        ledger.commit_transaction().await?;

        debug!(
            "Committed blocks {start} to {end} in {:.2?}.",
            timer.elapsed()
        );

        #[cfg(feature = "metrics")]
        {
            METRICS.indexer.batches.inc();
            METRICS.indexer.blocks.inc_by(stats.blocks);
            METRICS.indexer.leases_opened.inc_by(stats.leases_opened);
            METRICS.indexer.leases_closed.inc_by(stats.leases_closed);
            METRICS.indexer.skipped_records.inc_by(stats.skipped);
            METRICS.indexer.last_height.set(end);
            METRICS
                .indexer
                .batch_timing
                .observe(timer.elapsed().as_secs_f64());
        }

        Ok(stats)
    }

    async fn apply_blocks(
        &self,
        ledger: &mut Ledger,
        blocks: &[NodeBlock],
    ) -> PayoutResult<BatchStats> {
        let mut stats = BatchStats::default();

        for block in blocks {
            ledger.put_block(&self.policy.ledger_block(block)).await?;
            stats.blocks += 1;

            for tx in &block.transactions {
                let event = match tx.event() {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Skipping record at height {}: {e}", block.height);
                        stats.skipped += 1;
                        continue;
                    }
                };

                match event {
                    LedgerEvent::LeaseCreate(create) => {
                        let recipient = self.resolve_recipient(ledger, &create.recipient).await?;
                        let lease = Lease {
                            id: create.id,
                            sender: create.sender,
                            recipient,
                            start_height: block.height,
                            end_height: None,
                            amount: create.amount,
                        };
                        ledger.open_lease(&lease).await?;
                        stats.leases_opened += 1;
                    }
                    LedgerEvent::LeaseClose(close) => {
                        if ledger.close_lease(&close.lease_id, block.height).await? {
                            stats.leases_closed += 1;
                        } else {
                            let e = DataIntegrityError::UnknownLease(close.lease_id);
                            warn!("Skipping record at height {}: {e}", block.height);
                            stats.skipped += 1;
                        }
                    }
                    LedgerEvent::Other => {}
                }
            }
        }

        Ok(stats)
    }

    /// Plain addresses are returned as is. Aliases are looked up in the
    /// ledger first, then asked to the node and remembered.
    async fn resolve_recipient(
        &self,
        ledger: &mut Ledger,
        recipient: &str,
    ) -> PayoutResult<String> {
        let Some(name) = alias_name(recipient) else {
            return Ok(recipient.to_string());
        };

        if let Some(address) = ledger.alias_address(name).await? {
            return Ok(address);
        }

        let address = self.node.resolve_alias(name).await?;
        debug!("Resolved alias {name} to {address}.");

        ledger
            .put_alias(&Alias {
                alias: name.to_string(),
                address: address.clone(),
            })
            .await?;

        Ok(address)
    }
}

/// Roll the open batch back and hand back the error that stopped it. A failed
/// rollback is only logged.
async fn abort_batch(ledger: &mut Ledger, start: i64, end: i64, e: PayoutError) -> PayoutError {
    error!("Failed to index blocks {start} to {end}: {e}. Reverting batch.");
    if let Err(revert) = ledger.revert_transaction().await {
        error!("Failed to revert blocks {start} to {end}: {revert}");
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_aborted_batch_keeps_its_own_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
        let pool = LedgerConnectionPool::connect(&url).await.unwrap();

        // No transaction is open, so the rollback itself fails.
        let mut ledger = Ledger::new(pool);
        let e = abort_batch(
            &mut ledger,
            100,
            199,
            PayoutError::NodeResponseError {
                url: "/alias/by-alias/node".to_string(),
                status: 404,
                message: "alias node does not exist".to_string(),
            },
        )
        .await;

        assert!(matches!(e, PayoutError::NodeResponseError { status: 404, .. }));
    }
}
