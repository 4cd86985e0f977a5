use crate::core::Metric;
use lazy_static::lazy_static;
use prometheus::{
    self, register_histogram, register_int_counter, register_int_gauge, Histogram,
    IntCounter, IntGauge,
};

lazy_static! {
    static ref BATCH_TIMING_BUCKETS: Vec<f64> =
        vec![0.01, 0.05, 0.1, 0.5, 1., 5., 10., 30., 60.];
}

pub struct Indexer {
    pub batches: IntCounter,
    pub blocks: IntCounter,
    pub leases_opened: IntCounter,
    pub leases_closed: IntCounter,
    pub skipped_records: IntCounter,
    pub last_height: IntGauge,
    pub batch_timing: Histogram,
}

impl Metric for Indexer {
    fn init() -> Self {
        Self {
            batches: register_int_counter!(
                "ledger_batches_committed",
                "Number of block batches committed to the ledger."
            )
            .unwrap(),
            blocks: register_int_counter!(
                "ledger_blocks_indexed",
                "Number of blocks written to the ledger."
            )
            .unwrap(),
            leases_opened: register_int_counter!(
                "ledger_leases_opened",
                "Number of lease creations applied."
            )
            .unwrap(),
            leases_closed: register_int_counter!(
                "ledger_leases_closed",
                "Number of lease cancellations applied."
            )
            .unwrap(),
            skipped_records: register_int_counter!(
                "ledger_records_skipped",
                "Number of malformed or dangling records skipped."
            )
            .unwrap(),
            last_height: register_int_gauge!(
                "ledger_last_height",
                "Highest height of the last committed batch."
            )
            .unwrap(),
            batch_timing: register_histogram!(
                "ledger_batch_seconds",
                "Time taken to fetch and commit one batch.",
                BATCH_TIMING_BUCKETS.to_vec()
            )
            .unwrap(),
        }
    }
}
