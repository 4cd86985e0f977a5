use crate::core::Metric;
use prometheus::{self, register_int_counter, IntCounter};

pub struct Payout {
    pub calculations: IntCounter,
    pub transfers: IntCounter,
    pub chunks_sent: IntCounter,
    pub chunks_failed: IntCounter,
    pub transfers_sent: IntCounter,
    pub transfers_failed: IntCounter,
}

impl Metric for Payout {
    fn init() -> Self {
        Self {
            calculations: register_int_counter!(
                "payout_calculations",
                "Number of payout calculations performed."
            )
            .unwrap(),
            transfers: register_int_counter!(
                "payout_transfers",
                "Number of payable transfers computed."
            )
            .unwrap(),
            chunks_sent: register_int_counter!(
                "payout_chunks_sent",
                "Number of mass transfers accepted by the node."
            )
            .unwrap(),
            chunks_failed: register_int_counter!(
                "payout_chunks_failed",
                "Number of mass transfers rejected or not delivered."
            )
            .unwrap(),
            transfers_sent: register_int_counter!(
                "payout_transfers_sent",
                "Number of individual transfers accepted by the node."
            )
            .unwrap(),
            transfers_failed: register_int_counter!(
                "payout_transfers_failed",
                "Number of individual transfers rejected or not delivered."
            )
            .unwrap(),
        }
    }
}
