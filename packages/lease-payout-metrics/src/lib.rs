#![deny(unused_crate_dependencies)]

pub mod core;
pub mod indexer;
pub mod node;
pub mod payout;

use crate::core::{Metric, Metrics};
use lazy_static::lazy_static;
use prometheus::{Encoder, TextEncoder};

lazy_static! {
    pub static ref METRICS: Metrics = Metrics::init();
}

/// Encode every registered metric in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
