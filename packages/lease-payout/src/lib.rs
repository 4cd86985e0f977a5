#![deny(unused_crate_dependencies)]
pub mod calculator;
pub mod check;
pub mod cli;
pub(crate) mod commands;
mod database;
pub mod emitter;
pub mod fees;
pub mod indexer;
pub mod node;
pub mod payout_file;

pub use calculator::{PayoutCalculator, PayoutParams, RewardTokenParams};
pub use database::Ledger;
pub use emitter::{ChunkOutcome, EmissionReport, TransferEmitter, TransferOutcome};
pub use fees::FeePolicy;
pub use indexer::{IndexSummary, LedgerIndexer};
pub use lease_payout_database::LedgerDatabaseError;
pub use lease_payout_lib::config::{PayoutConfig, PayoutConfigError};
pub use node::{NodeApi, NodeClient, TransferApi};
use thiserror::Error;

pub mod prelude {
    pub use super::{
        ChunkOutcome, EmissionReport, FeePolicy, IndexSummary, Ledger, LedgerIndexer,
        NodeApi, NodeClient, PayoutCalculator, PayoutConfig, PayoutError, PayoutParams,
        PayoutResult, RewardTokenParams, TransferApi, TransferEmitter, TransferOutcome,
    };
    pub use lease_payout_lib::config::{
        DatabaseConfig, DistributionConfig, FeePolicyConfig, IndexerConfig, NodeConfig,
    };
    pub use lease_payout_types::prelude::*;
}

pub type PayoutResult<T> = core::result::Result<T, PayoutError>;

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("Network error: {0:#?}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Node answered {url} with status {status}: {message}")]
    NodeResponseError {
        url: String,
        status: u16,
        message: String,
    },
    #[error("Database error {0:?}")]
    DatabaseError(#[from] LedgerDatabaseError),
    #[error("Error from sqlx: {0:#?}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Invalid payout parameters: {0}")]
    ConfigurationError(String),
    #[error("Configuration error: {0:?}")]
    ConfigError(#[from] PayoutConfigError),
    #[error("Payout amount for {0:?} does not fit in 64 bits.")]
    AmountOverflow(String),
    #[error("IO Error: {0:#?}")]
    IoError(#[from] std::io::Error),
    #[error("Error processing JSON: {0:?}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("No transaction is open.")]
    NoTransactionError,
}
