use crate::node::TransferApi;
use futures::future::join_all;
use lease_payout_lib::{config::FeeAssetConfig, defaults};
use lease_payout_types::prelude::*;
use std::collections::BTreeMap;
use tracing::{error, info};

#[cfg(feature = "metrics")]
use lease_payout_metrics::METRICS;

const MASS_TRANSFER_VERSION: u8 = 1;
const FEE_BASE: i64 = 100_000;
const FEE_PER_TRANSFER: i64 = 50_000;
const FEE_STEP: i64 = 100_000;

/// Fee of a mass transfer with `transfers` entries, rounded up to the next
/// multiple of `FEE_STEP`.
pub fn mass_transfer_fee(transfers: usize) -> i64 {
    let raw = FEE_BASE + FEE_PER_TRANSFER * transfers as i64;
    (raw + FEE_STEP - 1) / FEE_STEP * FEE_STEP
}

/// Result of one submitted chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Sent {
        asset: Option<String>,
        transfers: Vec<MassTransferEntry>,
        tx_id: String,
    },
    Failed {
        asset: Option<String>,
        transfers: Vec<MassTransferEntry>,
        error: String,
    },
}

impl ChunkOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ChunkOutcome::Sent { .. })
    }
}

/// Result of one individually submitted payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Sent {
        request: TransferRequest,
        tx_id: String,
    },
    Failed {
        request: TransferRequest,
        error: String,
    },
}

impl TransferOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, TransferOutcome::Sent { .. })
    }
}

/// Mass transfers land in `outcomes`, individual transfers in `transfers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionReport {
    pub outcomes: Vec<ChunkOutcome>,
    pub transfers: Vec<TransferOutcome>,
}

impl EmissionReport {
    /// Number of transactions submitted.
    pub fn submitted(&self) -> usize {
        self.outcomes.len() + self.transfers.len()
    }

    pub fn sent(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
            + self.transfers.iter().filter(|t| t.is_sent()).count()
    }

    pub fn failed(&self) -> usize {
        self.submitted() - self.sent()
    }
}

/// Mass transfers per asset: `None` is the native asset.
pub fn chunk_by_asset(
    transfers: &[Transfer],
    chunk_size: usize,
) -> Vec<(Option<String>, Vec<MassTransferEntry>)> {
    let mut by_asset: BTreeMap<Option<String>, Vec<MassTransferEntry>> = BTreeMap::new();
    for transfer in transfers.iter().filter(|t| t.amount > 0) {
        by_asset
            .entry(transfer.asset_id.clone())
            .or_default()
            .push(transfer.into());
    }

    by_asset
        .into_iter()
        .flat_map(|(asset, entries)| {
            entries
                .chunks(chunk_size.max(1))
                .map(|chunk| (asset.clone(), chunk.to_vec()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// One transfer request per payable record. A configured fee asset replaces
/// the record's native fee.
pub fn transfer_requests(
    transfers: &[Transfer],
    fee_asset: Option<&FeeAssetConfig>,
) -> Vec<TransferRequest> {
    transfers
        .iter()
        .filter(|t| t.amount > 0)
        .map(|t| {
            let request = TransferRequest::from(t);
            match fee_asset {
                Some(fee_asset) => {
                    request.with_fee_asset(fee_asset.asset_id.clone(), fee_asset.fee)
                }
                None => request,
            }
        })
        .collect()
}

/// Submits a payout list to the node. A failing submission is reported and
/// never stops the others.
pub struct TransferEmitter<T: TransferApi> {
    api: T,
    sender: String,
    chunk_size: usize,
    fee_asset: Option<FeeAssetConfig>,
}

impl<T: TransferApi> TransferEmitter<T> {
    pub fn new(api: T, sender: impl Into<String>) -> Self {
        Self {
            api,
            sender: sender.into(),
            chunk_size: defaults::MASS_TRANSFER_MAX_RECIPIENTS,
            fee_asset: None,
        }
    }

    /// Pay the fee of individual transfers in a sponsored asset.
    pub fn with_fee_asset(mut self, fee_asset: Option<FeeAssetConfig>) -> Self {
        self.fee_asset = fee_asset;
        self
    }

    pub fn api(&self) -> &T {
        &self.api
    }

    pub async fn emit(&self, transfers: &[Transfer]) -> EmissionReport {
        let chunks = chunk_by_asset(transfers, self.chunk_size);
        info!(
            "Submitting {} transfers in {} mass transfers.",
            transfers.len(),
            chunks.len()
        );

        let submissions = chunks.into_iter().map(|(asset, entries)| async move {
            let request = MassTransferRequest {
                version: MASS_TRANSFER_VERSION,
                asset_id: asset.clone(),
                sender: self.sender.clone(),
                fee: mass_transfer_fee(entries.len()),
                transfers: entries,
            };

            let asset_name = asset.as_deref().unwrap_or(defaults::NATIVE_ASSET);
            match self.api.mass_transfer(&request).await {
                Ok(tx_id) => {
                    info!(
                        "Sent {} transfers of {asset_name} in {tx_id}.",
                        request.transfers.len()
                    );
                    ChunkOutcome::Sent {
                        asset,
                        transfers: request.transfers,
                        tx_id,
                    }
                }
                Err(e) => {
                    error!(
                        "Mass transfer of {} {asset_name} transfers failed: {e}",
                        request.transfers.len()
                    );
                    ChunkOutcome::Failed {
                        asset,
                        transfers: request.transfers,
                        error: e.to_string(),
                    }
                }
            }
        });

        let report = EmissionReport {
            outcomes: join_all(submissions).await,
            ..EmissionReport::default()
        };

        #[cfg(feature = "metrics")]
        {
            METRICS.payout.chunks_sent.inc_by(report.sent() as u64);
            METRICS.payout.chunks_failed.inc_by(report.failed() as u64);
        }

        report
    }

    /// Submit every payable record as its own transfer transaction.
    pub async fn emit_individually(&self, transfers: &[Transfer]) -> EmissionReport {
        let requests = transfer_requests(transfers, self.fee_asset.as_ref());
        info!("Submitting {} individual transfers.", requests.len());

        let submissions = requests.into_iter().map(|request| async move {
            match self.api.transfer(&request).await {
                Ok(tx_id) => {
                    info!(
                        "Sent {} of {} to {} in {tx_id}.",
                        request.amount,
                        request.asset_id.as_deref().unwrap_or(defaults::NATIVE_ASSET),
                        request.recipient
                    );
                    TransferOutcome::Sent { request, tx_id }
                }
                Err(e) => {
                    error!("Transfer to {} failed: {e}", request.recipient);
                    TransferOutcome::Failed {
                        request,
                        error: e.to_string(),
                    }
                }
            }
        });

        let report = EmissionReport {
            transfers: join_all(submissions).await,
            ..EmissionReport::default()
        };

        #[cfg(feature = "metrics")]
        {
            METRICS.payout.transfers_sent.inc_by(report.sent() as u64);
            METRICS.payout.transfers_failed.inc_by(report.failed() as u64);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(recipient: &str, amount: i64, asset_id: Option<&str>) -> Transfer {
        Transfer {
            amount,
            fee: 100000,
            sender: "G".to_string(),
            recipient: recipient.to_string(),
            attachment: None,
            asset_id: asset_id.map(str::to_string),
        }
    }

    #[test]
    fn test_mass_transfer_fee_rounds_up() {
        assert_eq!(mass_transfer_fee(1), 200000);
        assert_eq!(mass_transfer_fee(2), 200000);
        assert_eq!(mass_transfer_fee(3), 300000);
        assert_eq!(mass_transfer_fee(100), 5100000);
    }

    #[test]
    fn test_chunks_group_by_asset_and_skip_empty_amounts() {
        let mut transfers: Vec<_> = (0..250)
            .map(|i| transfer(&format!("L{i}"), 1 + i, None))
            .collect();
        transfers.push(transfer("T1", 5, Some("Token")));
        transfers.push(transfer("T2", 0, Some("Token")));

        let chunks = chunk_by_asset(&transfers, 100);
        let sizes: Vec<_> = chunks
            .iter()
            .map(|(asset, entries)| (asset.as_deref(), entries.len()))
            .collect();

        assert_eq!(
            sizes,
            vec![(None, 100), (None, 100), (None, 50), (Some("Token"), 1)]
        );
    }

    #[test]
    fn test_transfer_requests_apply_fee_asset() {
        let transfers = vec![
            transfer("L1", 5, None),
            transfer("L2", 0, None),
            transfer("L3", 7, Some("Token")),
        ];

        let native = transfer_requests(&transfers, None);
        assert_eq!(native.len(), 2);
        assert!(native
            .iter()
            .all(|r| r.fee == 100000 && r.fee_asset_id.is_none()));

        let fee_asset = FeeAssetConfig {
            asset_id: "Sponsor".to_string(),
            fee: 7,
        };
        let sponsored = transfer_requests(&transfers, Some(&fee_asset));
        assert_eq!(sponsored[1].recipient, "L3");
        assert_eq!(sponsored[1].asset_id.as_deref(), Some("Token"));
        assert!(sponsored
            .iter()
            .all(|r| r.fee == 7 && r.fee_asset_id.as_deref() == Some("Sponsor")));
    }
}
