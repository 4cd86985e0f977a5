use crate::defaults;
use serde::Deserialize;
use std::path::PathBuf;
use strum::{AsRefStr, EnumString};

/// How a payout list is submitted to the node.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransferMode {
    /// Mass transfers of up to 100 payments per asset.
    #[default]
    Mass,
    /// One transfer transaction per payment.
    Individual,
}

/// Sponsored asset paying the fee of individual transfers.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct FeeAssetConfig {
    pub asset_id: String,

    /// Fee per transfer, in minimal units of the fee asset.
    pub fee: i64,
}

/// Parameters of a payout run.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct DistributionConfig {
    /// Generator address whose leasers are paid.
    pub address: String,

    /// First block of the payout window.
    pub start_block: i64,

    /// Last block (inclusive) of the payout window.
    pub end_block: i64,

    /// Share of the generator's earnings distributed to leasers, in `(0, 100]`.
    pub percentage: f64,

    /// Blocks a lease waits before it starts earning.
    pub activation_delay: i64,

    /// Flat deduction from every leaser's payout, in whole native units.
    pub leaser_transfer_fee: Option<f64>,

    /// Fee attached to every emitted transfer record, in minimal units.
    pub transfer_fee: i64,

    pub attachment: Option<String>,

    /// File the payout list is written to.
    pub filename: PathBuf,

    /// Optional secondary distribution of a reward token.
    pub reward_token: Option<RewardTokenConfig>,

    pub transfer_mode: TransferMode,

    /// Only used by individual transfers.
    pub fee_asset: Option<FeeAssetConfig>,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            start_block: 0,
            end_block: 0,
            percentage: defaults::DISTRIBUTION_PERCENTAGE,
            activation_delay: defaults::ACTIVATION_DELAY,
            leaser_transfer_fee: None,
            transfer_fee: defaults::TRANSFER_FEE,
            attachment: None,
            filename: PathBuf::from(defaults::PAYOUT_FILENAME),
            reward_token: None,
            transfer_mode: TransferMode::default(),
            fee_asset: None,
        }
    }
}

/// Flat per-block allotment of a token shared with the same mechanics as fees.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct RewardTokenConfig {
    pub asset_id: String,

    /// Tokens distributed per generated block, in whole token units.
    pub amount_per_block: f64,

    pub decimals: u32,
}

impl Default for RewardTokenConfig {
    fn default() -> Self {
        Self {
            asset_id: defaults::REWARD_TOKEN_ASSET_ID.to_string(),
            amount_per_block: 0.0,
            decimals: defaults::REWARD_TOKEN_DECIMALS,
        }
    }
}
