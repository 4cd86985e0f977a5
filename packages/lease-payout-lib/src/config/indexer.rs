use crate::defaults;
use serde::Deserialize;

/// Settings of the ledger indexer.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct IndexerConfig {
    /// Number of blocks fetched and stored per batch.
    pub batch_size: u64,

    /// How fees and rewards are credited to a block.
    pub fee_policy: FeePolicyConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            fee_policy: FeePolicyConfig::default(),
        }
    }
}

/// Protocol constants frozen into every stored block's fee and reward figures.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct FeePolicyConfig {
    /// Native fees at or above this value are not credited.
    pub fee_ceiling: i64,

    /// Flat amount credited for a sponsored transfer.
    pub sponsored_fee: i64,

    /// Sponsored transfers are credited only above this height.
    pub sponsorship_activation_height: i64,

    /// Block rewards are credited only from this height on.
    pub reward_activation_height: i64,
}

impl Default for FeePolicyConfig {
    fn default() -> Self {
        Self {
            fee_ceiling: defaults::FEE_CEILING,
            sponsored_fee: defaults::SPONSORED_FEE,
            sponsorship_activation_height: defaults::SPONSORSHIP_ACTIVATION_HEIGHT,
            reward_activation_height: defaults::REWARD_ACTIVATION_HEIGHT,
        }
    }
}
