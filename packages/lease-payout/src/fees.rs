use lease_payout_database::types::Block;
use lease_payout_lib::config::FeePolicyConfig;
use lease_payout_types::prelude::*;

/// Rules deciding which part of a block's fees and reward is credited to
/// its generator. Applied once, when the block is written to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeePolicy {
    config: FeePolicyConfig,
}

impl FeePolicy {
    pub fn new(config: FeePolicyConfig) -> Self {
        Self { config }
    }

    /// Fee credited for one transaction of the block at `height`.
    ///
    /// A native fee counts in full while it stays under the ceiling. A fee
    /// paid in another asset counts as the flat sponsored amount, for
    /// transfers only, past the sponsorship activation height. A missing fee
    /// counts as zero.
    pub fn transaction_fee(&self, height: i64, tx: &NodeTransaction) -> i64 {
        let fee = tx.fee.unwrap_or(0);

        if tx.pays_native_fee() {
            if (0..self.config.fee_ceiling).contains(&fee) {
                fee
            } else {
                0
            }
        } else if tx.kind() == TransactionKind::Transfer
            && height > self.config.sponsorship_activation_height
        {
            self.config.sponsored_fee
        } else {
            0
        }
    }

    pub fn block_fees(&self, block: &NodeBlock) -> i64 {
        block
            .transactions
            .iter()
            .map(|tx| self.transaction_fee(block.height, tx))
            .sum()
    }

    pub fn block_reward(&self, block: &NodeBlock) -> i64 {
        if block.height >= self.config.reward_activation_height {
            block.reward.unwrap_or(0)
        } else {
            0
        }
    }

    /// The ledger row for a node block.
    pub fn ledger_block(&self, block: &NodeBlock) -> Block {
        Block {
            height: block.height,
            generator: block.generator.clone(),
            fees: self.block_fees(block),
            reward: self.block_reward(block),
            tx_count: block.tx_count(),
            timestamp: block.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: u8, fee: Option<i64>, fee_asset_id: Option<&str>) -> NodeTransaction {
        NodeTransaction {
            kind: Some(kind),
            fee,
            fee_asset_id: fee_asset_id.map(str::to_string),
            ..NodeTransaction::default()
        }
    }

    fn block(height: i64, reward: Option<i64>, transactions: Vec<NodeTransaction>) -> NodeBlock {
        NodeBlock {
            height,
            generator: "3PGenerator".to_string(),
            timestamp: 0,
            reward,
            transactions,
        }
    }

    #[test]
    fn test_native_fees_below_ceiling_count() {
        let policy = FeePolicy::default();

        assert_eq!(policy.transaction_fee(10, &tx(4, Some(100000), None)), 100000);
        assert_eq!(policy.transaction_fee(10, &tx(4, Some(100000), Some(""))), 100000);
        assert_eq!(policy.transaction_fee(10, &tx(4, Some(999_999_999), None)), 999_999_999);
        assert_eq!(policy.transaction_fee(10, &tx(4, Some(1_000_000_000), None)), 0);
        assert_eq!(policy.transaction_fee(10, &tx(4, None, None)), 0);
    }

    #[test]
    fn test_sponsored_fees_count_flat_for_transfers_after_activation() {
        let policy = FeePolicy::default();

        assert_eq!(policy.transaction_fee(1_090_000, &tx(4, Some(7), Some("Token"))), 0);
        assert_eq!(
            policy.transaction_fee(1_090_001, &tx(4, Some(7), Some("Token"))),
            100000
        );
        assert_eq!(policy.transaction_fee(1_090_001, &tx(11, Some(7), Some("Token"))), 0);
    }

    #[test]
    fn test_reward_counts_from_activation_height() {
        let policy = FeePolicy::default();

        assert_eq!(policy.block_reward(&block(1_739_999, Some(600000000), vec![])), 0);
        assert_eq!(
            policy.block_reward(&block(1_740_000, Some(600000000), vec![])),
            600000000
        );
        assert_eq!(policy.block_reward(&block(1_740_000, None, vec![])), 0);
    }

    #[test]
    fn test_ledger_block_freezes_fee_figures() {
        let policy = FeePolicy::new(FeePolicyConfig {
            sponsorship_activation_height: 0,
            reward_activation_height: 0,
            ..FeePolicyConfig::default()
        });
        let node_block = block(
            5,
            Some(42),
            vec![
                tx(4, Some(100000), None),
                tx(4, Some(3), Some("Token")),
                tx(8, Some(2_000_000_000), None),
            ],
        );

        let stored = policy.ledger_block(&node_block);
        assert_eq!(stored.fees, 200000);
        assert_eq!(stored.reward, 42);
        assert_eq!(stored.tx_count, 3);
    }
}
