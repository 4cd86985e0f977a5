use crate::{PayoutError, PayoutResult};
use bigdecimal::BigDecimal;
use lease_payout_database::{
    queries,
    types::{Block, LeaseShare},
    LedgerConnectionPool,
};
use lease_payout_lib::{config::DistributionConfig, defaults};
use lease_payout_types::prelude::*;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::{
    collections::{BTreeMap, HashMap},
    str::FromStr,
};
use tracing::{debug, info};

#[cfg(feature = "metrics")]
use lease_payout_metrics::METRICS;

/// Weights of a block's own fees and of its predecessor's fees in the pool,
/// in tenths.
const OWN_FEES_WEIGHT: i128 = 4;
const PREVIOUS_FEES_WEIGHT: i128 = 6;
const REWARD_WEIGHT: i128 = 10;
const POOL_SCALE: u32 = 10;
const PERCENT: u32 = 100;

/// Secondary distribution of a token, allotted per generated block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardTokenParams {
    pub asset_id: String,
    /// Whole token units per block.
    pub amount_per_block: BigDecimal,
    pub decimals: u32,
}

/// Everything a payout calculation depends on besides the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutParams {
    pub generator: String,
    pub start_height: i64,
    /// Inclusive.
    pub end_height: i64,
    /// In `(0, 100]`.
    pub distribution_percentage: BigDecimal,
    pub activation_delay: i64,
    /// Deducted from every primary payout, in whole native units.
    pub leaser_transfer_fee: Option<BigDecimal>,
    /// Fee field of every emitted record.
    pub transfer_fee: i64,
    pub attachment: Option<String>,
    pub reward_token: Option<RewardTokenParams>,
}

fn decimal(name: &str, value: f64) -> PayoutResult<BigDecimal> {
    BigDecimal::from_str(&value.to_string()).map_err(|_| {
        PayoutError::ConfigurationError(format!("{name} is not a finite number: {value}"))
    })
}

impl PayoutParams {
    pub fn new(
        generator: impl Into<String>,
        start_height: i64,
        end_height: i64,
        distribution_percentage: BigDecimal,
    ) -> Self {
        Self {
            generator: generator.into(),
            start_height,
            end_height,
            distribution_percentage,
            activation_delay: defaults::ACTIVATION_DELAY,
            leaser_transfer_fee: None,
            transfer_fee: defaults::TRANSFER_FEE,
            attachment: None,
            reward_token: None,
        }
    }

    /// Reject parameters no calculation can be run with.
    pub fn validate(&self) -> PayoutResult<()> {
        let invalid = |msg: String| Err(PayoutError::ConfigurationError(msg));

        if self.generator.is_empty() {
            return invalid("generator address is empty".to_string());
        }
        if self.distribution_percentage <= BigDecimal::from(0)
            || self.distribution_percentage > BigDecimal::from(PERCENT)
        {
            return invalid(format!(
                "distribution percentage {} is outside (0, 100]",
                self.distribution_percentage
            ));
        }
        if self.start_height > self.end_height {
            return invalid(format!(
                "start height {} is above end height {}",
                self.start_height, self.end_height
            ));
        }
        if self.activation_delay < 0 {
            return invalid(format!(
                "activation delay {} is negative",
                self.activation_delay
            ));
        }
        if self.transfer_fee < 0 {
            return invalid(format!("transfer fee {} is negative", self.transfer_fee));
        }
        if let Some(fee) = &self.leaser_transfer_fee {
            if *fee < BigDecimal::from(0) {
                return invalid(format!("leaser transfer fee {fee} is negative"));
            }
        }
        if let Some(token) = &self.reward_token {
            if token.amount_per_block < BigDecimal::from(0) {
                return invalid(format!(
                    "token allotment {} is negative",
                    token.amount_per_block
                ));
            }
        }

        Ok(())
    }
}

impl TryFrom<&DistributionConfig> for PayoutParams {
    type Error = PayoutError;

    fn try_from(config: &DistributionConfig) -> PayoutResult<Self> {
        let leaser_transfer_fee = config
            .leaser_transfer_fee
            .map(|fee| decimal("leaser transfer fee", fee))
            .transpose()?;

        let reward_token = match &config.reward_token {
            Some(token) => Some(RewardTokenParams {
                asset_id: token.asset_id.clone(),
                amount_per_block: decimal("token allotment", token.amount_per_block)?,
                decimals: token.decimals,
            }),
            None => None,
        };

        Ok(Self {
            generator: config.address.clone(),
            start_height: config.start_block,
            end_height: config.end_block,
            distribution_percentage: decimal("distribution percentage", config.percentage)?,
            activation_delay: config.activation_delay,
            leaser_transfer_fee,
            transfer_fee: config.transfer_fee,
            attachment: config.attachment.clone(),
            reward_token,
        })
    }
}

/// Computes payouts from the ledger. Read only.
pub struct PayoutCalculator {
    pool: LedgerConnectionPool,
    params: PayoutParams,
}

impl PayoutCalculator {
    pub fn new(pool: LedgerConnectionPool, params: PayoutParams) -> PayoutResult<Self> {
        params.validate()?;
        Ok(Self { pool, params })
    }

    pub fn params(&self) -> &PayoutParams {
        &self.params
    }

    pub async fn calculate(&self) -> PayoutResult<Vec<Transfer>> {
        let params = &self.params;
        let mut conn = self.pool.acquire().await?;

        let shares = queries::lease_shares(
            &mut conn,
            &params.generator,
            params.start_height,
            params.end_height,
            params.activation_delay,
        )
        .await?;

        // The predecessor of the first block feeds its pool too.
        let blocks =
            queries::blocks_in_range(&mut conn, params.start_height - 1, params.end_height)
                .await?;

        debug!(
            "Loaded {} lease shares and {} blocks.",
            shares.len(),
            blocks.len()
        );

        let transfers = distribute(params, &shares, &blocks)?;

        info!(
            "Computed {} payments for {} over blocks {} to {}.",
            transfers.len(),
            params.generator,
            params.start_height,
            params.end_height
        );

        #[cfg(feature = "metrics")]
        {
            METRICS.payout.calculations.inc();
            METRICS.payout.transfers.inc_by(transfers.len() as u64);
        }

        Ok(transfers)
    }
}

/// A non-negative rational kept in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Exact {
    numer: BigInt,
    denom: BigInt,
}

fn gcd(mut a: BigInt, mut b: BigInt) -> BigInt {
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a.abs()
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

/// `value` as `(numer, denom)`.
fn fraction(value: &BigDecimal) -> (BigInt, BigInt) {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale >= 0 {
        (digits, pow10(scale as u32))
    } else {
        (digits * pow10(scale.unsigned_abs() as u32), BigInt::one())
    }
}

impl Exact {
    fn zero() -> Self {
        Self {
            numer: BigInt::zero(),
            denom: BigInt::one(),
        }
    }

    fn add(&mut self, numer: BigInt, denom: BigInt) {
        self.numer = &self.numer * &denom + numer * &self.denom;
        self.denom = &self.denom * denom;

        let divisor = gcd(self.numer.clone(), self.denom.clone());
        if !divisor.is_zero() && !divisor.is_one() {
            self.numer /= &divisor;
            self.denom /= &divisor;
        }
    }

    /// `floor(self * numer / denom)`.
    fn floor_scaled(&self, numer: &BigInt, denom: &BigInt) -> BigInt {
        (&self.numer * numer) / (&self.denom * denom)
    }
}

/// Per leaser, the exact sum over heights of
/// `share(h, leaser) / total(h) * weight(h)`. Heights with no stake count
/// for nothing.
fn weighted_shares<F>(shares: &[LeaseShare], weight: F) -> BTreeMap<String, Exact>
where
    F: Fn(i64) -> BigInt,
{
    let mut totals: HashMap<i64, i128> = HashMap::new();
    for share in shares {
        *totals.entry(share.height).or_default() += share.amount as i128;
    }

    // Shares of one leaser are grouped by the height total they divide, so
    // each distinct total is added to the exact sum once.
    let mut grouped: BTreeMap<&str, BTreeMap<i128, BigInt>> = BTreeMap::new();
    for share in shares {
        let total = totals.get(&share.height).copied().unwrap_or(0);
        if total <= 0 {
            continue;
        }

        *grouped
            .entry(share.sender.as_str())
            .or_default()
            .entry(total)
            .or_insert_with(BigInt::zero) += BigInt::from(share.amount) * weight(share.height);
    }

    grouped
        .into_iter()
        .map(|(leaser, by_total)| {
            let mut sum = Exact::zero();
            for (total, weighted) in by_total {
                sum.add(weighted, BigInt::from(total));
            }
            (leaser.to_string(), sum)
        })
        .collect()
}

fn to_amount(leaser: &str, amount: BigInt) -> PayoutResult<i64> {
    amount
        .to_i64()
        .ok_or_else(|| PayoutError::AmountOverflow(leaser.to_string()))
}

/// Turn per-height lease shares into payable transfers.
///
/// `blocks` must hold every block of the window and its predecessor, so that
/// `pool(h) = fees(h) * 0.4 + fees(h - 1) * 0.6 + reward(h)` can be read for
/// every height. A missing predecessor contributes nothing. Each leaser's
/// entitlement is summed exactly and truncated once.
pub fn distribute(
    params: &PayoutParams,
    shares: &[LeaseShare],
    blocks: &[Block],
) -> PayoutResult<Vec<Transfer>> {
    params.validate()?;

    let by_height: HashMap<i64, &Block> = blocks.iter().map(|b| (b.height, b)).collect();
    let fees_at = |height: i64| by_height.get(&height).map_or(0, |b| b.fees) as i128;
    let reward_at = |height: i64| by_height.get(&height).map_or(0, |b| b.reward) as i128;

    let pool = |height: i64| {
        BigInt::from(
            OWN_FEES_WEIGHT * fees_at(height)
                + PREVIOUS_FEES_WEIGHT * fees_at(height - 1)
                + REWARD_WEIGHT * reward_at(height),
        )
    };

    let (pct_numer, pct_denom) = fraction(&params.distribution_percentage);
    let pct_denom = pct_denom * BigInt::from(POOL_SCALE * PERCENT);

    let deduction = match &params.leaser_transfer_fee {
        Some(fee) => {
            let (numer, denom) = fraction(fee);
            numer * pow10(defaults::NATIVE_ASSET_DECIMALS) / denom
        }
        None => BigInt::zero(),
    };

    let mut transfers = Vec::new();

    for (leaser, sum) in weighted_shares(shares, pool) {
        let amount = sum.floor_scaled(&pct_numer, &pct_denom) - &deduction;
        if !amount.is_positive() {
            debug!("Leaser {leaser} has nothing payable after fees.");
            continue;
        }

        transfers.push(Transfer {
            amount: to_amount(&leaser, amount)?,
            fee: params.transfer_fee,
            sender: params.generator.clone(),
            recipient: leaser,
            attachment: params.attachment.clone(),
            asset_id: None,
        });
    }

    if let Some(token) = &params.reward_token {
        let (numer, denom) = fraction(&token.amount_per_block);
        let numer = numer * pow10(token.decimals);

        for (leaser, sum) in weighted_shares(shares, |_| BigInt::one()) {
            let amount = sum.floor_scaled(&numer, &denom);
            if !amount.is_positive() {
                continue;
            }

            transfers.push(Transfer {
                amount: to_amount(&leaser, amount)?,
                fee: params.transfer_fee,
                sender: params.generator.clone(),
                recipient: leaser,
                attachment: params.attachment.clone(),
                asset_id: Some(token.asset_id.clone()),
            });
        }
    }

    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(height: i64, fees: i64, reward: i64) -> Block {
        Block {
            height,
            generator: "G".to_string(),
            fees,
            reward,
            tx_count: 0,
            timestamp: 0,
        }
    }

    fn share(height: i64, sender: &str, amount: i64) -> LeaseShare {
        LeaseShare {
            height,
            sender: sender.to_string(),
            amount,
        }
    }

    fn params(percentage: u32) -> PayoutParams {
        PayoutParams::new("G", 3000, 3002, BigDecimal::from(percentage))
    }

    fn amounts(transfers: &[Transfer]) -> Vec<(&str, i64)> {
        transfers
            .iter()
            .map(|t| (t.recipient.as_str(), t.amount))
            .collect()
    }

    #[test]
    fn test_single_leaser_scenario() {
        let blocks = vec![
            block(2999, 0, 0),
            block(3000, 100000, 0),
            block(3001, 200000, 0),
            block(3002, 150000, 0),
        ];
        let shares: Vec<_> = (3000..=3002).map(|h| share(h, "A", 1000)).collect();

        let transfers = distribute(&params(50), &shares, &blocks).unwrap();

        assert_eq!(
            transfers,
            vec![Transfer {
                amount: 180000,
                fee: 100000,
                sender: "G".to_string(),
                recipient: "A".to_string(),
                attachment: None,
                asset_id: None,
            }]
        );
    }

    #[test]
    fn test_missing_predecessor_contributes_nothing() {
        let blocks = vec![block(3000, 100000, 0)];
        let shares = vec![share(3000, "A", 1000)];
        let mut params = params(100);
        params.end_height = 3000;

        let transfers = distribute(&params, &shares, &blocks).unwrap();
        assert_eq!(amounts(&transfers), vec![("A", 40000)]);
    }

    #[test]
    fn test_shares_are_summed_exactly_before_truncation() {
        let blocks: Vec<_> = (3000..=3002).map(|h| block(h, 0, 10)).collect();
        let shares: Vec<_> = (3000..=3002)
            .flat_map(|h| vec![share(h, "A", 1), share(h, "B", 1), share(h, "C", 1)])
            .collect();

        let transfers = distribute(&params(100), &shares, &blocks).unwrap();

        // 10/3 per height, three heights: truncating per height would pay 9.
        assert_eq!(amounts(&transfers), vec![("A", 10), ("B", 10), ("C", 10)]);
    }

    #[test]
    fn test_payouts_are_proportional_and_bounded_by_pool() {
        let blocks = vec![
            block(2999, 300000, 0),
            block(3000, 500000, 600000000),
            block(3001, 0, 600000000),
            block(3002, 700001, 600000000),
        ];
        let shares = vec![
            share(3000, "A", 700),
            share(3000, "B", 300),
            share(3001, "A", 700),
            share(3001, "B", 600),
            share(3001, "C", 1),
            share(3002, "C", 5),
        ];

        let transfers = distribute(&params(90), &shares, &blocks).unwrap();
        let paid: i64 = transfers.iter().map(|t| t.amount).sum();

        let pool: i64 = [(3000, 500000, 300000), (3001, 0, 500000), (3002, 700001, 0)]
            .iter()
            .map(|(_, own, prev)| (4 * own + 6 * prev) / 10 + 600000000)
            .sum();
        let bound = pool * 90 / 100;

        assert!(paid <= bound);
        assert!(bound - paid <= transfers.len() as i64);
    }

    #[test]
    fn test_leaser_fee_is_deducted_and_empty_payouts_dropped() {
        let blocks: Vec<_> = (3000..=3002).map(|h| block(h, 0, 1_000_000)).collect();
        let shares = vec![share(3000, "A", 999), share(3000, "B", 1)];

        let mut params = params(100);
        params.leaser_transfer_fee = Some(BigDecimal::from_str("0.001").unwrap());

        let transfers = distribute(&params, &shares, &blocks).unwrap();
        assert_eq!(amounts(&transfers), vec![("A", 999000 - 100000)]);
    }

    #[test]
    fn test_reward_token_uses_flat_allotment() {
        let blocks: Vec<_> = (3000..=3001).map(|h| block(h, 0, 0)).collect();
        let shares = vec![
            share(3000, "A", 1),
            share(3000, "B", 2),
            share(3001, "A", 1),
            share(3001, "B", 2),
        ];

        let mut params = params(50);
        params.end_height = 3001;
        params.reward_token = Some(RewardTokenParams {
            asset_id: "Token".to_string(),
            amount_per_block: BigDecimal::from_str("1.5").unwrap(),
            decimals: 2,
        });

        let transfers = distribute(&params, &shares, &blocks).unwrap();
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.asset_id.as_deref() == Some("Token")));
        assert_eq!(amounts(&transfers), vec![("A", 100), ("B", 200)]);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let mut bad = params(50);
        bad.distribution_percentage = BigDecimal::from(0);
        assert!(matches!(bad.validate(), Err(PayoutError::ConfigurationError(_))));

        bad.distribution_percentage = BigDecimal::from_str("100.01").unwrap();
        assert!(matches!(bad.validate(), Err(PayoutError::ConfigurationError(_))));

        let mut bad = params(100);
        bad.start_height = 3003;
        assert!(matches!(bad.validate(), Err(PayoutError::ConfigurationError(_))));

        let mut bad = params(100);
        bad.transfer_fee = -1;
        assert!(matches!(bad.validate(), Err(PayoutError::ConfigurationError(_))));

        assert!(params(100).validate().is_ok());
    }

    #[test]
    fn test_params_from_config() {
        let config = DistributionConfig {
            address: "G".to_string(),
            start_block: 10,
            end_block: 20,
            percentage: 87.5,
            leaser_transfer_fee: Some(0.002),
            ..DistributionConfig::default()
        };

        let params = PayoutParams::try_from(&config).unwrap();
        assert_eq!(
            params.distribution_percentage,
            BigDecimal::from_str("87.5").unwrap()
        );
        assert_eq!(
            params.leaser_transfer_fee,
            Some(BigDecimal::from_str("0.002").unwrap())
        );
        assert_eq!(params.activation_delay, defaults::ACTIVATION_DELAY);
        assert_eq!(params.transfer_fee, defaults::TRANSFER_FEE);
    }

    #[test]
    fn test_fraction_handles_negative_scale() {
        let value = BigDecimal::new(BigInt::from(15), -2);
        assert_eq!(fraction(&value), (BigInt::from(1500), BigInt::one()));

        let value = BigDecimal::from_str("0.25").unwrap();
        assert_eq!(fraction(&value), (BigInt::from(25), BigInt::from(100)));
    }
}
