use crate::{node::TransferApi, PayoutResult};
use bigdecimal::BigDecimal;
use lease_payout_lib::defaults;
use lease_payout_types::prelude::*;
use num_bigint::BigInt;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number and sum of the payments of one asset in a payout list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetTotal {
    /// `None` for the native asset.
    pub asset_id: Option<String>,
    pub count: usize,
    pub total: i128,
}

impl AssetTotal {
    /// The total in whole units of an asset with `decimals` decimals.
    pub fn whole_units(&self, decimals: u32) -> BigDecimal {
        BigDecimal::new(BigInt::from(self.total), decimals as i64)
    }
}

/// Totals per asset, native asset first.
pub fn summarize(transfers: &[Transfer]) -> Vec<AssetTotal> {
    let mut totals: BTreeMap<Option<String>, (usize, i128)> = BTreeMap::new();
    for transfer in transfers {
        let entry = totals.entry(transfer.asset_id.clone()).or_default();
        entry.0 += 1;
        entry.1 += transfer.amount as i128;
    }

    totals
        .into_iter()
        .map(|(asset_id, (count, total))| AssetTotal {
            asset_id,
            count,
            total,
        })
        .collect()
}

/// An asset total in whole units, named after the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReport {
    pub name: String,
    pub count: usize,
    pub amount: BigDecimal,
}

/// Look up name and decimals of every non-native asset and express each total
/// in whole units. The native asset is never looked up.
pub async fn describe<T: TransferApi>(
    api: &T,
    totals: &[AssetTotal],
) -> PayoutResult<Vec<AssetReport>> {
    let mut reports = Vec::with_capacity(totals.len());
    for total in totals {
        let (name, decimals) = match &total.asset_id {
            Some(asset_id) => {
                let details = api.asset_details(asset_id).await?;
                (details.name, details.decimals)
            }
            None => (
                defaults::NATIVE_ASSET.to_string(),
                defaults::NATIVE_ASSET_DECIMALS,
            ),
        };

        reports.push(AssetReport {
            name,
            count: total.count,
            amount: total.whole_units(decimals),
        });
    }
    Ok(reports)
}
