use crate::PayoutResult;
use lease_payout_types::prelude::Transfer;
use std::path::Path;

/// Write a payout list as a JSON array.
pub async fn write(path: impl AsRef<Path>, transfers: &[Transfer]) -> PayoutResult<()> {
    let contents = serde_json::to_vec_pretty(transfers)?;
    tokio::fs::write(path, contents).await?;
    Ok(())
}

pub async fn read(path: impl AsRef<Path>) -> PayoutResult<Vec<Transfer>> {
    let contents = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&contents)?)
}
