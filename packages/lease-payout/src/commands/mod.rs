pub(crate) mod check;
pub(crate) mod dump;
pub(crate) mod index;
pub(crate) mod payout;
pub(crate) mod transfer;

use lease_payout_database::{queries, LedgerConnectionPool};
use lease_payout_lib::{
    config::{PayoutArgs, PayoutConfig},
    utils::init_logging,
};
use std::path::Path;
use tracing::{debug, info};

/// Load the configuration and start logging.
pub(crate) fn setup(args: PayoutArgs) -> anyhow::Result<PayoutConfig> {
    let config = PayoutConfig::load(args)?;
    init_logging(&config)?;
    debug!("Configuration: {:?}", config);
    Ok(config)
}

/// Open the ledger, migrating it first unless disabled.
pub(crate) async fn connect(config: &PayoutConfig) -> anyhow::Result<LedgerConnectionPool> {
    let pool = LedgerConnectionPool::connect(&config.database.to_string()).await?;

    if config.run_migrations {
        let mut conn = pool.acquire().await?;
        queries::run_migration(&mut conn).await?;
    }

    Ok(pool)
}

#[cfg(feature = "metrics")]
pub(crate) async fn write_metrics(path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        tokio::fs::write(path, lease_payout_metrics::encode_metrics()?).await?;
        info!("Metrics written to {}.", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
pub(crate) async fn write_metrics(path: Option<&Path>) -> anyhow::Result<()> {
    if path.is_some() {
        info!("Built without metrics support, no metrics written.");
    }
    Ok(())
}
