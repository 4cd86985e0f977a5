use crate::{
    calculator::{PayoutCalculator, PayoutParams},
    commands::{connect, setup, write_metrics},
    payout_file,
};
use lease_payout_lib::config::PayoutArgs;
use tracing::info;

pub async fn exec(args: PayoutArgs) -> anyhow::Result<()> {
    let metrics_file = args.metrics_file.clone();
    let config = setup(args)?;

    let params = PayoutParams::try_from(&config.payout)?;
    let pool = connect(&config).await?;

    let calculator = PayoutCalculator::new(pool, params)?;
    let transfers = calculator.calculate().await?;

    payout_file::write(&config.payout.filename, &transfers).await?;
    info!(
        "Dumped {} payments to {}.",
        transfers.len(),
        config.payout.filename.display()
    );

    write_metrics(metrics_file.as_deref()).await
}
