use crate::{
    commands::{setup, write_metrics},
    emitter::TransferEmitter,
    node::NodeClient,
    payout_file,
};
use lease_payout_lib::config::{PayoutArgs, TransferMode};
use tracing::{info, warn};

pub async fn exec(args: PayoutArgs) -> anyhow::Result<()> {
    let metrics_file = args.metrics_file.clone();
    let config = setup(args)?;

    let transfers = payout_file::read(&config.payout.filename).await?;
    info!(
        "{} transfers found in {}.",
        transfers.len(),
        config.payout.filename.display()
    );

    let node = NodeClient::new(&config.node)?;
    let emitter = TransferEmitter::new(node, config.payout.address.clone())
        .with_fee_asset(config.payout.fee_asset.clone());
    let report = match config.payout.transfer_mode {
        TransferMode::Mass => emitter.emit(&transfers).await,
        TransferMode::Individual => emitter.emit_individually(&transfers).await,
    };

    let mode = config.payout.transfer_mode.as_ref();
    info!(
        "{} {mode} transfers submitted, {} accepted.",
        report.submitted(),
        report.sent()
    );
    if report.failed() > 0 {
        warn!("{} {mode} transfers failed.", report.failed());
    }

    write_metrics(metrics_file.as_deref()).await
}
