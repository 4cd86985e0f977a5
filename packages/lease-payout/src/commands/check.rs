use crate::{
    check::{describe, summarize},
    commands::setup,
    node::NodeClient,
    payout_file,
};
use lease_payout_lib::config::PayoutArgs;
use tracing::info;

pub async fn exec(args: PayoutArgs) -> anyhow::Result<()> {
    let config = setup(args)?;

    let transfers = payout_file::read(&config.payout.filename).await?;
    info!(
        "{} payments found in {}.",
        transfers.len(),
        config.payout.filename.display()
    );

    let node = NodeClient::new(&config.node)?;

    for report in describe(&node, &summarize(&transfers)).await? {
        info!(
            "{} payments of {}, {} {} in total.",
            report.count, report.name, report.amount, report.name
        );
    }

    Ok(())
}
