use crate::{
    commands::{connect, setup, write_metrics},
    indexer::LedgerIndexer,
    node::NodeClient,
};
use lease_payout_lib::config::PayoutArgs;
use tracing::info;

pub async fn exec(args: PayoutArgs) -> anyhow::Result<()> {
    let metrics_file = args.metrics_file.clone();
    let config = setup(args)?;

    let pool = connect(&config).await?;
    let node = NodeClient::new(&config.node)?;

    info!("Indexing from node at {}.", config.node.url);

    let indexer = LedgerIndexer::new(config.indexer.clone(), pool, node);
    let summary = indexer.run().await?;

    info!("Index summary: {}", serde_json::to_string(&summary)?);

    write_metrics(metrics_file.as_deref()).await
}
